pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Body, BodyId, BodyKind, BodyVariant, Membership, System, NVec2};
pub use simulation::rod::{Rod, MAX_ANGULAR_VELOCITY};
pub use simulation::params::Parameters;
pub use simulation::clustering::{Cluster, Clustering, EdgeSet, UnionFind};
pub use simulation::repulsion::RepulsionState;
pub use simulation::forces::{ForceBuffer, ForceSet, ForceTerm, Interaction, StickyInteraction, TickFrame};
pub use simulation::engine::{Engine, EngineError, Stats};
pub use simulation::scenario::Scenario;

pub use configuration::config::{BodyConfig, ConfigError, ParametersConfig, ScenarioConfig, SpawnConfig};

pub use benchmark::benchmark::bench_tick;
