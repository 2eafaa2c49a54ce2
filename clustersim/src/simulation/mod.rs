pub mod states;
pub mod params;
pub mod rod;
pub mod clustering;
pub mod repulsion;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod scenario;
