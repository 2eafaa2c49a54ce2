//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario` containing:
//! - validated numerical parameters (`Parameters`)
//! - the tick driver (`Engine`) holding every body at t = 0
//! - the requested run length, if the scenario carries one
//!
//! Explicit bodies get ids in file order, spawned bodies follow.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::configuration::config::{BodyConfig, ConfigError, ScenarioConfig, SpawnConfig};
use crate::simulation::engine::Engine;
use crate::simulation::params::Parameters;
use crate::simulation::states::{BodyVariant, NVec2};

/// Runtime bundle built from a [`ScenarioConfig`]
pub struct Scenario {
    pub parameters: Parameters,
    pub engine: Engine,
    pub t_end: Option<f64>,
}

impl Scenario {
    pub fn build_scenario(cfg: &ScenarioConfig) -> Result<Self, ConfigError> {
        let parameters = Parameters::try_from(&cfg.parameters)?;
        let mut engine = Engine::new();

        // Bodies: map `BodyConfig` -> runtime `Body` using nalgebra vectors
        for (index, bc) in cfg.bodies.iter().enumerate() {
            let (variant, x, v, m) = body_from_config(index, bc)?;
            let m = clamp_initial_mass(index, m, &parameters);
            engine.add_body(variant, x, m)?.v = v;
        }

        if let Some(spawn) = &cfg.spawn {
            spawn_population(&mut engine, spawn, &parameters)?;
        }

        if engine.bodies().is_empty() {
            warn!("scenario has no bodies");
        }

        if let Some(t_end) = cfg.t_end {
            if !(t_end.is_finite() && t_end >= 0.0) {
                return Err(ConfigError::invalid("t_end", "must be a finite, non-negative time"));
            }
        }

        info!(
            bodies = engine.bodies().len(),
            rods = engine.bodies().iter().filter(|b| b.is_rod()).count(),
            threshold = parameters.threshold_distance,
            "scenario built"
        );

        Ok(Self {
            parameters,
            engine,
            t_end: cfg.t_end,
        })
    }

    /// Ticks needed to reach `t_end`, rounded up
    pub fn steps(&self) -> Option<u64> {
        self.t_end
            .map(|t_end| (t_end / self.parameters.time_step).ceil() as u64)
    }

    /// Run `steps` ticks with the scenario's parameters
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.engine.tick(&self.parameters);
        }
    }
}

fn body_from_config(index: usize, bc: &BodyConfig) -> Result<(BodyVariant, NVec2, NVec2, f64), ConfigError> {
    let (variant, x, v, m) = match *bc {
        BodyConfig::Point { x, v, m } => (BodyVariant::Point, x, v, m),
        BodyConfig::Rod { x, v, m, length, angle } => {
            if !(length.is_finite() && length > 0.0) {
                return Err(ConfigError::InvalidBody { index, reason: "rod length must be positive" });
            }
            if !angle.is_finite() {
                return Err(ConfigError::InvalidBody { index, reason: "rod angle must be finite" });
            }
            (BodyVariant::Rod { length, angle }, x, v, m)
        }
    };

    if !(m.is_finite() && m > 0.0) {
        return Err(ConfigError::InvalidBody { index, reason: "mass must be positive" });
    }
    if !x.iter().chain(v.iter()).all(|c| c.is_finite()) {
        return Err(ConfigError::InvalidBody { index, reason: "position and velocity must be finite" });
    }

    Ok((variant, NVec2::new(x[0], x[1]), NVec2::new(v[0], v[1]), m))
}

fn clamp_initial_mass(index: usize, m: f64, p: &Parameters) -> f64 {
    let clamped = p.clamp_mass(m);
    if clamped != m {
        warn!(index, mass = m, clamped, "initial mass outside [min_mass, max_mass]");
    }
    clamped
}

fn check_range(range: [f64; 2], what: &'static str) -> Result<(), ConfigError> {
    let [lo, hi] = range;
    if lo.is_finite() && hi.is_finite() && lo > 0.0 && lo <= hi {
        Ok(())
    } else {
        Err(ConfigError::InvalidSpawn(what))
    }
}

/// Seeded random bodies, uniform over the canvas
fn spawn_population(engine: &mut Engine, spawn: &SpawnConfig, p: &Parameters) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&spawn.rod_fraction) {
        return Err(ConfigError::InvalidSpawn("rod_fraction must be within [0, 1]"));
    }
    if !(spawn.speed.is_finite() && spawn.speed >= 0.0) {
        return Err(ConfigError::InvalidSpawn("speed must be finite and non-negative"));
    }
    check_range(spawn.mass, "mass range must be positive and ordered")?;
    check_range(spawn.length, "length range must be positive and ordered")?;

    let mut rng = StdRng::seed_from_u64(spawn.seed);

    for _ in 0..spawn.count {
        let x = NVec2::new(
            rng.gen_range(0.0..p.canvas_width),
            rng.gen_range(0.0..p.canvas_height),
        );
        let m = p.clamp_mass(rng.gen_range(spawn.mass[0]..=spawn.mass[1]));

        let variant = if rng.gen_bool(spawn.rod_fraction) {
            BodyVariant::Rod {
                length: rng.gen_range(spawn.length[0]..=spawn.length[1]),
                angle: rng.gen_range(0.0..TAU),
            }
        } else {
            BodyVariant::Point
        };

        let heading: f64 = rng.gen_range(0.0..TAU);
        let speed = if spawn.speed > 0.0 { rng.gen_range(0.0..=spawn.speed) } else { 0.0 };
        let v = NVec2::new(heading.cos(), heading.sin()) * speed;

        engine.add_body(variant, x, m)?.v = v;
    }
    Ok(())
}
