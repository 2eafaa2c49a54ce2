//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`ParametersConfig`] – force law, repulsion delay, mass and canvas options
//! - [`BodyConfig`]       – initial state for each explicitly placed body
//! - [`SpawnConfig`]      – optional seeded random population
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! Any parameter left out falls back to [`Parameters::default`]:
//!
//! ```yaml
//! t_end: 2000.0              # run length in simulation time units
//!
//! parameters:
//!   threshold_distance: 30.0
//!   attraction_coefficient: 1.0
//!   repulsion_coefficient: 10.0
//!   repulsion_delay: 120     # ticks
//!   canvas_width: 800.0
//!   canvas_height: 600.0
//!
//! bodies:
//!   - kind: point
//!     x: [ 100.0, 100.0 ]
//!     m: 2.0
//!   - kind: rod
//!     x: [ 140.0, 100.0 ]
//!     v: [ 0.0, 0.5 ]
//!     m: 3.0
//!     length: 24.0
//!     angle: 1.57
//!
//! spawn:
//!   count: 100
//!   rod_fraction: 0.25
//!   mass: [ 1.0, 3.0 ]
//!   length: [ 10.0, 30.0 ]
//!   speed: 1.0
//!   seed: 42
//! ```
//!
//! The scenario builder maps this configuration into the runtime
//! [`Engine`](crate::simulation::engine::Engine).

use serde::Deserialize;
use thiserror::Error;

use crate::simulation::engine::EngineError;
use crate::simulation::params::Parameters;

/// Errors raised while turning configuration into runtime state
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("parameter `{name}` {reason}")]
    InvalidParameter { name: &'static str, reason: &'static str },
    #[error("body {index}: {reason}")]
    InvalidBody { index: usize, reason: &'static str },
    #[error("spawn section: {0}")]
    InvalidSpawn(&'static str),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ConfigError {
    pub fn invalid(name: &'static str, reason: &'static str) -> Self {
        ConfigError::InvalidParameter { name, reason }
    }
}

/// Global numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ParametersConfig {
    pub threshold_distance: f64,
    pub attraction_coefficient: f64,
    pub repulsion_coefficient: f64,
    pub sticky_force_coefficient: f64,
    pub sticky_force_power: f64,
    pub repulsion_delay: u32,
    pub delay_increase: u32,
    pub max_repulsion_delay: u32,
    pub min_mass: f64,
    pub max_mass: f64,
    pub mass_gain_rate: f64,
    pub mass_loss_rate: f64,
    pub max_speed: f64,
    pub dampening_coefficient: f64,
    pub time_step: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Default for ParametersConfig {
    fn default() -> Self {
        let p = Parameters::default();
        Self {
            threshold_distance: p.threshold_distance,
            attraction_coefficient: p.attraction_coefficient,
            repulsion_coefficient: p.repulsion_coefficient,
            sticky_force_coefficient: p.sticky_force_coefficient,
            sticky_force_power: p.sticky_force_power,
            repulsion_delay: p.repulsion_delay,
            delay_increase: p.delay_increase,
            max_repulsion_delay: p.max_repulsion_delay,
            min_mass: p.min_mass,
            max_mass: p.max_mass,
            mass_gain_rate: p.mass_gain_rate,
            mass_loss_rate: p.mass_loss_rate,
            max_speed: p.max_speed,
            dampening_coefficient: p.dampening_coefficient,
            time_step: p.time_step,
            canvas_width: p.canvas_width,
            canvas_height: p.canvas_height,
        }
    }
}

/// Initial state of one explicitly placed body, tagged by `kind`
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BodyConfig {
    Point {
        x: [f64; 2],         // initial position
        #[serde(default)]
        v: [f64; 2],         // initial velocity
        m: f64,              // initial mass
    },
    Rod {
        x: [f64; 2],
        #[serde(default)]
        v: [f64; 2],
        m: f64,
        length: f64,         // fixed rod length
        #[serde(default)]
        angle: f64,          // initial orientation in radians
    },
}

/// Seeded random population spread uniformly over the canvas
#[derive(Deserialize, Debug, Clone)]
pub struct SpawnConfig {
    pub count: usize,
    #[serde(default)]
    pub rod_fraction: f64,       // share of spawned bodies that are rods
    pub mass: [f64; 2],          // uniform mass range, clamped to the mass bounds
    #[serde(default = "default_length")]
    pub length: [f64; 2],        // uniform rod length range
    #[serde(default)]
    pub speed: f64,              // max initial speed, random direction
    #[serde(default)]
    pub seed: u64,               // makes runs reproducible
}

fn default_length() -> [f64; 2] {
    [10.0, 30.0]
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub t_end: Option<f64>,              // run length, the binary's `--steps` overrides it
    #[serde(default)]
    pub parameters: ParametersConfig,    // options consumed by every tick
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,         // explicitly placed bodies, spawned first
    #[serde(default)]
    pub spawn: Option<SpawnConfig>,      // random bodies appended after `bodies`
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(s)
    }
}
