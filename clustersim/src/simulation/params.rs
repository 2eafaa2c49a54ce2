//! Numerical and physical parameters for the simulation
//!
//! `Parameters` is the configuration record consumed by every tick:
//! - force law coefficients and the interaction threshold,
//! - repulsion delay bookkeeping (in ticks),
//! - mass bounds and gain/loss rates,
//! - speed cap, damping, step size and the toroidal canvas size.
//!
//! Validation happens once, when a `ParametersConfig` is turned into
//! `Parameters`; the engine itself trusts what it is given.

use crate::configuration::config::{ConfigError, ParametersConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub threshold_distance: f64,       // attraction/repulsion boundary
    pub attraction_coefficient: f64,   // long-range inverse-square attraction
    pub repulsion_coefficient: f64,    // short-range inverse-square repulsion
    pub sticky_force_coefficient: f64, // bonding strength near the boundary
    pub sticky_force_power: f64,       // distance exponent of the sticky term
    pub repulsion_delay: u32,          // ticks clustered before a body may repulse
    pub delay_increase: u32,           // extra ticks granted when a cluster grows
    pub max_repulsion_delay: u32,      // cap on the extended delay
    pub min_mass: f64,
    pub max_mass: f64,
    pub mass_gain_rate: f64,           // per tick while clustered
    pub mass_loss_rate: f64,           // per tick while isolated
    pub max_speed: f64,
    pub dampening_coefficient: f64,    // linear and angular drag
    pub time_step: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            threshold_distance: 30.0,
            attraction_coefficient: 1.0,
            repulsion_coefficient: 10.0,
            sticky_force_coefficient: 50.0,
            sticky_force_power: 2.5,
            repulsion_delay: 120,
            delay_increase: 30,
            max_repulsion_delay: 600,
            min_mass: 1.0,
            max_mass: 10.0,
            mass_gain_rate: 0.01,
            mass_loss_rate: 0.005,
            max_speed: 4.0,
            dampening_coefficient: 0.05,
            time_step: 1.0,
            canvas_width: 800.0,
            canvas_height: 600.0,
        }
    }
}

impl Parameters {
    /// Pairs closer than this join the proximity graph
    pub fn proximity_distance(&self) -> f64 {
        0.8 * self.threshold_distance
    }

    /// Outer edge of the sticky band beyond the threshold
    pub fn sticky_band(&self) -> f64 {
        1.2 * self.threshold_distance
    }

    pub fn clamp_mass(&self, m: f64) -> f64 {
        m.clamp(self.min_mass, self.max_mass)
    }

    /// Check every option; the first violation is reported
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("threshold_distance", self.threshold_distance),
            ("attraction_coefficient", self.attraction_coefficient),
            ("repulsion_coefficient", self.repulsion_coefficient),
            ("sticky_force_coefficient", self.sticky_force_coefficient),
            ("sticky_force_power", self.sticky_force_power),
            ("min_mass", self.min_mass),
            ("max_mass", self.max_mass),
            ("mass_gain_rate", self.mass_gain_rate),
            ("mass_loss_rate", self.mass_loss_rate),
            ("max_speed", self.max_speed),
            ("dampening_coefficient", self.dampening_coefficient),
            ("time_step", self.time_step),
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::invalid(name, "must be finite"));
            }
        }

        let positive = [
            ("threshold_distance", self.threshold_distance),
            ("min_mass", self.min_mass),
            ("max_speed", self.max_speed),
            ("time_step", self.time_step),
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::invalid(name, "must be greater than zero"));
            }
        }

        let non_negative = [
            ("attraction_coefficient", self.attraction_coefficient),
            ("repulsion_coefficient", self.repulsion_coefficient),
            ("sticky_force_coefficient", self.sticky_force_coefficient),
            ("mass_gain_rate", self.mass_gain_rate),
            ("mass_loss_rate", self.mass_loss_rate),
            ("dampening_coefficient", self.dampening_coefficient),
        ];
        for (name, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::invalid(name, "must not be negative"));
            }
        }

        if self.max_mass < self.min_mass {
            return Err(ConfigError::invalid("max_mass", "must be at least min_mass"));
        }
        if self.max_repulsion_delay < self.repulsion_delay {
            return Err(ConfigError::invalid(
                "max_repulsion_delay",
                "must be at least repulsion_delay",
            ));
        }
        Ok(())
    }
}

impl TryFrom<&ParametersConfig> for Parameters {
    type Error = ConfigError;

    fn try_from(cfg: &ParametersConfig) -> Result<Self, Self::Error> {
        let parameters = Parameters {
            threshold_distance: cfg.threshold_distance,
            attraction_coefficient: cfg.attraction_coefficient,
            repulsion_coefficient: cfg.repulsion_coefficient,
            sticky_force_coefficient: cfg.sticky_force_coefficient,
            sticky_force_power: cfg.sticky_force_power,
            repulsion_delay: cfg.repulsion_delay,
            delay_increase: cfg.delay_increase,
            max_repulsion_delay: cfg.max_repulsion_delay,
            min_mass: cfg.min_mass,
            max_mass: cfg.max_mass,
            mass_gain_rate: cfg.mass_gain_rate,
            mass_loss_rate: cfg.mass_loss_rate,
            max_speed: cfg.max_speed,
            dampening_coefficient: cfg.dampening_coefficient,
            time_step: cfg.time_step,
            canvas_width: cfg.canvas_width,
            canvas_height: cfg.canvas_height,
        };
        parameters.validate()?;
        Ok(parameters)
    }
}
