//! Rigid rod geometry and rotational dynamics.
//!
//! A rod is a thin segment of fixed `length` centered on its body's position.
//! Orientation is a single angle, rotation is driven by the 2D scalar torque
//! of forces applied away from the center.

use std::f64::consts::TAU;

use crate::simulation::states::NVec2;

/// Hard cap on |angular velocity|, radians per tick
pub const MAX_ANGULAR_VELOCITY: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Rod {
    length: f64,                   // fixed at creation
    pub angle: f64,                // radians in [0, 2pi)
    pub angular_velocity: f64,     // radians per tick
    pub angular_acceleration: f64, // accumulated torque / moment of inertia
    pub moment_of_inertia: f64,    // m * L^2 / 12, follows the body's mass
}

impl Rod {
    /// `length` must be positive and finite, a zero-length rod has no
    /// moment of inertia to divide by
    pub fn new(length: f64, angle: f64, mass: f64) -> Self {
        debug_assert!(length.is_finite() && length > 0.0, "rod length must be positive, got {}", length);
        Self {
            length,
            angle: normalize_angle(angle),
            angular_velocity: 0.0,
            angular_acceleration: 0.0,
            moment_of_inertia: moment_of_inertia(mass, length),
        }
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Unit vector along the rod, pointing from B to A
    pub fn axis(&self) -> NVec2 {
        NVec2::new(self.angle.cos(), self.angle.sin())
    }

    /// `(pointA, pointB)` = center +/- (L/2) * axis
    pub fn endpoints(&self, center: NVec2) -> (NVec2, NVec2) {
        let half = self.axis() * (0.5 * self.length);
        (center + half, center - half)
    }

    /// Nearest of endpoint A, center and endpoint B to `target`.
    ///
    /// Ties are resolved unevenly: A wins any tie, B has to be strictly
    /// closer than both of the others, the center takes what is left.
    pub fn interaction_point(&self, center: NVec2, target: NVec2) -> NVec2 {
        let (point_a, point_b) = self.endpoints(center);
        let da = (target - point_a).norm();
        let dc = (target - center).norm();
        let db = (target - point_b).norm();

        if da <= dc && da <= db {
            point_a
        } else if db < da && db < dc {
            point_b
        } else {
            center
        }
    }

    pub fn update_inertia(&mut self, mass: f64) {
        self.moment_of_inertia = moment_of_inertia(mass, self.length);
    }

    /// One rotational step: damping torque, velocity update and cap,
    /// angle advance, then clear the accumulated angular acceleration.
    pub fn integrate(&mut self, dampening: f64, dt: f64) {
        self.angular_acceleration += -dampening * self.angular_velocity / self.moment_of_inertia;

        self.angular_velocity = (self.angular_velocity + self.angular_acceleration)
            .clamp(-MAX_ANGULAR_VELOCITY, MAX_ANGULAR_VELOCITY);

        self.angle = normalize_angle(self.angle + self.angular_velocity * dt);
        self.angular_acceleration = 0.0;
    }
}

/// Thin rod about its center: I = m * L^2 / 12
pub fn moment_of_inertia(mass: f64, length: f64) -> f64 {
    mass * length * length / 12.0
}

/// 2D cross product `lever x force`, positive is counter-clockwise
pub fn torque(lever: NVec2, force: NVec2) -> f64 {
    lever.x * force.y - lever.y * force.x
}

/// Wrap an angle into [0, 2pi)
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}
