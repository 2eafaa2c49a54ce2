//! Fixed-step integrator for the clustering system
//!
//! One explicit step per tick, driven by a [`ForceBuffer`] and `Parameters`:
//! damping, velocity update with a speed cap, drift, toroidal wrap and mass
//! evolution, plus the rotational step for rods.

use super::forces::ForceBuffer;
use super::params::Parameters;
use super::states::{Body, NVec2, System};

/// Advance every body by one tick using the accelerations in `forces`.
/// `forces` must be indexed like `sys.bodies`. Does not touch `sys.t`.
pub fn step(sys: &mut System, forces: &ForceBuffer, p: &Parameters) {
    for (i, b) in sys.bodies.iter_mut().enumerate() {
        let linear = forces.linear.get(i).copied().unwrap_or_else(NVec2::zeros);
        let angular = forces.angular.get(i).copied().unwrap_or(0.0);
        b.accelerate(linear, angular);
        integrate_body(b, p);
    }
}

/// Integrate one body from whatever acceleration it has accumulated
pub fn integrate_body(b: &mut Body, p: &Parameters) {
    let dt = p.time_step;

    // Drag: F = -c v
    b.apply_force(-p.dampening_coefficient * b.v);

    // Kick, then cap the speed
    b.v += b.a;
    b.v = cap_speed(b.v, p.max_speed);

    // Drift: x_n+1 = x_n + dt v_n+1, re-entering through the opposite edge
    b.x += dt * b.v;
    b.x = wrap(b.x, p.canvas_width, p.canvas_height);

    b.a = NVec2::zeros();

    b.m = evolve_mass(b.m, b.membership.in_cluster, p);

    let m = b.m;
    if let Some(rod) = b.as_rod_mut() {
        rod.integrate(p.dampening_coefficient, dt);
        rod.update_inertia(m);
    }
}

/// Clustered bodies gain mass, isolated ones lose it, always within bounds
pub fn evolve_mass(m: f64, in_cluster: bool, p: &Parameters) -> f64 {
    let next = if in_cluster {
        m + p.mass_gain_rate
    } else {
        m - p.mass_loss_rate
    };
    p.clamp_mass(next)
}

pub fn cap_speed(v: NVec2, max_speed: f64) -> NVec2 {
    let speed = v.norm();
    if speed > max_speed {
        v * (max_speed / speed)
    } else {
        v
    }
}

/// Toroidal wrap into [0, width) x [0, height)
pub fn wrap(x: NVec2, width: f64, height: f64) -> NVec2 {
    NVec2::new(wrap_axis(x.x, width), wrap_axis(x.y, height))
}

fn wrap_axis(value: f64, extent: f64) -> f64 {
    let wrapped = value.rem_euclid(extent);
    if wrapped >= extent { 0.0 } else { wrapped }
}
