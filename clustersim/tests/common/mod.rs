#![allow(dead_code)]

use clustersim::simulation::forces::proximity_edges;
use clustersim::{
    Body, Clustering, EdgeSet, ForceBuffer, ForceSet, NVec2, Parameters, RepulsionState, System,
    TickFrame,
};

/// Default physics parameters for tests: no damping, no speed cap in practice
pub fn test_params() -> Parameters {
    Parameters {
        threshold_distance: 10.0,
        attraction_coefficient: 2.0,
        repulsion_coefficient: 5.0,
        sticky_force_coefficient: 3.0,
        sticky_force_power: 2.0,
        repulsion_delay: 3,
        delay_increase: 2,
        max_repulsion_delay: 10,
        min_mass: 0.5,
        max_mass: 5.0,
        mass_gain_rate: 0.1,
        mass_loss_rate: 0.1,
        max_speed: 1.0e6,
        dampening_coefficient: 0.0,
        time_step: 1.0,
        canvas_width: 1000.0,
        canvas_height: 1000.0,
    }
}

/// Same as `test_params` with every force switched off, bodies only drift
pub fn still_params() -> Parameters {
    Parameters {
        attraction_coefficient: 0.0,
        repulsion_coefficient: 0.0,
        sticky_force_coefficient: 0.0,
        ..test_params()
    }
}

/// Two point bodies separated by `dist` along the x-axis
pub fn two_point_system(dist: f64, m1: f64, m2: f64) -> System {
    System {
        bodies: vec![
            Body::point(0, NVec2::new(100.0, 100.0), m1),
            Body::point(1, NVec2::new(100.0 + dist, 100.0), m2),
        ],
        t: 0.0,
    }
}

/// Nobody clustered
pub fn unclustered(sys: &System) -> Clustering {
    Clustering::build(&sys.bodies, &EdgeSet::new(), &EdgeSet::new())
}

/// Clusters from the current positions
pub fn clustered(sys: &System, p: &Parameters) -> Clustering {
    let edges = proximity_edges(&sys.bodies, p);
    Clustering::build(&sys.bodies, &edges, &EdgeSet::new())
}

pub fn repulsion(n: usize, should_repulse: bool) -> Vec<RepulsionState> {
    vec![
        RepulsionState {
            should_repulse,
            ..RepulsionState::default()
        };
        n
    ]
}

/// One force pass with the standard interaction
pub fn force_pass(
    sys: &System,
    p: &Parameters,
    clustering: &Clustering,
    repulsion: &[RepulsionState],
) -> ForceBuffer {
    let frame = TickFrame {
        clustering,
        repulsion,
    };
    let mut out = ForceBuffer::default();
    ForceSet::default().accumulate_forces(sys, &frame, p, &mut out);
    out
}

pub fn approx(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}
