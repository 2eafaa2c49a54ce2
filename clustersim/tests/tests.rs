mod common;

use std::f64::consts::TAU;

use clustersim::simulation::forces::{classify, pair_magnitude, proximity_edges, radial_magnitude};
use clustersim::simulation::integrator::integrate_body;
use clustersim::simulation::rod::{moment_of_inertia, normalize_angle};
use clustersim::{Body, Interaction, NVec2, System, MAX_ANGULAR_VELOCITY};

use common::{approx, clustered, force_pass, repulsion, test_params, two_point_system, unclustered};

// ==================================================================================
// Force law tests
// ==================================================================================

#[test]
fn pair_forces_are_equal_and_opposite() {
    let p = test_params();

    // attraction, sticky band, holding, plain repulsion
    for (dist, repulsing) in [(25.0, false), (11.0, false), (5.0, false), (5.0, true)] {
        let sys = two_point_system(dist, 2.0, 3.0);
        let out = force_pass(&sys, &p, &unclustered(&sys), &repulsion(2, repulsing));

        let net = out.linear[0] * sys.bodies[0].m + out.linear[1] * sys.bodies[1].m;
        assert!(net.norm() < 1e-12, "Net force not zero at d = {}: {:?}", dist, net);
    }
}

#[test]
fn attraction_points_toward_other_body() {
    let p = test_params();
    let sys = two_point_system(25.0, 1.0, 1.0);
    let out = force_pass(&sys, &p, &unclustered(&sys), &repulsion(2, false));

    let dx = sys.bodies[1].x - sys.bodies[0].x;
    assert!(out.linear[0].dot(&dx) > 0.0, "Acceleration is not toward second body");
    assert!(out.linear[1].dot(&dx) < 0.0, "Acceleration is not toward first body");
}

#[test]
fn attraction_follows_inverse_square_outside_sticky_band() {
    let p = test_params();
    let near = two_point_system(20.0, 1.0, 1.0);
    let far = two_point_system(40.0, 1.0, 1.0);

    let a_near = force_pass(&near, &p, &unclustered(&near), &repulsion(2, false));
    let a_far = force_pass(&far, &p, &unclustered(&far), &repulsion(2, false));

    let ratio = a_near.linear[0].norm() / a_far.linear[0].norm();
    assert!(approx(ratio, 4.0, 1e-9), "Expected 4x, got {}", ratio);
}

#[test]
fn sticky_term_only_inside_band() {
    let p = test_params();
    let mm = 6.0;

    // 11 < 1.2 T: inverse square plus sticky
    let inside = pair_magnitude(Interaction::Attract, 11.0, mm, &p);
    let expected = 2.0 * mm / 121.0 + 3.0 * mm / 121.0;
    assert!(approx(inside, expected, 1e-12), "got {}, expected {}", inside, expected);

    // 13 > 1.2 T: inverse square only
    let outside = pair_magnitude(Interaction::Attract, 13.0, mm, &p);
    assert!(approx(outside, 2.0 * mm / 169.0, 1e-12));
}

#[test]
fn threshold_distance_itself_is_inside() {
    let p = test_params();
    let sys = two_point_system(10.0, 2.0, 3.0);
    assert_eq!(sys.bodies[1].x.x - sys.bodies[0].x.x, p.threshold_distance);

    assert_eq!(classify(p.threshold_distance, false, false, &p), Interaction::Hold);
    assert_eq!(classify(p.threshold_distance, true, false, &p), Interaction::Repel);
    assert_eq!(classify(p.threshold_distance, true, true, &p), Interaction::ClusterExpand);
    assert_eq!(classify(p.threshold_distance + 1e-9, true, true, &p), Interaction::Attract);

    // holding force at exactly d = T: 0.5 * S * mm / T^p = 0.09, a = 0.09 / 2
    let out = force_pass(&sys, &p, &unclustered(&sys), &repulsion(2, false));
    assert!(approx(out.linear[0].x, 0.045, 1e-12), "got {}", out.linear[0].x);
    assert!(approx(out.linear[1].x, -0.03, 1e-12), "got {}", out.linear[1].x);

    // just outside the threshold the full attraction + sticky applies
    let outside = pair_magnitude(Interaction::Attract, p.threshold_distance + 1e-9, 6.0, &p);
    assert!(approx(outside, 0.30, 1e-9), "got {}", outside);
}

#[test]
fn force_is_deterministic_in_distance() {
    let p = test_params();
    for d in [3.0, 7.5, 10.0, 10.5, 11.9, 12.1, 50.0] {
        let repeat = pair_magnitude(classify(d, false, false, &p), d, 4.0, &p);
        let again = pair_magnitude(classify(d, false, false, &p), d, 4.0, &p);
        assert_eq!(repeat, again);
    }

    // continuous across the outer edge of the sticky band only up to the sticky term
    let below = pair_magnitude(Interaction::Attract, 12.0 - 1e-9, 1.0, &p);
    let above = pair_magnitude(Interaction::Attract, 12.0 + 1e-9, 1.0, &p);
    assert!(approx(below - above, 3.0 / 144.0, 1e-6));
}

#[test]
fn repulsion_between_unclustered_bodies() {
    let p = test_params();
    let sys = two_point_system(5.0, 2.0, 3.0);
    let out = force_pass(&sys, &p, &unclustered(&sys), &repulsion(2, true));

    // -R * mm / d^2 = -1.2
    assert!(approx(out.linear[0].x, -0.6, 1e-12), "got {}", out.linear[0].x);
    assert!(approx(out.linear[1].x, 0.4, 1e-12), "got {}", out.linear[1].x);
}

#[test]
fn same_cluster_repulsion_adds_radial_push() {
    let p = test_params();
    let sys = two_point_system(6.0, 2.0, 3.0);
    let clusters = clustered(&sys, &p);
    assert_eq!(clusters.len(), 1);

    let out = force_pass(&sys, &p, &clusters, &repulsion(2, true));

    // residual 0.3 R mm / d^2 plus radial 0.5 R mm / d^2, both along the axis here
    let total = 0.3 * 5.0 * 6.0 / 36.0 + radial_magnitude(6.0, 6.0, &p);
    assert!(approx(out.linear[0].x, -total / 2.0, 1e-12), "got {}", out.linear[0].x);
    assert!(approx(out.linear[1].x, total / 3.0, 1e-12), "got {}", out.linear[1].x);
}

#[test]
fn coincident_bodies_are_skipped() {
    let p = test_params();
    let sys = two_point_system(0.0, 1.0, 1.0);

    let out = force_pass(&sys, &p, &unclustered(&sys), &repulsion(2, true));
    assert_eq!(out.linear[0], NVec2::zeros());
    assert_eq!(out.linear[1], NVec2::zeros());
    assert!(proximity_edges(&sys.bodies, &p).is_empty());
}

#[test]
fn proximity_edges_below_eight_tenths_of_threshold() {
    let p = test_params();
    assert!(proximity_edges(&two_point_system(7.9, 1.0, 1.0).bodies, &p).contains(0, 1));
    assert!(proximity_edges(&two_point_system(8.0, 1.0, 1.0).bodies, &p).is_empty());
}

// ==================================================================================
// Rod tests
// ==================================================================================

#[test]
fn rod_off_center_push() {
    // L = 4, m = 3, F = 1.5 perpendicular at point A: alpha = 6F / (mL) = 0.75
    let mut rod = Body::rod(0, NVec2::new(50.0, 50.0), 3.0, 4.0, 0.0);
    let (point_a, _) = rod.endpoints().unwrap();
    let force = NVec2::new(0.0, 1.5);

    rod.apply_force_at_point(force, point_a);

    let alpha = rod.as_rod().unwrap().angular_acceleration;
    let expected = 6.0 * 1.5 / (3.0 * 4.0);
    assert!(approx(alpha, expected, 1e-12), "alpha = {}, expected {}", alpha, expected);
    assert!(approx(rod.a.y, 0.5, 1e-12));
    assert!(approx(rod.a.x, 0.0, 1e-12));
}

#[test]
fn force_through_rod_center_gives_no_torque() {
    let mut rod = Body::rod(0, NVec2::new(10.0, 10.0), 2.0, 6.0, 0.3);
    rod.apply_force_at_point(NVec2::new(1.0, -2.0), rod.x);
    assert_eq!(rod.as_rod().unwrap().angular_acceleration, 0.0);

    let mut point = Body::point(1, NVec2::zeros(), 2.0);
    point.apply_force_at_point(NVec2::new(0.0, 4.0), NVec2::new(3.0, 0.0));
    assert!(approx(point.a.y, 2.0, 1e-12));
}

#[test]
fn interaction_point_prefers_nearest_with_uneven_ties() {
    let rod = Body::rod(0, NVec2::zeros(), 1.0, 4.0, 0.0);
    let (point_a, point_b) = rod.endpoints().unwrap();
    assert_eq!(point_a, NVec2::new(2.0, 0.0));
    assert_eq!(point_b, NVec2::new(-2.0, 0.0));

    assert_eq!(rod.interaction_point(NVec2::new(5.0, 1.0)), point_a);
    assert_eq!(rod.interaction_point(NVec2::new(-5.0, 1.0)), point_b);
    // equidistant from both ends, center is nearest
    assert_eq!(rod.interaction_point(NVec2::new(0.0, 5.0)), rod.x);
    // A ties with the center and wins
    assert_eq!(rod.interaction_point(NVec2::new(1.0, 3.0)), point_a);
    // B ties with the center and loses
    assert_eq!(rod.interaction_point(NVec2::new(-1.0, 3.0)), rod.x);
}

#[test]
fn rod_pair_force_acts_at_nearest_end() {
    let p = test_params();
    // rod along x, point straight above its A end: pull on A turns the rod
    let sys = System {
        bodies: vec![
            Body::rod(0, NVec2::new(100.0, 100.0), 2.0, 8.0, 0.0),
            Body::point(1, NVec2::new(104.0, 125.0), 2.0),
        ],
        t: 0.0,
    };
    let out = force_pass(&sys, &p, &unclustered(&sys), &repulsion(2, false));

    assert!(out.linear[0].y > 0.0);
    assert!(out.angular[0] > 0.0, "pull above A should turn counter-clockwise");
    assert_eq!(out.angular[1], 0.0);
}

#[test]
fn rod_pair_separation_is_center_to_center() {
    let p = test_params();
    // tips meet at (110, 100) while the centers are 2 T apart
    let sys = System {
        bodies: vec![
            Body::rod(0, NVec2::new(100.0, 100.0), 2.0, 20.0, 0.0),
            Body::rod(1, NVec2::new(120.0, 100.0), 2.0, 20.0, 0.0),
        ],
        t: 0.0,
    };
    let (tip, _) = sys.bodies[0].endpoints().unwrap();
    let (_, other_tip) = sys.bodies[1].endpoints().unwrap();
    assert!((tip - other_tip).norm() < 1e-12);

    assert!(proximity_edges(&sys.bodies, &p).is_empty());
    assert_eq!(classify(20.0, false, false, &p), Interaction::Attract);

    let out = force_pass(&sys, &p, &unclustered(&sys), &repulsion(2, false));

    // k m1 m2 / d^2 / m = 2 * 4 / 400 / 2
    assert!(approx(out.linear[0].x, 0.01, 1e-12), "a0 = {:?}", out.linear[0]);
    assert!(approx(out.linear[1].x, -0.01, 1e-12), "a1 = {:?}", out.linear[1]);
    assert!(approx(out.angular[0], 0.0, 1e-12) && approx(out.angular[1], 0.0, 1e-12));
}

#[test]
fn rods_with_close_tips_but_distant_centers_are_not_linked() {
    let p = test_params();
    // tips 6 apart, centers 26 apart
    let bodies = vec![
        Body::rod(0, NVec2::new(100.0, 100.0), 1.0, 20.0, 0.0),
        Body::rod(1, NVec2::new(126.0, 100.0), 1.0, 20.0, 0.0),
    ];
    assert!(proximity_edges(&bodies, &p).is_empty());
}

#[test]
fn rod_point_force_magnitude_and_torque() {
    let p = test_params();
    let sys = System {
        bodies: vec![
            Body::rod(0, NVec2::new(100.0, 100.0), 2.0, 8.0, 0.0),
            Body::point(1, NVec2::new(104.0, 125.0), 2.0),
        ],
        t: 0.0,
    };
    let out = force_pass(&sys, &p, &unclustered(&sys), &repulsion(2, false));

    // d = |(4, 25)| > 1.2 T: plain attraction k m1 m2 / d^2
    let r = NVec2::new(4.0, 25.0);
    let d2 = r.norm_squared();
    let f = r / r.norm() * (2.0 * 4.0 / d2);

    assert!((out.linear[0] - f / 2.0).norm() < 1e-12, "rod: {:?}", out.linear[0]);
    assert!((out.linear[1] + f / 2.0).norm() < 1e-12, "point: {:?}", out.linear[1]);

    // applied at A = (104, 100), lever (4, 0), I = m L^2 / 12
    let alpha = 4.0 * f.y / moment_of_inertia(2.0, 8.0);
    assert!(approx(out.angular[0], alpha, 1e-12), "alpha = {}, expected {}", out.angular[0], alpha);
}

#[test]
fn rod_rod_force_magnitude_and_torque() {
    let p = test_params();
    // rod 0 along x meets rod 1 (vertical) through its A end, rod 1 answers with its B end
    let sys = System {
        bodies: vec![
            Body::rod(0, NVec2::new(100.0, 100.0), 2.0, 8.0, 0.0),
            Body::rod(1, NVec2::new(104.0, 111.0), 3.0, 8.0, TAU / 4.0),
        ],
        t: 0.0,
    };
    let (a0, _) = sys.bodies[0].endpoints().unwrap();
    let (_, b1) = sys.bodies[1].endpoints().unwrap();
    assert_eq!(sys.bodies[0].interaction_point(sys.bodies[1].x), a0);
    assert_eq!(sys.bodies[1].interaction_point(sys.bodies[0].x), b1);

    // interaction points are 7 apart, the centers sqrt(137) ~ 11.7
    assert!(proximity_edges(&sys.bodies, &p).is_empty());

    let out = force_pass(&sys, &p, &unclustered(&sys), &repulsion(2, false));

    // T < d < 1.2 T: attraction plus sticky term, sticky power 2
    let r = NVec2::new(4.0, 11.0);
    let d2 = r.norm_squared();
    let mm = 6.0;
    let f = r / r.norm() * ((2.0 * mm + 3.0 * mm) / d2);

    assert!((out.linear[0] - f / 2.0).norm() < 1e-12, "rod 0: {:?}", out.linear[0]);
    assert!((out.linear[1] + f / 3.0).norm() < 1e-12, "rod 1: {:?}", out.linear[1]);

    // rod 0: lever (4, 0) under +f, rod 1: lever (0, -4) under -f
    let alpha0 = 4.0 * f.y / moment_of_inertia(2.0, 8.0);
    let alpha1 = -4.0 * f.x / moment_of_inertia(3.0, 8.0);
    assert!(approx(out.angular[0], alpha0, 1e-12), "alpha0 = {}, expected {}", out.angular[0], alpha0);
    assert!(approx(out.angular[1], alpha1, 1e-12), "alpha1 = {}, expected {}", out.angular[1], alpha1);
}

#[test]
fn angular_velocity_is_capped() {
    let p = test_params();
    let mut rod = Body::rod(0, NVec2::new(10.0, 10.0), 1.0, 2.0, 0.0);
    rod.apply_force_at_point(NVec2::new(0.0, 1000.0), rod.endpoints().unwrap().0);

    integrate_body(&mut rod, &p);

    let r = rod.as_rod().unwrap();
    assert!(approx(r.angular_velocity, MAX_ANGULAR_VELOCITY, 1e-15));
    assert!(approx(r.angle, MAX_ANGULAR_VELOCITY, 1e-15));
    assert_eq!(r.angular_acceleration, 0.0);
}

#[test]
fn inertia_follows_mass() {
    let p = test_params();
    let mut rod = Body::rod(0, NVec2::new(10.0, 10.0), 3.0, 4.0, 0.0);
    assert!(approx(rod.as_rod().unwrap().moment_of_inertia, 4.0, 1e-12));

    // isolated, so it loses mass_loss_rate
    integrate_body(&mut rod, &p);
    assert!(approx(rod.m, 2.9, 1e-12));
    assert!(approx(
        rod.as_rod().unwrap().moment_of_inertia,
        moment_of_inertia(2.9, 4.0),
        1e-12
    ));
}

#[test]
fn angles_wrap_into_one_turn() {
    assert!(approx(normalize_angle(-0.5), TAU - 0.5, 1e-12));
    assert_eq!(normalize_angle(TAU), 0.0);
    assert!(approx(normalize_angle(7.0), 7.0 - TAU, 1e-12));
    assert!(normalize_angle(-1e-18) < TAU);
}

// ==================================================================================
// Integrator tests
// ==================================================================================

#[test]
fn speed_is_capped() {
    let mut p = common::still_params();
    p.max_speed = 2.0;

    let mut b = Body::point(0, NVec2::new(500.0, 500.0), 1.0).with_velocity(NVec2::new(3.0, 4.0));
    integrate_body(&mut b, &p);

    assert!(approx(b.v.norm(), 2.0, 1e-12));
    assert!(approx(b.x.x, 501.2, 1e-9) && approx(b.x.y, 501.6, 1e-9));
}

#[test]
fn positions_wrap_around_the_canvas() {
    let p = common::still_params();

    let mut right = Body::point(0, NVec2::new(999.5, 500.0), 1.0).with_velocity(NVec2::new(1.0, 0.0));
    integrate_body(&mut right, &p);
    assert!(approx(right.x.x, 0.5, 1e-9), "x = {}", right.x.x);

    let mut bottom = Body::point(1, NVec2::new(500.0, 0.2), 1.0).with_velocity(NVec2::new(0.0, -1.0));
    integrate_body(&mut bottom, &p);
    assert!(approx(bottom.x.y, 999.2, 1e-9), "y = {}", bottom.x.y);
}

#[test]
fn damping_slows_bodies_down() {
    let mut p = common::still_params();
    p.dampening_coefficient = 0.5;

    let mut b = Body::point(0, NVec2::new(500.0, 500.0), 2.0).with_velocity(NVec2::new(4.0, 0.0));
    integrate_body(&mut b, &p);

    // a = -c v / m = -1
    assert!(approx(b.v.x, 3.0, 1e-12));
    assert_eq!(b.a, NVec2::zeros());
}
