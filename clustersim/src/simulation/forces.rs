//! Force contributors for the clustering engine
//!
//! Defines the force-term trait and the sticky pair interaction: long-range
//! attraction with a sticky band just outside the threshold, and inside it
//! either a weak holding force or, once a cluster has decided to repulse,
//! inverse-square repulsion. Rods take their share of every pair force at
//! their interaction point, so off-center pushes turn into torque.

use crate::simulation::clustering::{Clustering, EdgeSet};
use crate::simulation::params::Parameters;
use crate::simulation::repulsion::RepulsionState;
use crate::simulation::states::{Body, NVec2, System};

/// Per-body linear and angular acceleration accumulated over one force pass
#[derive(Debug, Clone, Default)]
pub struct ForceBuffer {
    pub linear: Vec<NVec2>,
    pub angular: Vec<f64>,
}

impl ForceBuffer {
    pub fn zeros(n: usize) -> Self {
        Self {
            linear: vec![NVec2::zeros(); n],
            angular: vec![0.0; n],
        }
    }

    /// Zero the buffer and size it for `n` bodies
    pub fn reset(&mut self, n: usize) {
        self.linear.clear();
        self.linear.resize(n, NVec2::zeros());
        self.angular.clear();
        self.angular.resize(n, 0.0);
    }

    /// Record `force` acting on `body` (slot `i`) at `point`
    pub fn apply(&mut self, i: usize, body: &Body, force: NVec2, point: NVec2) {
        let (linear, angular) = body.response_to(force, point);
        self.linear[i] += linear;
        self.angular[i] += angular;
    }
}

/// Staged cluster view the force pass reads instead of the bodies' own flags
pub struct TickFrame<'a> {
    pub clustering: &'a Clustering,
    pub repulsion: &'a [RepulsionState], // by body slot
}

/// Trait for force sources operating on [`System`]
/// Implementations add their contribution into `out` for each body
pub trait ForceTerm {
    fn accumulate(&self, sys: &System, frame: &TickFrame, p: &Parameters, out: &mut ForceBuffer);
}

/// Collection of force terms, summed into one buffer per tick
pub struct ForceSet {
    terms: Vec<Box<dyn ForceTerm + Send + Sync>>,
}

impl ForceSet {
    /// Create an empty force set
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add a force term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: ForceTerm + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    /// Zero `out` and let every term add into it
    pub fn accumulate_forces(&self, sys: &System, frame: &TickFrame, p: &Parameters, out: &mut ForceBuffer) {
        out.reset(sys.bodies.len());
        for term in &self.terms {
            term.accumulate(sys, frame, p, out);
        }
    }
}

impl Default for ForceSet {
    fn default() -> Self {
        Self::new().with(StickyInteraction)
    }
}

/// Separation of a pair and where its force lands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub pa: NVec2, // application point on a
    pub pb: NVec2, // application point on b
    pub r: NVec2,  // b.x - a.x
    pub d: f64,    // |r|
}

/// Separation is always measured between body centers. Rods only move the
/// application point to the endpoint or center nearest the other body.
pub fn contact(a: &Body, b: &Body) -> Contact {
    let r = b.x - a.x;
    Contact {
        pa: a.interaction_point(b.x),
        pb: b.interaction_point(a.x),
        r,
        d: r.norm(),
    }
}

/// Proximity graph for the current positions: pairs whose centers are
/// closer than 0.8 T
pub fn proximity_edges(bodies: &[Body], p: &Parameters) -> EdgeSet {
    let limit = p.proximity_distance();
    let mut edges = EdgeSet::new();
    for (i, a) in bodies.iter().enumerate() {
        for b in &bodies[i + 1..] {
            let d = (b.x - a.x).norm();
            if d > 0.0 && d < limit {
                edges.insert(a.id, b.id);
            }
        }
    }
    edges
}

/// Force regime of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Attract,       // d > T: inverse-square pull, plus sticky term inside 1.2 T
    Hold,          // d <= T, nobody repulsing: weak sticky pull
    ClusterExpand, // d <= T, repulsing, same cluster: radial push + residual pair push
    Repel,         // d <= T, repulsing, different clusters or unclustered
}

pub fn classify(d: f64, repulsing: bool, same_cluster: bool, p: &Parameters) -> Interaction {
    if d > p.threshold_distance {
        Interaction::Attract
    } else if !repulsing {
        Interaction::Hold
    } else if same_cluster {
        Interaction::ClusterExpand
    } else {
        Interaction::Repel
    }
}

/// Signed magnitude along the pair axis, positive pulls the bodies together.
/// `mm` is the mass product. For `ClusterExpand` this is only the residual
/// pairwise part; the radial part comes from [`radial_magnitude`].
pub fn pair_magnitude(kind: Interaction, d: f64, mm: f64, p: &Parameters) -> f64 {
    let inverse_square = mm / (d * d);
    let sticky = p.sticky_force_coefficient * mm / d.powf(p.sticky_force_power);

    match kind {
        Interaction::Attract => {
            let mut f = p.attraction_coefficient * inverse_square;
            if d < p.sticky_band() {
                f += sticky;
            }
            f
        }
        Interaction::Hold => 0.5 * sticky,
        Interaction::ClusterExpand => -0.3 * p.repulsion_coefficient * inverse_square,
        Interaction::Repel => -p.repulsion_coefficient * inverse_square,
    }
}

/// Push each member of a repulsing pair receives away from the cluster center
pub fn radial_magnitude(d: f64, mm: f64, p: &Parameters) -> f64 {
    0.5 * p.repulsion_coefficient * mm / (d * d)
}

/// The attraction / stickiness / repulsion law, evaluated over every
/// unordered pair (i, j) with i < j
pub struct StickyInteraction;

impl ForceTerm for StickyInteraction {
    fn accumulate(&self, sys: &System, frame: &TickFrame, p: &Parameters, out: &mut ForceBuffer) {
        let n = sys.bodies.len();
        if n < 2 {
            return;
        }

        for i in 0..n {
            let a = &sys.bodies[i];
            for j in (i + 1)..n {
                let b = &sys.bodies[j];

                let c = contact(a, b);
                if c.d == 0.0 {
                    // coincident centers, no direction to push along
                    continue;
                }

                let mm = a.m * b.m;
                let repulsing = frame.repulsion[i].should_repulse || frame.repulsion[j].should_repulse;
                let same_cluster = frame.clustering.same_cluster(i, j);
                let kind = classify(c.d, repulsing, same_cluster, p);

                // unit vector from a's center towards b's
                let u = c.r / c.d;
                let f = pair_magnitude(kind, c.d, mm, p);

                // a is pulled along +u, b along -u (negative f pushes apart)
                out.apply(i, a, u * f, c.pa);
                out.apply(j, b, -u * f, c.pb);

                if kind == Interaction::ClusterExpand {
                    let center = frame
                        .clustering
                        .cluster_of(i)
                        .and_then(|k| frame.clustering.center(k));
                    if let Some(center) = center {
                        let push = radial_magnitude(c.d, mm, p);
                        apply_radial(out, i, a, center, push, c.pa);
                        apply_radial(out, j, b, center, push, c.pb);
                    }
                }
            }
        }
    }
}

/// Push `body` straight away from `center`; a body sitting on the center
/// gets no radial share
fn apply_radial(out: &mut ForceBuffer, i: usize, body: &Body, center: NVec2, push: f64, point: NVec2) {
    let outward = body.x - center;
    let len = outward.norm();
    if len > 0.0 {
        out.apply(i, body, outward * (push / len), point);
    }
}
