//! Core state types for the clustering simulation.
//!
//! Defines the body/system structs:
//! - `Body`      shared kinematic, mass and cluster state for one entity
//! - `BodyKind`  variant tag: a plain point or a rigid `Rod`
//! - `System`    ordered body collection plus the current time `t`
//!
//! Rod endpoints are never stored; they are derived from `x`, the rod angle
//! and its length whenever they are asked for.

use nalgebra::Vector2;

use crate::simulation::repulsion::RepulsionState;
use crate::simulation::rod::{self, Rod};

pub type NVec2 = Vector2<f64>;

/// Stable body identifier, vertex key of the proximity graph
pub type BodyId = u32;

/// Cluster membership as seen by collaborators between ticks
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Membership {
    pub in_cluster: bool,    // member of a component with 2+ bodies this tick
    pub cluster_size: usize, // size of that component, 0 when isolated
    pub cluster_count: u32,  // lifetime count of cluster-formation events, never decreases
}

/// Variant selector used when creating bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyVariant {
    Point,
    Rod { length: f64, angle: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyKind {
    Point,
    Rod(Rod),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: BodyId,                 // unique for the body's lifetime
    pub x: NVec2,                   // position
    pub v: NVec2,                   // velocity
    pub a: NVec2,                   // accumulated acceleration (sum of forces / mass)
    pub m: f64,                     // mass
    pub membership: Membership,     // committed cluster membership
    pub repulsion: RepulsionState,  // committed repulsion-delay state
    pub kind: BodyKind,             // point or rod
}

impl Body {
    /// Point body at rest
    pub fn point(id: BodyId, x: NVec2, m: f64) -> Self {
        Self {
            id,
            x,
            v: NVec2::zeros(),
            a: NVec2::zeros(),
            m,
            membership: Membership::default(),
            repulsion: RepulsionState::default(),
            kind: BodyKind::Point,
        }
    }

    /// Rod body at rest, `angle` in radians
    pub fn rod(id: BodyId, x: NVec2, m: f64, length: f64, angle: f64) -> Self {
        Self {
            kind: BodyKind::Rod(Rod::new(length, angle, m)),
            ..Self::point(id, x, m)
        }
    }

    pub fn new(id: BodyId, variant: BodyVariant, x: NVec2, m: f64) -> Self {
        match variant {
            BodyVariant::Point => Self::point(id, x, m),
            BodyVariant::Rod { length, angle } => Self::rod(id, x, m, length, angle),
        }
    }

    pub fn with_velocity(mut self, v: NVec2) -> Self {
        self.v = v;
        self
    }

    pub fn is_rod(&self) -> bool {
        matches!(self.kind, BodyKind::Rod(_))
    }

    pub fn as_rod(&self) -> Option<&Rod> {
        match &self.kind {
            BodyKind::Rod(rod) => Some(rod),
            BodyKind::Point => None,
        }
    }

    pub fn as_rod_mut(&mut self) -> Option<&mut Rod> {
        match &mut self.kind {
            BodyKind::Rod(rod) => Some(rod),
            BodyKind::Point => None,
        }
    }

    /// Rod endpoints `(pointA, pointB)`, `None` for point bodies
    pub fn endpoints(&self) -> Option<(NVec2, NVec2)> {
        self.as_rod().map(|rod| rod.endpoints(self.x))
    }

    /// Point on this body that interacts with `target`.
    /// Point bodies always interact through their center.
    pub fn interaction_point(&self, target: NVec2) -> NVec2 {
        match &self.kind {
            BodyKind::Point => self.x,
            BodyKind::Rod(rod) => rod.interaction_point(self.x, target),
        }
    }

    /// Linear and angular acceleration produced by `force` acting at `point`.
    /// Angular part is zero for point bodies.
    pub fn response_to(&self, force: NVec2, point: NVec2) -> (NVec2, f64) {
        let linear = force / self.m;
        let angular = match &self.kind {
            BodyKind::Point => 0.0,
            BodyKind::Rod(rod) => rod::torque(point - self.x, force) / rod.moment_of_inertia,
        };
        (linear, angular)
    }

    /// Apply a force through the center of mass
    pub fn apply_force(&mut self, force: NVec2) {
        self.a += force / self.m;
    }

    /// Apply a force at an arbitrary point; off-center forces on rods turn into torque
    pub fn apply_force_at_point(&mut self, force: NVec2, point: NVec2) {
        let (linear, angular) = self.response_to(force, point);
        self.accelerate(linear, angular);
    }

    /// Add precomputed linear and angular acceleration
    pub fn accelerate(&mut self, linear: NVec2, angular: f64) {
        self.a += linear;
        if let Some(rod) = self.as_rod_mut() {
            rod.angular_acceleration += angular;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct System {
    pub bodies: Vec<Body>, // ordered collection, ids stable
    pub t: f64,            // time
}

impl System {
    pub fn index_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.iter().position(|b| b.id == id)
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }
}
