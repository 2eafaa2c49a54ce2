//! Tick driver for the clustering simulation
//!
//! `Engine` owns the body collection and everything that has to survive from
//! one tick to the next (last tick's proximity edges, the cluster partition
//! exposed to collaborators, the id counter). A tick runs strictly in order:
//!
//! 1. proximity edges and clustering from the current positions
//! 2. repulsion scheduling and cluster-wide propagation, staged per body
//! 3. force pass, reading only the staged view
//! 4. commit of the staged membership / repulsion state to the bodies
//! 5. integration and bookkeeping
//!
//! Bodies may be added or removed between ticks only.

use thiserror::Error;
use tracing::debug;

use crate::simulation::clustering::{Cluster, Clustering, EdgeSet};
use crate::simulation::forces::{self, ForceBuffer, ForceSet, TickFrame};
use crate::simulation::integrator;
use crate::simulation::params::Parameters;
use crate::simulation::repulsion::{self, RepulsionState};
use crate::simulation::states::{Body, BodyId, BodyVariant, Membership, NVec2, System};

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("no body with id {0}")]
    UnknownBody(BodyId),
    #[error("body id {0} is already in use")]
    DuplicateId(BodyId),
    #[error("no body ids left to hand out")]
    IdsExhausted,
    #[error("rod length must be positive and finite, got {0}")]
    InvalidRodLength(f64),
}

/// Summary of the population after the last tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub tick: u64,
    pub t: f64,
    pub bodies: usize,
    pub clusters: usize,
    pub largest_cluster: usize,
    pub clustered: usize,
    pub repulsing: usize,
    pub mean_mass: f64,
}

/// Per-body state computed before the force pass and written back after it
struct Staged {
    membership: Vec<Membership>,
    repulsion: Vec<RepulsionState>,
}

impl Staged {
    fn commit(self, bodies: &mut [Body]) {
        for ((b, membership), repulsion) in bodies.iter_mut().zip(self.membership).zip(self.repulsion) {
            b.membership = membership;
            b.repulsion = repulsion;
        }
    }
}

pub struct Engine {
    pub system: System,
    forces: ForceSet,
    buffer: ForceBuffer,
    clustering: Clustering, // partition from the last tick
    edges: EdgeSet,         // proximity edges from the last tick
    next_id: Option<BodyId>, // None once u32::MAX has been handed out
    tick: u64,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Empty engine with the standard sticky interaction
    pub fn new() -> Self {
        Self::with_forces(ForceSet::default())
    }

    pub fn with_forces(forces: ForceSet) -> Self {
        Self {
            system: System::default(),
            forces,
            buffer: ForceBuffer::default(),
            clustering: Clustering::default(),
            edges: EdgeSet::new(),
            next_id: Some(0),
            tick: 0,
        }
    }

    // =====================================================================
    // Population
    // =====================================================================

    /// Create a body at rest with a fresh id and append it to the collection.
    /// The returned body can be adjusted (e.g. given a velocity) before the next tick.
    /// Ids are never reused, so this fails once the id space is used up.
    pub fn add_body(&mut self, variant: BodyVariant, x: NVec2, m: f64) -> Result<&mut Body, EngineError> {
        if let BodyVariant::Rod { length, .. } = variant {
            if !(length.is_finite() && length > 0.0) {
                return Err(EngineError::InvalidRodLength(length));
            }
        }
        let id = self.next_id.ok_or(EngineError::IdsExhausted)?;
        self.next_id = id.checked_add(1);
        let i = self.system.bodies.len();
        self.system.bodies.push(Body::new(id, variant, x, m));
        Ok(&mut self.system.bodies[i])
    }

    /// Insert a prebuilt body, keeping its id. Fresh ids handed out later
    /// continue above the highest id seen.
    pub fn insert_body(&mut self, body: Body) -> Result<BodyId, EngineError> {
        if self.system.get(body.id).is_some() {
            return Err(EngineError::DuplicateId(body.id));
        }
        let id = body.id;
        if let Some(next) = self.next_id {
            if id >= next {
                self.next_id = id.checked_add(1);
            }
        }
        self.system.bodies.push(body);
        Ok(id)
    }

    /// Remove a body; its edges are forgotten so it can never count as a
    /// newly formed connection later. Cluster queries keep describing the
    /// last tick until the next one runs.
    pub fn remove_body(&mut self, id: BodyId) -> Result<Body, EngineError> {
        let i = self.system.index_of(id).ok_or(EngineError::UnknownBody(id))?;
        self.edges.remove_body(id);
        Ok(self.system.bodies.remove(i))
    }

    pub fn bodies(&self) -> &[Body] {
        &self.system.bodies
    }

    /// Mutable access for collaborators editing state between ticks
    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.system.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.system.get(id)
    }

    // =====================================================================
    // Cluster queries
    // =====================================================================

    /// Number of clusters found on the last tick
    pub fn cluster_count(&self) -> usize {
        self.clustering.len()
    }

    /// Size of the cluster holding `id`, 0 if none
    pub fn cluster_size(&self, id: BodyId) -> usize {
        self.clustering.cluster_size(id)
    }

    pub fn cluster_center(&self, index: usize) -> Option<NVec2> {
        self.clustering.center(index)
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clustering.clusters
    }

    /// Proximity edges seen on the last tick
    pub fn edges(&self) -> &EdgeSet {
        &self.edges
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn time(&self) -> f64 {
        self.system.t
    }

    // =====================================================================
    // Tick
    // =====================================================================

    /// Advance the whole population by one tick
    pub fn tick(&mut self, p: &Parameters) {
        let edges = forces::proximity_edges(&self.system.bodies, p);
        let mut clustering = Clustering::build(&self.system.bodies, &edges, &self.edges);

        let membership: Vec<Membership> = self
            .system
            .bodies
            .iter()
            .enumerate()
            .map(|(i, b)| clustering.proposed_membership(i, &b.membership))
            .collect();
        let repulsion = repulsion::schedule(&self.system.bodies, &membership, &mut clustering, p);
        let staged = Staged { membership, repulsion };

        let frame = TickFrame {
            clustering: &clustering,
            repulsion: &staged.repulsion,
        };
        self.forces.accumulate_forces(&self.system, &frame, p, &mut self.buffer);

        staged.commit(&mut self.system.bodies);
        integrator::step(&mut self.system, &self.buffer, p);

        let formed = clustering.clusters.iter().filter(|c| c.newly_formed).count();
        if formed > 0 {
            debug!(tick = self.tick, formed, clusters = clustering.len(), "clusters formed");
        }

        self.system.t += p.time_step;
        self.tick += 1;
        self.edges = edges;
        self.clustering = clustering;
    }

    pub fn stats(&self) -> Stats {
        let bodies = &self.system.bodies;
        let mean_mass = if bodies.is_empty() {
            0.0
        } else {
            bodies.iter().map(|b| b.m).sum::<f64>() / bodies.len() as f64
        };

        Stats {
            tick: self.tick,
            t: self.system.t,
            bodies: bodies.len(),
            clusters: self.clustering.len(),
            largest_cluster: self.clustering.clusters.iter().map(Cluster::size).max().unwrap_or(0),
            clustered: bodies.iter().filter(|b| b.membership.in_cluster).count(),
            repulsing: bodies.iter().filter(|b| b.repulsion.should_repulse).count(),
            mean_mass,
        }
    }
}
