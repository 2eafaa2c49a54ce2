//! Repulsion delay scheduling
//!
//! A body has to stay clustered for a number of ticks before it may repulse.
//! Each tick [`advance`] moves one body's state machine forward from its
//! committed state and its proposed membership, then [`propagate`] makes the
//! decision cluster-wide: if any member of a cluster wants to repulse, all of
//! them do. The results are staged by the tick driver and only written back
//! to the bodies once the force pass is over.

use tracing::trace;

use crate::simulation::clustering::Clustering;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, Membership};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepulsionState {
    pub should_repulse: bool,
    pub timer: u32,               // consecutive ticks spent clustered, capped at `delay`
    pub delay: u32,               // ticks required before repulsing, grows with the cluster
    pub last_cluster_size: usize, // cluster size seen on the previous tick
}

impl RepulsionState {
    fn reset(p: &Parameters, cluster_size: usize) -> Self {
        Self {
            should_repulse: false,
            timer: 0,
            delay: p.repulsion_delay,
            last_cluster_size: cluster_size,
        }
    }
}

/// Next repulsion state of one body.
///
/// - isolated, or leaving a cluster: cleared
/// - newly clustered: cleared, counting starts next tick
/// - still clustered: timer counts up to the delay, a grown cluster pushes
///   the delay out by `delay_increase` (up to `max_repulsion_delay`)
pub fn advance(
    current: &RepulsionState,
    was_in_cluster: bool,
    next: &Membership,
    p: &Parameters,
) -> RepulsionState {
    if !next.in_cluster {
        return RepulsionState::reset(p, 0);
    }
    if !was_in_cluster {
        return RepulsionState::reset(p, next.cluster_size);
    }

    let mut delay = current.delay.max(p.repulsion_delay);
    if next.cluster_size > current.last_cluster_size {
        delay = delay.saturating_add(p.delay_increase).min(p.max_repulsion_delay);
    }

    let timer = current.timer.saturating_add(1).min(delay);

    RepulsionState {
        should_repulse: timer >= delay,
        timer,
        delay,
        last_cluster_size: next.cluster_size,
    }
}

/// Make repulsion all-or-nothing per cluster.
///
/// `states` is indexed by body slot, like the clustering's assignment.
/// Sets `repulsion_active` on every cluster with at least one willing member
/// and raises `should_repulse` on all of that cluster's members.
pub fn propagate(clustering: &mut Clustering, states: &mut [RepulsionState]) {
    let mut active = vec![false; clustering.len()];
    for (i, state) in states.iter().enumerate() {
        if let Some(c) = clustering.cluster_of(i) {
            active[c] |= state.should_repulse;
        }
    }

    for (i, state) in states.iter_mut().enumerate() {
        if let Some(c) = clustering.cluster_of(i) {
            state.should_repulse = active[c];
        }
    }

    for (cluster, is_active) in clustering.clusters.iter_mut().zip(active) {
        if is_active {
            trace!(size = cluster.size(), center = ?cluster.center, "cluster repulsing");
        }
        cluster.repulsion_active = is_active;
    }
}

/// Advance every body and propagate; returns the staged states by slot
pub fn schedule(
    bodies: &[Body],
    membership: &[Membership],
    clustering: &mut Clustering,
    p: &Parameters,
) -> Vec<RepulsionState> {
    let mut states: Vec<RepulsionState> = bodies
        .iter()
        .zip(membership)
        .map(|(b, next)| advance(&b.repulsion, b.membership.in_cluster, next, p))
        .collect();

    propagate(clustering, &mut states);
    states
}
