//! Connectivity-based cluster detection
//!
//! Every tick the proximity edges are fed into a disjoint-set forest keyed by
//! body id. Components with two or more members become [`Cluster`]s; lone
//! bodies are not clusters. Clusters carry no identity from one tick to the
//! next, the only thing remembered across ticks is the raw [`EdgeSet`], which
//! is diffed against the previous tick to count cluster-formation events.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::simulation::states::{Body, BodyId, Membership, NVec2};

/// Unordered body pair, always stored as `(lower id, higher id)`
pub type Edge = (BodyId, BodyId);

pub fn edge(a: BodyId, b: BodyId) -> Edge {
    if a <= b { (a, b) } else { (b, a) }
}

/// Proximity graph edges for one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeSet {
    edges: BTreeSet<Edge>,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, a: BodyId, b: BodyId) -> bool {
        self.edges.insert(edge(a, b))
    }

    pub fn contains(&self, a: BodyId, b: BodyId) -> bool {
        self.edges.contains(&edge(a, b))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Edges present here but not in `previous`
    pub fn difference<'a>(&'a self, previous: &'a EdgeSet) -> impl Iterator<Item = &'a Edge> {
        self.edges.difference(&previous.edges)
    }

    /// Drop every edge touching a body that no longer exists
    pub fn remove_body(&mut self, id: BodyId) {
        self.edges.retain(|&(a, b)| a != id && b != id);
    }
}

impl FromIterator<Edge> for EdgeSet {
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        let mut set = EdgeSet::new();
        for (a, b) in iter {
            set.insert(a, b);
        }
        set
    }
}

/// Disjoint-set forest over body slots.
///
/// Unions always hang the root with the higher body id below the root with
/// the lower one, so every root is the smallest id of its component no matter
/// in which order edges arrive.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    ids: Vec<BodyId>,
}

impl UnionFind {
    /// One singleton set per id
    pub fn new(ids: Vec<BodyId>) -> Self {
        Self {
            parent: (0..ids.len()).collect(),
            ids,
        }
    }

    /// Root slot of `i`, compressing the path on the way back
    pub fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut node = i;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        if self.ids[ra] < self.ids[rb] {
            self.parent[rb] = ra;
        } else {
            self.parent[ra] = rb;
        }
    }

    /// Body id at the root of `i`'s set
    pub fn root_id(&mut self, i: usize) -> BodyId {
        let root = self.find(i);
        self.ids[root]
    }
}

/// One connected component with at least two members
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub members: Vec<BodyId>,  // sorted ascending
    pub center: NVec2,         // mean member position
    pub repulsion_active: bool,
    pub newly_formed: bool,    // contains an edge that did not exist last tick
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Cluster partition of a body slice for one tick
#[derive(Debug, Clone, Default)]
pub struct Clustering {
    pub clusters: Vec<Cluster>,        // ordered by lowest member id
    assignment: Vec<Option<usize>>,    // body slot -> cluster index
    by_id: HashMap<BodyId, usize>,     // body id -> cluster index
}

impl Clustering {
    /// Partition `bodies` along `edges`; `previous` is last tick's edge set
    pub fn build(bodies: &[Body], edges: &EdgeSet, previous: &EdgeSet) -> Self {
        let slot_of: HashMap<BodyId, usize> = bodies
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id, i))
            .collect();

        let mut sets = UnionFind::new(bodies.iter().map(|b| b.id).collect());
        for &(a, b) in edges.iter() {
            if let (Some(&ia), Some(&ib)) = (slot_of.get(&a), slot_of.get(&b)) {
                sets.union(ia, ib);
            }
        }

        // Group slots by root id; BTreeMap keeps cluster order independent of body order
        let mut components: BTreeMap<BodyId, Vec<usize>> = BTreeMap::new();
        for i in 0..bodies.len() {
            components.entry(sets.root_id(i)).or_default().push(i);
        }

        let mut formed_roots = BTreeSet::new();
        for &(a, _) in edges.difference(previous) {
            if let Some(&ia) = slot_of.get(&a) {
                formed_roots.insert(sets.root_id(ia));
            }
        }

        let mut clusters = Vec::new();
        let mut assignment = vec![None; bodies.len()];
        let mut by_id = HashMap::new();

        for (root, slots) in components {
            if slots.len() < 2 {
                continue;
            }
            let index = clusters.len();

            let mut members: Vec<BodyId> = slots.iter().map(|&i| bodies[i].id).collect();
            members.sort_unstable();

            let sum = slots.iter().fold(NVec2::zeros(), |acc, &i| acc + bodies[i].x);
            let center = sum / slots.len() as f64;

            for &i in &slots {
                assignment[i] = Some(index);
                by_id.insert(bodies[i].id, index);
            }

            clusters.push(Cluster {
                members,
                center,
                repulsion_active: false,
                newly_formed: formed_roots.contains(&root),
            });
        }

        Self {
            clusters,
            assignment,
            by_id,
        }
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Cluster index of the body in slot `i`
    pub fn cluster_of(&self, i: usize) -> Option<usize> {
        self.assignment.get(i).copied().flatten()
    }

    pub fn cluster_of_id(&self, id: BodyId) -> Option<&Cluster> {
        self.by_id.get(&id).map(|&c| &self.clusters[c])
    }

    /// Size of the cluster holding `id`, 0 if it is isolated or unknown
    pub fn cluster_size(&self, id: BodyId) -> usize {
        self.cluster_of_id(id).map_or(0, Cluster::size)
    }

    pub fn center(&self, cluster: usize) -> Option<NVec2> {
        self.clusters.get(cluster).map(|c| c.center)
    }

    /// True when bodies in slots `i` and `j` share a cluster
    pub fn same_cluster(&self, i: usize, j: usize) -> bool {
        match (self.cluster_of(i), self.cluster_of(j)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Membership the body in slot `i` should carry after this tick
    pub fn proposed_membership(&self, i: usize, current: &Membership) -> Membership {
        match self.cluster_of(i) {
            Some(c) => {
                let cluster = &self.clusters[c];
                Membership {
                    in_cluster: true,
                    cluster_size: cluster.size(),
                    cluster_count: current.cluster_count + u32::from(cluster.newly_formed),
                }
            }
            None => Membership {
                in_cluster: false,
                cluster_size: 0,
                cluster_count: current.cluster_count,
            },
        }
    }
}
