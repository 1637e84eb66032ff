//! Core graph data structures.

use hn_core::{BranchId, JunctionId};
use petgraph::unionfind::UnionFind;

/// Orientation of a branch relative to one of its endpoint junctions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The branch leaves this junction (junction is the branch's `from`).
    Outgoing,
    /// The branch enters this junction (junction is the branch's `to`).
    Incoming,
}

impl Direction {
    /// Sign of a positive branch flow in this junction's mass balance.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Outgoing => -1.0,
            Direction::Incoming => 1.0,
        }
    }
}

/// A junction in the topology: an ID and a name for human reference.
///
/// Physical data (reference pressure, elevation, ...) lives with the network,
/// not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vertex {
    pub id: JunctionId,
    pub name: String,
}

/// A directed branch between two distinct junctions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: BranchId,
    pub name: String,
    pub from: JunctionId,
    pub to: JunctionId,
}

/// One entry of a junction's adjacency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Incidence {
    pub branch: BranchId,
    pub direction: Direction,
}

/// The graph: a validated, immutable collection of junctions and branches.
///
/// The graph stores:
/// - All junctions and branches in vectors (indexed by their IDs).
/// - Compact adjacency: for each junction, its incident branches with direction.
///
/// Cycles and parallel branches are allowed; district-heating loops need both.
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<Edge>,

    /// Junction i's incidences are in incidences[offsets[i]..offsets[i+1]].
    pub(crate) offsets: Vec<usize>,

    /// Flat incidence list, sorted by junction then branch for determinism.
    pub(crate) incidences: Vec<Incidence>,
}

impl Graph {
    /// Return all junctions.
    pub fn junctions(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Return all branches.
    pub fn branches(&self) -> &[Edge] {
        &self.edges
    }

    /// Get a junction by ID (returns None if ID out of bounds).
    pub fn junction(&self, id: JunctionId) -> Option<&Vertex> {
        self.vertices.get(id.slot())
    }

    /// Get a branch by ID (returns None if ID out of bounds).
    pub fn branch(&self, id: BranchId) -> Option<&Edge> {
        self.edges.get(id.slot())
    }

    /// Branches incident to a junction, each tagged with its direction.
    pub fn incident(&self, junction: JunctionId) -> &[Incidence] {
        let idx = junction.slot();
        if idx >= self.vertices.len() {
            return &[];
        }
        &self.incidences[self.offsets[idx]..self.offsets[idx + 1]]
    }

    /// Number of branches touching a junction.
    pub fn degree(&self, junction: JunctionId) -> usize {
        self.incident(junction).len()
    }

    /// `(from, to)` junctions of a branch.
    pub fn endpoints(&self, branch: BranchId) -> Option<(JunctionId, JunctionId)> {
        self.branch(branch).map(|e| (e.from, e.to))
    }

    /// Label every junction with the index of its (undirected) connected component.
    ///
    /// Labels are dense, assigned in junction order. Returns `(labels, count)`.
    pub fn connected_components(&self) -> (Vec<usize>, usize) {
        let n = self.vertices.len();
        let mut sets = UnionFind::<usize>::new(n);
        for edge in &self.edges {
            sets.union(edge.from.slot(), edge.to.slot());
        }

        let mut root_label = vec![usize::MAX; n];
        let mut labels = Vec::with_capacity(n);
        let mut count = 0;
        for idx in 0..n {
            let root = sets.find(idx);
            if root_label[root] == usize::MAX {
                root_label[root] = count;
                count += 1;
            }
            labels.push(root_label[root]);
        }

        (labels, count)
    }
}
