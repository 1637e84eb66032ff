//! Incremental graph builder.

use hn_core::{BranchId, JunctionId};

use crate::error::{TopologyError, TopologyResult};
use crate::graph::{Direction, Edge, Graph, Incidence, Vertex};
use crate::validate;

/// Builder for constructing a graph incrementally.
///
/// Use `add_junction` and `add_branch` to build up the graph,
/// then call `build()` to validate and freeze it into an immutable `Graph`.
#[derive(Debug, Default, Clone)]
pub struct GraphBuilder {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
}

impl GraphBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a junction and return its ID.
    pub fn add_junction(&mut self, name: impl Into<String>) -> JunctionId {
        let id = JunctionId::from_index(self.vertices.len() as u32);
        self.vertices.push(Vertex {
            id,
            name: name.into(),
        });
        id
    }

    /// Add a directed branch `from -> to`.
    ///
    /// Both junctions must already exist and be distinct. On error the
    /// builder is left unmodified.
    pub fn add_branch(
        &mut self,
        name: impl Into<String>,
        from: JunctionId,
        to: JunctionId,
    ) -> TopologyResult<BranchId> {
        let name = name.into();
        for junction in [from, to] {
            if !self.contains_junction(junction) {
                return Err(TopologyError::UnknownJunction {
                    branch: name,
                    junction,
                });
            }
        }
        if from == to {
            return Err(TopologyError::SelfLoop {
                branch: name,
                junction: from,
            });
        }

        let id = BranchId::from_index(self.edges.len() as u32);
        self.edges.push(Edge { id, name, from, to });
        Ok(id)
    }

    /// Whether a junction with this ID has been added.
    pub fn contains_junction(&self, id: JunctionId) -> bool {
        id.slot() < self.vertices.len()
    }

    /// Number of junctions added so far.
    pub fn junction_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of branches added so far.
    pub fn branch_count(&self) -> usize {
        self.edges.len()
    }

    /// Build and validate the graph, returning an immutable `Graph`.
    ///
    /// This performs validation and constructs compact adjacency lists.
    pub fn build(self) -> TopologyResult<Graph> {
        validate::validate_structure(&self.vertices, &self.edges)?;

        let (offsets, incidences) = Self::build_adjacency(&self.vertices, &self.edges);

        validate::validate_adjacency(&self.vertices, &self.edges, &offsets, &incidences)?;

        Ok(Graph {
            vertices: self.vertices,
            edges: self.edges,
            offsets,
            incidences,
        })
    }

    /// Build compact adjacency lists: for each junction, collect its incident branches.
    fn build_adjacency(vertices: &[Vertex], edges: &[Edge]) -> (Vec<usize>, Vec<Incidence>) {
        let mut per_junction: Vec<Vec<Incidence>> = vec![Vec::new(); vertices.len()];
        // Edges are visited in ID order, so each list is already sorted by branch.
        for edge in edges {
            per_junction[edge.from.slot()].push(Incidence {
                branch: edge.id,
                direction: Direction::Outgoing,
            });
            per_junction[edge.to.slot()].push(Incidence {
                branch: edge.id,
                direction: Direction::Incoming,
            });
        }

        let mut offsets = Vec::with_capacity(vertices.len() + 1);
        let mut flat = Vec::with_capacity(2 * edges.len());
        offsets.push(0);
        for list in per_junction {
            flat.extend(list);
            offsets.push(flat.len());
        }

        (offsets, flat)
    }
}

impl From<Graph> for GraphBuilder {
    fn from(graph: Graph) -> Self {
        Self {
            vertices: graph.vertices,
            edges: graph.edges,
        }
    }
}
