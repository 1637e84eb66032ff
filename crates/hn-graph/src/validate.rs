//! Graph validation logic.

use std::collections::HashSet;

use crate::error::{TopologyError, TopologyResult};
use crate::graph::{Direction, Edge, Incidence, Vertex};

/// Validate arena consistency: IDs match their slots and endpoints exist.
pub(crate) fn validate_structure(vertices: &[Vertex], edges: &[Edge]) -> TopologyResult<()> {
    for (slot, v) in vertices.iter().enumerate() {
        if v.id.slot() != slot {
            return Err(TopologyError::SlotMismatch {
                what: "junction",
                slot,
            });
        }
    }

    for (slot, edge) in edges.iter().enumerate() {
        if edge.id.slot() != slot {
            return Err(TopologyError::SlotMismatch {
                what: "branch",
                slot,
            });
        }
        for junction in [edge.from, edge.to] {
            if junction.slot() >= vertices.len() {
                return Err(TopologyError::UnknownJunction {
                    branch: edge.name.clone(),
                    junction,
                });
            }
        }
        if edge.from == edge.to {
            return Err(TopologyError::SelfLoop {
                branch: edge.name.clone(),
                junction: edge.from,
            });
        }
    }

    Ok(())
}

/// Validate adjacency lists for consistency.
pub(crate) fn validate_adjacency(
    vertices: &[Vertex],
    edges: &[Edge],
    offsets: &[usize],
    incidences: &[Incidence],
) -> TopologyResult<()> {
    if offsets.len() != vertices.len() + 1 {
        return Err(TopologyError::SlotMismatch {
            what: "adjacency offsets",
            slot: offsets.len(),
        });
    }

    let mut seen: HashSet<(usize, bool)> = HashSet::with_capacity(incidences.len());
    for vertex in vertices {
        let idx = vertex.id.slot();
        for inc in &incidences[offsets[idx]..offsets[idx + 1]] {
            let edge = edges
                .get(inc.branch.slot())
                .ok_or(TopologyError::UnknownBranch(inc.branch))?;
            let touches = match inc.direction {
                Direction::Outgoing => edge.from == vertex.id,
                Direction::Incoming => edge.to == vertex.id,
            };
            if !touches || !seen.insert((inc.branch.slot(), inc.direction == Direction::Outgoing)) {
                return Err(TopologyError::InconsistentAdjacency {
                    branch: inc.branch,
                    junction: vertex.id,
                });
            }
        }
    }

    // Every branch appears exactly twice: once per endpoint.
    if seen.len() != 2 * edges.len() {
        let missing = edges
            .iter()
            .find(|e| !seen.contains(&(e.id.slot(), true)) || !seen.contains(&(e.id.slot(), false)));
        if let Some(edge) = missing {
            return Err(TopologyError::InconsistentAdjacency {
                branch: edge.id,
                junction: edge.from,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::Id;

    fn two_vertices() -> Vec<Vertex> {
        vec![
            Vertex {
                id: Id::from_index(0),
                name: "J1".into(),
            },
            Vertex {
                id: Id::from_index(1),
                name: "J2".into(),
            },
        ]
    }

    #[test]
    fn validate_empty_graph() {
        assert!(validate_structure(&[], &[]).is_ok());
        assert!(validate_adjacency(&[], &[], &[0], &[]).is_ok());
    }

    #[test]
    fn validate_invalid_junction_ref() {
        let edges = vec![Edge {
            id: Id::from_index(0),
            name: "B1".into(),
            from: Id::from_index(0),
            to: Id::from_index(99),
        }];

        let result = validate_structure(&two_vertices(), &edges);
        assert!(matches!(
            result,
            Err(TopologyError::UnknownJunction { .. })
        ));
    }

    #[test]
    fn validate_adjacency_wrong_direction() {
        let vertices = two_vertices();
        let edges = vec![Edge {
            id: Id::from_index(0),
            name: "B1".into(),
            from: Id::from_index(0),
            to: Id::from_index(1),
        }];
        // Junction 0 claims the branch enters it, but it leaves.
        let incidences = vec![
            Incidence {
                branch: Id::from_index(0),
                direction: Direction::Incoming,
            },
            Incidence {
                branch: Id::from_index(0),
                direction: Direction::Incoming,
            },
        ];
        let result = validate_adjacency(&vertices, &edges, &[0, 1, 2], &incidences);
        assert!(matches!(
            result,
            Err(TopologyError::InconsistentAdjacency { .. })
        ));
    }

    #[test]
    fn validate_adjacency_missing_entry() {
        let vertices = two_vertices();
        let edges = vec![Edge {
            id: Id::from_index(0),
            name: "B1".into(),
            from: Id::from_index(0),
            to: Id::from_index(1),
        }];
        let incidences = vec![Incidence {
            branch: Id::from_index(0),
            direction: Direction::Outgoing,
        }];
        let result = validate_adjacency(&vertices, &edges, &[0, 1, 1], &incidences);
        assert!(result.is_err());
    }
}
