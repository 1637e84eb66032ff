//! Topology error types.

use hn_core::{BranchId, JunctionId};
use thiserror::Error;

pub type TopologyResult<T> = Result<T, TopologyError>;

/// Graph construction and validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// A branch refers to a junction that doesn't exist.
    #[error("Branch '{branch}' refers to non-existent junction {junction}")]
    UnknownJunction { branch: String, junction: JunctionId },

    /// A branch starts and ends at the same junction.
    #[error("Branch '{branch}' connects junction {junction} to itself")]
    SelfLoop { branch: String, junction: JunctionId },

    /// An ID lookup failed on a built graph.
    #[error("Branch {0} not found")]
    UnknownBranch(BranchId),

    /// Adjacency list is inconsistent with the branch table.
    #[error("Branch {branch} in junction {junction}'s adjacency list but doesn't touch it")]
    InconsistentAdjacency {
        branch: BranchId,
        junction: JunctionId,
    },

    /// Arena slot does not match the stored ID.
    #[error("{what} stored at slot {slot} carries a different ID")]
    SlotMismatch { what: &'static str, slot: usize },
}
