//! Error types for network construction and solving.

use hn_components::ComponentError;
use hn_core::units::{MassRate, Pressure};
use hn_core::{CoreError, JunctionId};
use hn_fluids::FluidError;
use hn_graph::TopologyError;
use thiserror::Error;

/// Last iterate of a hydraulic solve that did not converge.
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonDiagnostics {
    pub iterations: usize,
    /// Last update relative to the tolerances (below 1 would have converged)
    pub update_norm: f64,
    /// Junction pressures, indexed by junction slot
    pub pressures: Vec<Pressure>,
    /// Branch mass flows, indexed by branch slot
    pub mass_flows: Vec<MassRate>,
}

/// Errors that can occur while building or solving a network.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(#[from] ComponentError),

    #[error("Junction {0} does not exist")]
    UnknownJunction(JunctionId),

    #[error(
        "Hydraulic solve diverged after {} iterations (update norm {:.3e})",
        .0.iterations,
        .0.update_norm
    )]
    Diverged(Box<NewtonDiagnostics>),

    #[error(
        "Hydraulic solve not converged after {} iterations (update norm {:.3e})",
        .0.iterations,
        .0.update_norm
    )]
    MaxIterReached(Box<NewtonDiagnostics>),

    #[error("Unresolved mixing: flow circulates through junctions {junctions:?} without a fixed temperature")]
    UnresolvedMixing { junctions: Vec<JunctionId> },

    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Branch '{branch}': {source}")]
    Component {
        branch: String,
        #[source]
        source: ComponentError,
    },

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<CoreError> for SolverError {
    fn from(e: CoreError) -> Self {
        SolverError::InvalidParameter(ComponentError::InvalidParameter(e))
    }
}
