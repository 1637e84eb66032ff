//! Error types for component operations.

use hn_core::CoreError;
use hn_fluids::FluidError;
use thiserror::Error;

/// Errors that can occur when building or evaluating a branch model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    /// A construction parameter is non-physical (zero diameter, negative length, ...).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(#[from] CoreError),

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    #[error("Fluid model error: {0}")]
    Fluid(#[from] FluidError),
}

pub type ComponentResult<T> = Result<T, ComponentError>;
