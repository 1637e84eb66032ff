//! Fluid property errors.

use hn_core::CoreError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur during fluid property calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (non-positive temperature, density, ...).
    #[error("Non-physical value for {what}: {value}")]
    NonPhysical { what: &'static str, value: f64 },

    /// Property backend (CoolProp) failure.
    #[error("Backend error: {message}")]
    Backend { message: String },

    /// Invalid model parameter.
    #[error("Invalid argument: {0}")]
    InvalidArg(#[from] CoreError),
}
