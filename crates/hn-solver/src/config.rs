//! Solver configuration.
//!
//! Every section has defaults suited to district-heating networks, so a YAML
//! document only needs the keys it changes:
//!
//! ```yaml
//! hydraulic:
//!   max_iterations: 50
//!   jacobian: finite_difference
//! coupling:
//!   max_coupling_passes: 3
//! ```

use crate::error::{SolverError, SolverResult};
use crate::newton::NewtonSettings;
use serde::{Deserialize, Serialize};

/// How the hydraulic Jacobian is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JacobianMode {
    /// Derivatives supplied by the branch models
    #[default]
    Analytic,
    /// Central differences of the residual
    FiniteDifference,
}

/// Newton solve of the mass and pressure balances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HydraulicConfig {
    pub max_iterations: usize,
    /// Converged when no pressure moves more than this in one update [Pa]
    pub pressure_tol_pa: f64,
    /// Converged when no mass flow moves more than this in one update [kg/s]
    pub mass_flow_tol_kg_s: f64,
    /// Diverged when an update exceeds the first update by this factor
    pub divergence_factor: f64,
    /// Step reduction per backtracking attempt
    pub line_search_beta: f64,
    pub max_line_search_iters: usize,
    /// Starting mass flow for branches without a warm start [kg/s]
    pub initial_mass_flow_kg_s: f64,
    pub jacobian: JacobianMode,
}

impl Default for HydraulicConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            pressure_tol_pa: 1e-2,
            mass_flow_tol_kg_s: 1e-6,
            divergence_factor: 1e6,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
            initial_mass_flow_kg_s: 0.1,
            jacobian: JacobianMode::Analytic,
        }
    }
}

impl HydraulicConfig {
    pub fn newton_settings(&self) -> NewtonSettings {
        NewtonSettings {
            max_iterations: self.max_iterations,
            divergence_factor: self.divergence_factor,
            line_search_beta: self.line_search_beta,
            max_line_search_iters: self.max_line_search_iters,
        }
    }
}

/// Sequential temperature sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThermalConfig {
    /// Branches carrying less than this are treated as stagnant [kg/s]
    pub min_flow_kg_s: f64,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            min_flow_kg_s: 1e-6,
        }
    }
}

/// Repetition of hydraulic and thermal passes with updated fluid properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CouplingConfig {
    /// 1 = a single hydraulic pass followed by a single thermal pass
    pub max_coupling_passes: usize,
    /// Stop once no junction temperature changes more than this between passes [K]
    pub temperature_tol_k: f64,
}

impl Default for CouplingConfig {
    fn default() -> Self {
        Self {
            max_coupling_passes: 1,
            temperature_tol_k: 1e-3,
        }
    }
}

/// Complete solver configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    pub hydraulic: HydraulicConfig,
    pub thermal: ThermalConfig,
    pub coupling: CouplingConfig,
}

impl SolverConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> SolverResult<Self> {
        let config: SolverConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every setting is usable.
    pub fn validate(&self) -> SolverResult<()> {
        let h = &self.hydraulic;
        let positive = [
            ("hydraulic.pressure_tol_pa", h.pressure_tol_pa),
            ("hydraulic.mass_flow_tol_kg_s", h.mass_flow_tol_kg_s),
            ("hydraulic.divergence_factor", h.divergence_factor),
            ("hydraulic.initial_mass_flow_kg_s", h.initial_mass_flow_kg_s),
            ("thermal.min_flow_kg_s", self.thermal.min_flow_kg_s),
            ("coupling.temperature_tol_k", self.coupling.temperature_tol_k),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("{key} must be positive, got {value}")));
            }
        }
        if !(h.line_search_beta > 0.0 && h.line_search_beta < 1.0) {
            return Err(invalid(format!(
                "hydraulic.line_search_beta must lie in (0, 1), got {}",
                h.line_search_beta
            )));
        }
        if h.max_iterations == 0 {
            return Err(invalid("hydraulic.max_iterations must be at least 1".into()));
        }
        if self.coupling.max_coupling_passes == 0 {
            return Err(invalid("coupling.max_coupling_passes must be at least 1".into()));
        }
        Ok(())
    }
}

fn invalid(what: String) -> SolverError {
    SolverError::ProblemSetup { what }
}
