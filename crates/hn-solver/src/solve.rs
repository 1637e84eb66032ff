//! High-level solver interface.

use crate::config::SolverConfig;
use crate::error::{SolverError, SolverResult};
use crate::hydraulic::{HydraulicSolution, solve_hydraulics};
use crate::network::Network;
use crate::results::{SolveDiagnostics, SolveResult, aggregate};
use crate::thermal::{BranchThermal, ThermalSolution, solve_thermal, temperature_references};
use hn_core::numeric::max_abs;
use hn_core::units::{Temperature, k};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Which phases a solve runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveMode {
    /// Pressures and flows only; junction temperatures stay at their
    /// initial values (pump outlets at supply temperature).
    HydraulicOnly,
    /// Pressures and flows, then temperatures along the converged flows.
    HydraulicAndThermal,
}

/// Solve a network with the default configuration.
pub fn solve(network: &Network, mode: SolveMode) -> SolverResult<SolveResult> {
    solve_with_config(network, mode, &SolverConfig::default())
}

/// Solve a network.
///
/// This function:
/// 1. Evaluates fluid properties per branch at the mean of its end junctions'
///    initial temperatures
/// 2. Solves the hydraulic equations by Newton's method
/// 3. Sweeps temperatures along the converged flows (unless hydraulic only)
/// 4. With `coupling.max_coupling_passes > 1`, re-evaluates properties at
///    the branch mean temperatures and repeats 2-3, warm-started, until no
///    junction temperature moves more than `coupling.temperature_tol_k`
///
/// Nothing is returned unless every phase succeeds.
pub fn solve_with_config(
    network: &Network,
    mode: SolveMode,
    config: &SolverConfig,
) -> SolverResult<SolveResult> {
    config.validate()?;
    if network.junction_count() == 0 {
        return Err(SolverError::ProblemSetup {
            what: "network has no junctions".into(),
        });
    }

    let mut branch_temperatures = initial_branch_temperatures(network);
    let mut warm_start: Option<HydraulicSolution> = None;
    let mut previous: Option<ThermalSolution> = None;
    let mut pass = 0;

    let (hydraulic, thermal) = loop {
        pass += 1;
        let hydraulic = solve_hydraulics(
            network,
            &branch_temperatures,
            &config.hydraulic,
            warm_start.as_ref(),
        )?;
        if mode == SolveMode::HydraulicOnly {
            break (hydraulic, None);
        }

        let thermal = solve_thermal(network, &hydraulic.mass_flows, &config.thermal)?;
        let change = previous
            .as_ref()
            .map(|prev| max_temperature_change(prev, &thermal));
        debug!(pass, change = ?change, "coupling pass");

        if change.is_some_and(|c| c < config.coupling.temperature_tol_k) {
            break (hydraulic, Some(thermal));
        }
        if pass >= config.coupling.max_coupling_passes {
            if pass > 1 {
                warn!(
                    passes = pass,
                    change = ?change,
                    tolerance = config.coupling.temperature_tol_k,
                    "property coupling not settled; returning the last pass"
                );
            }
            break (hydraulic, Some(thermal));
        }

        branch_temperatures = thermal
            .branches
            .iter()
            .map(BranchThermal::mean_temperature)
            .collect();
        warm_start = Some(hydraulic);
        previous = Some(thermal);
    };

    let junction_temperatures = match &thermal {
        Some(th) => th.junction_temperatures.clone(),
        None => temperature_references(network)?
            .into_iter()
            .zip(network.junctions())
            .map(|(fixed, data)| fixed.unwrap_or(data.initial_temperature))
            .collect(),
    };

    let diagnostics = SolveDiagnostics {
        mode,
        iterations: hydraulic.iterations,
        update_norm: hydraulic.update_norm,
        coupling_passes: pass,
    };
    let result = aggregate(
        network,
        &hydraulic,
        &junction_temperatures,
        thermal.as_ref(),
        diagnostics,
    )?;
    info!(
        ?mode,
        junctions = network.junction_count(),
        branches = network.branch_count(),
        passes = pass,
        "solve complete"
    );
    Ok(result)
}

/// Mean of the initial temperatures at each branch's two ends.
fn initial_branch_temperatures(network: &Network) -> Vec<Temperature> {
    let junctions = network.junctions();
    network
        .graph()
        .branches()
        .iter()
        .map(|e| {
            let t_from = junctions[e.from.slot()].initial_temperature.value;
            let t_to = junctions[e.to.slot()].initial_temperature.value;
            k(0.5 * (t_from + t_to))
        })
        .collect()
}

fn max_temperature_change(previous: &ThermalSolution, current: &ThermalSolution) -> f64 {
    max_abs(
        previous
            .junction_temperatures
            .iter()
            .zip(&current.junction_temperatures)
            .map(|(a, b)| a.value - b.value),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temperatures(values: &[f64]) -> ThermalSolution {
        ThermalSolution {
            junction_temperatures: values.iter().map(|&t| k(t)).collect(),
            branches: Vec::new(),
        }
    }

    #[test]
    fn temperature_change_is_largest_absolute_difference() {
        let before = temperatures(&[300.0, 320.0, 310.0]);
        let after = temperatures(&[300.5, 317.0, 311.0]);
        assert!((max_temperature_change(&before, &after) - 3.0).abs() < 1e-9);
        assert_eq!(max_temperature_change(&before, &before), 0.0);
    }
}
