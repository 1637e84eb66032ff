//! Steady-state thermal-hydraulic solver for district-heating networks.
//!
//! A [`Network`] is assembled with a [`NetworkBuilder`] and frozen. [`solve`]
//! then runs a Newton solve of the mass and pressure balances (unknowns are
//! the junction pressures not held by a circulation pump and every branch
//! mass flow), followed by a sequential thermal sweep along the converged
//! flows. The outcome is an immutable [`SolveResult`].
//!
//! # Example
//!
//! ```
//! use hn_components::{CirculationPump, HeatExchanger, Pipe};
//! use hn_core::units::{bar, k, kgps, km, m, mm, w};
//! use hn_solver::{NetworkBuilder, SolveMode, solve};
//!
//! let mut net = NetworkBuilder::new();
//! let supply = net.add_junction("supply", bar(5.0), k(308.15));
//! let consumer_in = net.add_junction("consumer in", bar(5.0), k(308.15));
//! let consumer_out = net.add_junction("consumer out", bar(5.0), k(308.15));
//! let ret = net.add_junction("return", bar(5.0), k(308.15));
//!
//! let pipe = Pipe::new(km(1.0), m(0.2), mm(0.1))?
//!     .with_heat_loss(10.0, k(273.15))?
//!     .with_segments(5)?;
//! net.add_circulation_pump("pump", ret, supply, CirculationPump::new(kgps(20.0), bar(5.0), k(308.15))?)?;
//! net.add_pipe("flow", supply, consumer_in, pipe.clone())?;
//! net.add_heat_exchanger("consumer", consumer_in, consumer_out, HeatExchanger::new(w(1.0e5), m(0.2))?)?;
//! net.add_pipe("return", consumer_out, ret, pipe)?;
//! let network = net.build()?;
//!
//! let result = solve(&network, SolveMode::HydraulicAndThermal)?;
//! assert!(result.junction(ret).unwrap().t_k < 308.15);
//! # Ok::<(), hn_solver::SolverError>(())
//! ```

pub mod config;
pub mod error;
pub mod hydraulic;
pub mod jacobian;
pub mod network;
pub mod newton;
pub mod results;
pub mod solve;
pub mod thermal;

pub use config::{CouplingConfig, HydraulicConfig, JacobianMode, SolverConfig, ThermalConfig};
pub use error::{NewtonDiagnostics, SolverError, SolverResult};
pub use hydraulic::{HydraulicSolution, HydraulicSystem, solve_hydraulics};
pub use network::{JunctionData, Network, NetworkBuilder};
pub use newton::{Newton, NewtonOutcome, NewtonSettings, NewtonState, NewtonSystem};
pub use results::{BranchResult, JunctionResult, SegmentResult, SolveDiagnostics, SolveResult};
pub use solve::{SolveMode, solve, solve_with_config};
pub use thermal::{BranchThermal, ThermalSolution, solve_thermal};
