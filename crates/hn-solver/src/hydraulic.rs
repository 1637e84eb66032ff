//! Mass and pressure balances solved by Newton's method.
//!
//! Unknowns, in order:
//! - pressure of every junction not held by a circulation pump outlet
//! - mass flow of every branch (positive from -> to)
//!
//! Equations, in the same order:
//! - mass balance per free junction: `sum(in) - sum(out) - external = 0`
//! - one law per branch:
//!   - loss elements: `p_from - p_to - dp(mdot) + rho * g * (z_from - z_to) = 0`
//!   - circulation pumps: `mdot - mdot_set = 0`
//!
//! Junctions held by a pump act as pressure references and carry no mass
//! balance; every connected part of the network needs at least one.

use crate::config::{HydraulicConfig, JacobianMode};
use crate::error::{NewtonDiagnostics, SolverError, SolverResult};
use crate::jacobian::{TripletMatrix, central_difference_jacobian};
use crate::network::Network;
use crate::newton::{Newton, NewtonState, NewtonSystem};
use hn_components::ComponentError;
use hn_core::numeric::{Tolerances, nearly_equal};
use hn_core::units::{MassRate, Pressure, Temperature, constants::G0_MPS2, kgps, pa};
use hn_fluids::PropertyPack;
use nalgebra::{DMatrix, DVector};
use tracing::{debug, info};

/// Relative step for the finite-difference Jacobian.
const FD_EPSILON: f64 = 1e-7;

/// Where a junction pressure comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PressureSlot {
    /// Index into the unknown vector (and the junction's mass-balance row)
    Unknown(usize),
    /// Held by a circulation pump outlet [Pa]
    Pinned(f64),
}

/// Converged hydraulic state.
#[derive(Debug, Clone)]
pub struct HydraulicSolution {
    /// Junction pressures, indexed by junction slot
    pub pressures: Vec<Pressure>,
    /// Branch mass flows, indexed by branch slot
    pub mass_flows: Vec<MassRate>,
    /// Fluid properties each branch was evaluated with
    pub branch_properties: Vec<PropertyPack>,
    pub iterations: usize,
    pub update_norm: f64,
}

/// The hydraulic equations of a network at fixed branch temperatures.
pub struct HydraulicSystem<'a> {
    network: &'a Network,
    slots: Vec<PressureSlot>,
    n_pressure: usize,
    props: Vec<PropertyPack>,
    pressure_tol: f64,
    mass_flow_tol: f64,
    jacobian_mode: JacobianMode,
}

impl<'a> HydraulicSystem<'a> {
    /// Set up the equations with fluid properties evaluated at `branch_temperatures`.
    ///
    /// # Errors
    /// `ProblemSetup` when a connected part has no pressure reference or two
    /// pumps hold the same junction at different pressures.
    pub fn new(
        network: &'a Network,
        branch_temperatures: &[Temperature],
        config: &HydraulicConfig,
    ) -> SolverResult<Self> {
        if branch_temperatures.len() != network.branch_count() {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "{} branch temperatures given for {} branches",
                    branch_temperatures.len(),
                    network.branch_count()
                ),
            });
        }

        let pinned = pressure_references(network)?;
        let mut n_pressure = 0;
        let slots = pinned
            .iter()
            .map(|p| match p {
                Some(p) => PressureSlot::Pinned(p.value),
                None => {
                    n_pressure += 1;
                    PressureSlot::Unknown(n_pressure - 1)
                }
            })
            .collect();

        let fluid = network.fluid();
        let props = branch_temperatures
            .iter()
            .map(|&t| fluid.properties(t))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            network,
            slots,
            n_pressure,
            props,
            pressure_tol: config.pressure_tol_pa,
            mass_flow_tol: config.mass_flow_tol_kg_s,
            jacobian_mode: config.jacobian,
        })
    }

    /// Number of unknowns (and equations).
    pub fn dimension(&self) -> usize {
        self.n_pressure + self.network.branch_count()
    }

    /// Number of junction pressures among the unknowns.
    pub fn pressure_unknowns(&self) -> usize {
        self.n_pressure
    }

    /// Starting point: junction initial pressures and a uniform small flow,
    /// pumps at their set flow. A previous solution takes precedence.
    pub fn initial_guess(
        &self,
        initial_mass_flow: f64,
        warm_start: Option<&HydraulicSolution>,
    ) -> DVector<f64> {
        let mut x = DVector::zeros(self.dimension());
        for (j, slot) in self.slots.iter().enumerate() {
            if let PressureSlot::Unknown(i) = *slot {
                x[i] = match warm_start {
                    Some(prev) => prev.pressures[j].value,
                    None => self.network.junctions()[j].initial_pressure.value,
                };
            }
        }
        for (b, branch) in self.network.branches().iter().enumerate() {
            x[self.n_pressure + b] = match (branch.model().boundary(), warm_start) {
                (Some(bc), _) => bc.mass_flow.value,
                (None, Some(prev)) => prev.mass_flows[b].value,
                (None, None) => initial_mass_flow,
            };
        }
        x
    }

    /// Split an iterate into junction pressures and branch flows.
    pub fn unpack(&self, x: &DVector<f64>) -> (Vec<Pressure>, Vec<MassRate>) {
        let pressures = (0..self.slots.len())
            .map(|j| pa(self.pressure(x, j)))
            .collect();
        let flows = (0..self.network.branch_count())
            .map(|b| kgps(x[self.n_pressure + b]))
            .collect();
        (pressures, flows)
    }

    /// Fluid properties used for each branch.
    pub fn branch_properties(&self) -> &[PropertyPack] {
        &self.props
    }

    fn pressure(&self, x: &DVector<f64>, junction: usize) -> f64 {
        match self.slots[junction] {
            PressureSlot::Unknown(i) => x[i],
            PressureSlot::Pinned(p) => p,
        }
    }

    fn component_error(&self, branch: usize, source: ComponentError) -> SolverError {
        SolverError::Component {
            branch: self.network.branch_name(branch).to_string(),
            source,
        }
    }

    /// Jacobian assembled from the branch models' analytic derivatives.
    pub fn analytic_jacobian(&self, x: &DVector<f64>) -> SolverResult<DMatrix<f64>> {
        let n = self.dimension();
        let graph = self.network.graph();
        let mut t = TripletMatrix::new(n, n);

        for (j, vertex) in graph.junctions().iter().enumerate() {
            if let PressureSlot::Unknown(row) = self.slots[j] {
                for inc in graph.incident(vertex.id) {
                    t.push(row, self.n_pressure + inc.branch.slot(), inc.direction.sign());
                }
            }
        }

        for (b, (edge, branch)) in graph
            .branches()
            .iter()
            .zip(self.network.branches())
            .enumerate()
        {
            let row = self.n_pressure + b;
            let col_m = self.n_pressure + b;
            let model = branch.model();
            if model.boundary().is_some() {
                t.push(row, col_m, 1.0);
                continue;
            }
            if let PressureSlot::Unknown(col) = self.slots[edge.from.slot()] {
                t.push(row, col, 1.0);
            }
            if let PressureSlot::Unknown(col) = self.slots[edge.to.slot()] {
                t.push(row, col, -1.0);
            }
            let loss = model
                .pressure_loss(kgps(x[col_m]), &self.props[b])
                .map_err(|e| self.component_error(b, e))?;
            t.push(row, col_m, -loss.ddp_dmdot);
        }

        Ok(t.to_dense())
    }

    /// Jacobian by central differences of the residual.
    pub fn finite_difference_jacobian(&self, x: &DVector<f64>) -> SolverResult<DMatrix<f64>> {
        central_difference_jacobian(x, |x| self.residual(x), FD_EPSILON)
    }
}

impl NewtonSystem for HydraulicSystem<'_> {
    fn residual(&self, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        let graph = self.network.graph();
        let junctions = self.network.junctions();
        let mut r = DVector::zeros(self.dimension());

        for (j, vertex) in graph.junctions().iter().enumerate() {
            if let PressureSlot::Unknown(row) = self.slots[j] {
                let net_inflow: f64 = graph
                    .incident(vertex.id)
                    .iter()
                    .map(|inc| inc.direction.sign() * x[self.n_pressure + inc.branch.slot()])
                    .sum();
                r[row] = net_inflow - junctions[j].external_mass_flow.value;
            }
        }

        for (b, (edge, branch)) in graph
            .branches()
            .iter()
            .zip(self.network.branches())
            .enumerate()
        {
            let mdot = x[self.n_pressure + b];
            let model = branch.model();
            r[self.n_pressure + b] = match model.boundary() {
                Some(bc) => mdot - bc.mass_flow.value,
                None => {
                    let (from, to) = (edge.from.slot(), edge.to.slot());
                    let loss = model
                        .pressure_loss(kgps(mdot), &self.props[b])
                        .map_err(|e| self.component_error(b, e))?;
                    let dz = junctions[from].elevation.value - junctions[to].elevation.value;
                    self.pressure(x, from) - self.pressure(x, to) - loss.dp.value
                        + self.props[b].rho.value * G0_MPS2 * dz
                }
            };
        }

        Ok(r)
    }

    fn jacobian(&self, x: &DVector<f64>) -> SolverResult<DMatrix<f64>> {
        match self.jacobian_mode {
            JacobianMode::Analytic => self.analytic_jacobian(x),
            JacobianMode::FiniteDifference => self.finite_difference_jacobian(x),
        }
    }

    /// Euclidean norm of the residual scaled by the tolerances.
    fn merit(&self, residual: &DVector<f64>) -> f64 {
        residual
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let scale = if i < self.n_pressure {
                    self.mass_flow_tol
                } else {
                    self.pressure_tol
                };
                (r / scale).powi(2)
            })
            .sum::<f64>()
            .sqrt()
    }

    /// Largest pressure or flow change relative to its tolerance.
    fn update_norm(&self, dx: &DVector<f64>) -> f64 {
        dx.iter()
            .enumerate()
            .map(|(i, d)| {
                let tol = if i < self.n_pressure {
                    self.pressure_tol
                } else {
                    self.mass_flow_tol
                };
                d.abs() / tol
            })
            .fold(0.0, f64::max)
    }
}

/// Pressure held at each junction by circulation pump outlets.
///
/// # Errors
/// `ProblemSetup` for conflicting references or a connected part without one.
pub(crate) fn pressure_references(network: &Network) -> SolverResult<Vec<Option<Pressure>>> {
    let graph = network.graph();
    let mut pinned: Vec<Option<Pressure>> = vec![None; network.junction_count()];

    for (edge, branch) in graph.branches().iter().zip(network.branches()) {
        let Some(bc) = branch.model().boundary() else {
            continue;
        };
        let slot = edge.to.slot();
        match pinned[slot] {
            Some(p) if !nearly_equal(p.value, bc.outlet_pressure.value, Tolerances::default()) => {
                return Err(SolverError::ProblemSetup {
                    what: format!(
                        "junction '{}' is held at both {:.1} Pa and {:.1} Pa",
                        network.junction_name(slot),
                        p.value,
                        bc.outlet_pressure.value
                    ),
                });
            }
            _ => pinned[slot] = Some(bc.outlet_pressure),
        }
    }

    let (labels, count) = graph.connected_components();
    let mut referenced = vec![false; count];
    for (slot, p) in pinned.iter().enumerate() {
        if p.is_some() {
            referenced[labels[slot]] = true;
        }
    }
    if let Some(slot) = (0..pinned.len()).find(|&s| !referenced[labels[s]]) {
        return Err(SolverError::ProblemSetup {
            what: format!(
                "junction '{}' is not connected to any circulation pump outlet (no pressure reference)",
                network.junction_name(slot)
            ),
        });
    }

    Ok(pinned)
}

/// Solve the hydraulic equations with properties at `branch_temperatures`.
///
/// # Errors
/// `Diverged` or `MaxIterReached` carry the last iterate.
pub fn solve_hydraulics(
    network: &Network,
    branch_temperatures: &[Temperature],
    config: &HydraulicConfig,
    warm_start: Option<&HydraulicSolution>,
) -> SolverResult<HydraulicSolution> {
    let system = HydraulicSystem::new(network, branch_temperatures, config)?;
    let x0 = system.initial_guess(config.initial_mass_flow_kg_s, warm_start);
    debug!(
        unknowns = system.dimension(),
        pressure_unknowns = system.pressure_unknowns(),
        "starting hydraulic solve"
    );

    let outcome = Newton::new(&system, x0, config.newton_settings()).run()?;
    let (pressures, mass_flows) = system.unpack(&outcome.x);

    if outcome.state == NewtonState::Converged {
        info!(
            iterations = outcome.iterations,
            update_norm = outcome.update_norm,
            "hydraulic solve converged"
        );
        return Ok(HydraulicSolution {
            pressures,
            mass_flows,
            branch_properties: system.props,
            iterations: outcome.iterations,
            update_norm: outcome.update_norm,
        });
    }

    let diagnostics = Box::new(NewtonDiagnostics {
        iterations: outcome.iterations,
        update_norm: outcome.update_norm,
        pressures,
        mass_flows,
    });
    match outcome.state {
        NewtonState::Diverged => Err(SolverError::Diverged(diagnostics)),
        _ => Err(SolverError::MaxIterReached(diagnostics)),
    }
}
