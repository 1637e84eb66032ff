//! Network assembly: topology, junction data, branch models and fluid.

use crate::error::{SolverError, SolverResult};
use hn_components::{Branch, CirculationPump, HeatExchanger, Pipe};
use hn_core::numeric::{ensure_finite, ensure_positive};
use hn_core::units::{Length, MassRate, Pressure, Temperature, kgps, m};
use hn_core::{BranchId, JunctionId};
use hn_fluids::{FluidModel, Water};
use hn_graph::{Graph, GraphBuilder};
use std::sync::Arc;

/// Physical data attached to a junction.
#[derive(Debug, Clone, PartialEq)]
pub struct JunctionData {
    /// Starting pressure for the Newton solve
    pub initial_pressure: Pressure,
    /// Temperature used before the thermal sweep, and for junctions nothing flows into
    pub initial_temperature: Temperature,
    pub elevation: Length,
    /// Positive = withdrawn from the network, negative = injected
    pub external_mass_flow: MassRate,
}

/// An immutable, validated network ready to be solved.
#[derive(Debug, Clone)]
pub struct Network {
    graph: Graph,
    junctions: Vec<JunctionData>,
    branches: Vec<Branch>,
    fluid: Arc<dyn FluidModel>,
}

impl Network {
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Junction data, indexed by junction slot.
    pub fn junctions(&self) -> &[JunctionData] {
        &self.junctions
    }

    /// Branch models, indexed by branch slot.
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn junction(&self, id: JunctionId) -> Option<&JunctionData> {
        self.junctions.get(id.slot())
    }

    pub fn branch(&self, id: BranchId) -> Option<&Branch> {
        self.branches.get(id.slot())
    }

    pub fn fluid(&self) -> &dyn FluidModel {
        self.fluid.as_ref()
    }

    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Name of a junction, for messages.
    pub(crate) fn junction_name(&self, slot: usize) -> &str {
        self.graph
            .junctions()
            .get(slot)
            .map_or("<unknown>", |v| v.name.as_str())
    }

    /// Name of a branch, for messages.
    pub(crate) fn branch_name(&self, slot: usize) -> &str {
        self.graph
            .branches()
            .get(slot)
            .map_or("<unknown>", |e| e.name.as_str())
    }
}

/// Builder for constructing a network incrementally.
///
/// Junctions are added first; branches reference them by ID. `build()`
/// validates the junction data and freezes the network.
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    graph: GraphBuilder,
    junctions: Vec<JunctionData>,
    branches: Vec<Branch>,
    fluid: Arc<dyn FluidModel>,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkBuilder {
    /// Empty network carrying liquid water.
    pub fn new() -> Self {
        Self {
            graph: GraphBuilder::new(),
            junctions: Vec::new(),
            branches: Vec::new(),
            fluid: Arc::new(Water::new()),
        }
    }

    /// Replace the fluid model.
    pub fn with_fluid(mut self, fluid: impl FluidModel + 'static) -> Self {
        self.fluid = Arc::new(fluid);
        self
    }

    /// Add a junction at zero elevation without external flow.
    pub fn add_junction(
        &mut self,
        name: impl Into<String>,
        initial_pressure: Pressure,
        initial_temperature: Temperature,
    ) -> JunctionId {
        let id = self.graph.add_junction(name);
        self.junctions.push(JunctionData {
            initial_pressure,
            initial_temperature,
            elevation: m(0.0),
            external_mass_flow: kgps(0.0),
        });
        id
    }

    /// Add a branch `from -> to`. On error the builder is left unmodified.
    pub fn add_branch(
        &mut self,
        name: impl Into<String>,
        from: JunctionId,
        to: JunctionId,
        branch: impl Into<Branch>,
    ) -> SolverResult<BranchId> {
        let id = self.graph.add_branch(name, from, to)?;
        self.branches.push(branch.into());
        Ok(id)
    }

    pub fn add_pipe(
        &mut self,
        name: impl Into<String>,
        from: JunctionId,
        to: JunctionId,
        pipe: Pipe,
    ) -> SolverResult<BranchId> {
        self.add_branch(name, from, to, pipe)
    }

    /// Add a pump driving flow from `from` (return side) to `to` (supply side).
    pub fn add_circulation_pump(
        &mut self,
        name: impl Into<String>,
        from: JunctionId,
        to: JunctionId,
        pump: CirculationPump,
    ) -> SolverResult<BranchId> {
        self.add_branch(name, from, to, pump)
    }

    pub fn add_heat_exchanger(
        &mut self,
        name: impl Into<String>,
        from: JunctionId,
        to: JunctionId,
        heat_exchanger: HeatExchanger,
    ) -> SolverResult<BranchId> {
        self.add_branch(name, from, to, heat_exchanger)
    }

    /// Geodetic height of a junction.
    pub fn set_elevation(&mut self, junction: JunctionId, elevation: Length) -> SolverResult<()> {
        ensure_finite(elevation.value, "junction elevation")?;
        self.junction_mut(junction)?.elevation = elevation;
        Ok(())
    }

    /// Mass flow leaving the network at a junction (negative feeds it).
    ///
    /// Ignored at pump outlets, whose fixed pressure absorbs any imbalance.
    pub fn set_external_mass_flow(
        &mut self,
        junction: JunctionId,
        mass_flow: MassRate,
    ) -> SolverResult<()> {
        ensure_finite(mass_flow.value, "external mass flow")?;
        self.junction_mut(junction)?.external_mass_flow = mass_flow;
        Ok(())
    }

    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Validate and freeze the network.
    pub fn build(self) -> SolverResult<Network> {
        for data in &self.junctions {
            ensure_positive(data.initial_pressure.value, "junction initial pressure")?;
            ensure_positive(data.initial_temperature.value, "junction initial temperature")?;
        }
        let graph = self.graph.build()?;
        Ok(Network {
            graph,
            junctions: self.junctions,
            branches: self.branches,
            fluid: self.fluid,
        })
    }

    fn junction_mut(&mut self, junction: JunctionId) -> SolverResult<&mut JunctionData> {
        self.junctions
            .get_mut(junction.slot())
            .ok_or(SolverError::UnknownJunction(junction))
    }
}

impl From<Network> for NetworkBuilder {
    /// Reopen a network for editing.
    fn from(network: Network) -> Self {
        Self {
            graph: GraphBuilder::from(network.graph),
            junctions: network.junctions,
            branches: network.branches,
            fluid: network.fluid,
        }
    }
}
