//! Temperature sweep along converged flows.
//!
//! Junction temperatures follow from adiabatic mixing of everything flowing
//! in; branch outlet temperatures from each branch's energy balance. Both are
//! resolved in one pass over the junctions in topological order of the flow
//! direction. Circulation pump outlets have a fixed temperature and break the
//! loop a district-heating network forms.

use crate::config::ThermalConfig;
use crate::error::{SolverError, SolverResult};
use crate::network::Network;
use hn_components::{BranchModel, ComponentError, SegmentProfile, mix_temperatures};
use hn_core::JunctionId;
use hn_core::numeric::{Tolerances, nearly_equal};
use hn_core::units::{MassRate, Power, Temperature, k, kgps, w};
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, info};

/// Thermal state of one branch.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchThermal {
    /// Temperature entering the branch along the flow
    pub inlet: Temperature,
    /// Temperature leaving the branch along the flow
    pub outlet: Temperature,
    pub heat_to_fluid: Power,
    /// Segment temperatures ordered from the branch's `from` to its `to` junction
    pub profile: Option<SegmentProfile>,
    /// Flow runs to -> from
    pub reversed: bool,
    /// Flow below the stagnation threshold; temperatures are interpolated
    pub stagnant: bool,
}

impl BranchThermal {
    /// Temperatures at the `from` and `to` ends.
    pub fn end_temperatures(&self) -> (Temperature, Temperature) {
        if self.reversed {
            (self.outlet, self.inlet)
        } else {
            (self.inlet, self.outlet)
        }
    }

    /// Mean of inlet and outlet, used to re-evaluate fluid properties.
    pub fn mean_temperature(&self) -> Temperature {
        k(0.5 * (self.inlet.value + self.outlet.value))
    }
}

/// Temperatures of every junction and branch.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalSolution {
    /// Indexed by junction slot
    pub junction_temperatures: Vec<Temperature>,
    /// Indexed by branch slot
    pub branches: Vec<BranchThermal>,
}

/// Temperature held at each junction by circulation pump outlets.
pub(crate) fn temperature_references(network: &Network) -> SolverResult<Vec<Option<Temperature>>> {
    let mut fixed: Vec<Option<Temperature>> = vec![None; network.junction_count()];
    for (edge, branch) in network.graph().branches().iter().zip(network.branches()) {
        let Some(bc) = branch.model().boundary() else {
            continue;
        };
        let slot = edge.to.slot();
        match fixed[slot] {
            Some(t)
                if !nearly_equal(t.value, bc.outlet_temperature.value, Tolerances::default()) =>
            {
                return Err(SolverError::ProblemSetup {
                    what: format!(
                        "junction '{}' is supplied at both {:.2} K and {:.2} K",
                        network.junction_name(slot),
                        t.value,
                        bc.outlet_temperature.value
                    ),
                });
            }
            _ => fixed[slot] = Some(bc.outlet_temperature),
        }
    }
    Ok(fixed)
}

/// Propagate temperatures through the network for the given branch flows.
///
/// # Errors
/// `UnresolvedMixing` when flow circulates through junctions none of which
/// has a fixed temperature.
pub fn solve_thermal(
    network: &Network,
    mass_flows: &[MassRate],
    config: &ThermalConfig,
) -> SolverResult<ThermalSolution> {
    if mass_flows.len() != network.branch_count() {
        return Err(SolverError::ProblemSetup {
            what: format!(
                "{} mass flows given for {} branches",
                mass_flows.len(),
                network.branch_count()
            ),
        });
    }

    let graph = network.graph();
    let junctions = network.junctions();
    let fluid = network.fluid();
    let fixed = temperature_references(network)?;

    // Directed flow graph over junctions. Edges into fixed-temperature
    // junctions carry no dependency and are left out.
    let mut flow_graph: DiGraph<(), usize> = DiGraph::with_capacity(junctions.len(), mass_flows.len());
    for _ in junctions {
        flow_graph.add_node(());
    }
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); junctions.len()];
    for (b, (edge, branch)) in graph.branches().iter().zip(network.branches()).enumerate() {
        let mdot = mass_flows[b].value;
        if branch.model().boundary().is_some() || mdot.abs() <= config.min_flow_kg_s {
            continue;
        }
        let (up, down) = if mdot > 0.0 {
            (edge.from.slot(), edge.to.slot())
        } else {
            (edge.to.slot(), edge.from.slot())
        };
        outgoing[up].push(b);
        if fixed[down].is_none() {
            flow_graph.add_edge(NodeIndex::new(up), NodeIndex::new(down), b);
        }
    }

    let order = toposort(&flow_graph, None).map_err(|_| unresolved_mixing(&flow_graph))?;

    let mut temperatures: Vec<Temperature> =
        junctions.iter().map(|j| j.initial_temperature).collect();
    let mut inflows: Vec<Vec<(MassRate, Temperature)>> = vec![Vec::new(); junctions.len()];
    let mut branch_states: Vec<Option<BranchThermal>> = vec![None; mass_flows.len()];

    for node in order {
        let j = node.index();
        let data = &junctions[j];
        temperatures[j] = match fixed[j] {
            Some(t) => t,
            None => {
                let mut streams = std::mem::take(&mut inflows[j]);
                if data.external_mass_flow.value < 0.0 {
                    streams.push((-data.external_mass_flow, data.initial_temperature));
                }
                mix_temperatures(&streams).unwrap_or(data.initial_temperature)
            }
        };

        for &b in &outgoing[j] {
            let mdot = mass_flows[b].value;
            let reversed = mdot < 0.0;
            let balance = network.branches()[b]
                .model()
                .energy_balance(temperatures[j], kgps(mdot.abs()), fluid)
                .map_err(|e| component_error(network, b, e))?;

            let edge = &graph.branches()[b];
            let down = if reversed { edge.from.slot() } else { edge.to.slot() };
            inflows[down].push((kgps(mdot.abs()), balance.outlet));

            let profile = balance.profile.map(|p| if reversed { reverse(p) } else { p });
            branch_states[b] = Some(BranchThermal {
                inlet: temperatures[j],
                outlet: balance.outlet,
                heat_to_fluid: balance.heat_to_fluid,
                profile,
                reversed,
                stagnant: false,
            });
        }
    }

    // Pumps and stagnant branches depend only on junction temperatures.
    let mut branches = Vec::with_capacity(mass_flows.len());
    for (b, (edge, branch)) in graph.branches().iter().zip(network.branches()).enumerate() {
        if let Some(state) = branch_states[b].take() {
            branches.push(state);
            continue;
        }
        let model = branch.model();
        let t_from = temperatures[edge.from.slot()];
        let t_to = temperatures[edge.to.slot()];
        let state = match model.boundary() {
            Some(bc) => {
                let balance = model
                    .energy_balance(t_from, bc.mass_flow, fluid)
                    .map_err(|e| component_error(network, b, e))?;
                BranchThermal {
                    inlet: t_from,
                    outlet: balance.outlet,
                    heat_to_fluid: balance.heat_to_fluid,
                    profile: None,
                    reversed: false,
                    stagnant: false,
                }
            }
            None => {
                debug!(branch = network.branch_name(b), "stagnant branch");
                BranchThermal {
                    inlet: t_from,
                    outlet: t_to,
                    heat_to_fluid: w(0.0),
                    profile: model.length().map(|_| interpolated_profile(model, t_from, t_to)),
                    reversed: false,
                    stagnant: true,
                }
            }
        };
        branches.push(state);
    }

    info!(
        junctions = temperatures.len(),
        branches = branches.len(),
        "thermal sweep complete"
    );
    Ok(ThermalSolution {
        junction_temperatures: temperatures,
        branches,
    })
}

/// Collect the junctions on flow cycles for the error report.
fn unresolved_mixing(flow_graph: &DiGraph<(), usize>) -> SolverError {
    let mut junctions: Vec<JunctionId> = tarjan_scc(flow_graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .flatten()
        .map(|n| JunctionId::from_index(n.index() as u32))
        .collect();
    junctions.sort();
    SolverError::UnresolvedMixing { junctions }
}

fn component_error(network: &Network, branch: usize, source: ComponentError) -> SolverError {
    SolverError::Component {
        branch: network.branch_name(branch).to_string(),
        source,
    }
}

/// Flip a flow-ordered profile into from -> to order.
fn reverse(mut profile: SegmentProfile) -> SegmentProfile {
    profile.boundaries.reverse();
    profile.midpoints.reverse();
    profile.heat_losses.reverse();
    profile
}

/// Linear temperature profile without heat exchange for a stagnant branch.
fn interpolated_profile(model: &dyn BranchModel, t_from: Temperature, t_to: Temperature) -> SegmentProfile {
    let n = model.segments();
    let at = |frac: f64| k(t_from.value + frac * (t_to.value - t_from.value));
    SegmentProfile {
        boundaries: (0..=n).map(|i| at(i as f64 / n as f64)).collect(),
        midpoints: (0..n).map(|i| at((i as f64 + 0.5) / n as f64)).collect(),
        heat_losses: vec![w(0.0); n],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkBuilder;
    use hn_components::{CirculationPump, HeatExchanger, Pipe};
    use hn_core::units::{bar, km, m, mm};
    use hn_fluids::ConstantProperties;

    fn pipe() -> Pipe {
        Pipe::new(km(0.5), m(0.1), mm(0.1)).unwrap()
    }

    /// Two sources at different temperatures feed a common junction.
    #[test]
    fn junction_mixes_incoming_streams() {
        let mut b = NetworkBuilder::new().with_fluid(ConstantProperties::water_like());
        let hot = b.add_junction("hot", bar(3.0), k(320.0));
        let cold = b.add_junction("cold", bar(3.0), k(300.0));
        let mix = b.add_junction("mix", bar(3.0), k(290.0));
        b.add_pipe("a", hot, mix, pipe()).unwrap();
        b.add_pipe("b", cold, mix, pipe()).unwrap();
        let network = b.build().unwrap();

        let sol = solve_thermal(&network, &[kgps(10.0), kgps(10.0)], &ThermalConfig::default()).unwrap();
        assert_eq!(sol.junction_temperatures[hot.slot()], k(320.0));
        assert!((sol.junction_temperatures[mix.slot()].value - 310.0).abs() < 1e-9);
    }

    #[test]
    fn reversed_flow_runs_to_from() {
        let mut b = NetworkBuilder::new().with_fluid(ConstantProperties::water_like());
        let a = b.add_junction("a", bar(3.0), k(300.0));
        let c = b.add_junction("c", bar(3.0), k(340.0));
        let lossy = pipe().with_heat_loss(5.0, k(280.0)).unwrap().with_segments(4).unwrap();
        b.add_pipe("p", a, c, lossy).unwrap();
        let network = b.build().unwrap();

        let sol = solve_thermal(&network, &[kgps(-2.0)], &ThermalConfig::default()).unwrap();
        let state = &sol.branches[0];
        assert!(state.reversed);
        assert_eq!(state.inlet, k(340.0));
        // `a` receives the cooled stream.
        assert_eq!(sol.junction_temperatures[a.slot()], state.outlet);
        let (t_from, t_to) = state.end_temperatures();
        assert!(t_from < t_to);

        let profile = state.profile.as_ref().unwrap();
        assert_eq!(profile.boundaries.first(), Some(&t_from));
        assert_eq!(profile.boundaries.last(), Some(&t_to));
        for pair in profile.midpoints.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn injection_mixes_at_reference_temperature() {
        let mut b = NetworkBuilder::new().with_fluid(ConstantProperties::water_like());
        let src = b.add_junction("src", bar(3.0), k(350.0));
        let feed = b.add_junction("feed", bar(3.0), k(330.0));
        let out = b.add_junction("out", bar(3.0), k(330.0));
        b.set_external_mass_flow(feed, kgps(-1.0)).unwrap();
        b.add_pipe("p", src, feed, pipe()).unwrap();
        b.add_pipe("q", feed, out, pipe()).unwrap();
        let network = b.build().unwrap();

        let sol = solve_thermal(&network, &[kgps(3.0), kgps(4.0)], &ThermalConfig::default()).unwrap();
        let expected = (3.0 * 350.0 + 1.0 * 330.0) / 4.0;
        assert!((sol.junction_temperatures[feed.slot()].value - expected).abs() < 1e-9);
    }

    #[test]
    fn loop_without_fixed_temperature_is_unresolved() {
        let mut b = NetworkBuilder::new();
        let j: Vec<_> = (0..3)
            .map(|i| b.add_junction(format!("j{i}"), bar(3.0), k(330.0)))
            .collect();
        let tail = b.add_junction("tail", bar(3.0), k(330.0));
        b.add_pipe("p0", j[0], j[1], pipe()).unwrap();
        b.add_pipe("p1", j[1], j[2], pipe()).unwrap();
        b.add_pipe("p2", j[2], j[0], pipe()).unwrap();
        b.add_pipe("p3", j[2], tail, pipe()).unwrap();
        let network = b.build().unwrap();

        let flows = [kgps(1.0), kgps(1.0), kgps(1.0), kgps(0.5)];
        let err = solve_thermal(&network, &flows, &ThermalConfig::default()).unwrap_err();
        match err {
            SolverError::UnresolvedMixing { junctions } => assert_eq!(junctions, j),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn pump_outlet_breaks_the_loop() {
        let mut b = NetworkBuilder::new().with_fluid(ConstantProperties::water_like());
        let supply = b.add_junction("supply", bar(5.0), k(300.0));
        let mid = b.add_junction("mid", bar(5.0), k(300.0));
        let ret = b.add_junction("return", bar(5.0), k(300.0));
        b.add_circulation_pump("pump", ret, supply, CirculationPump::new(kgps(5.0), bar(5.0), k(350.0)).unwrap())
            .unwrap();
        b.add_pipe("flow", supply, mid, pipe()).unwrap();
        b.add_heat_exchanger("hx", mid, ret, HeatExchanger::new(w(4180.0 * 5.0 * 10.0), m(0.1)).unwrap())
            .unwrap();
        let network = b.build().unwrap();

        let sol = solve_thermal(&network, &[kgps(5.0); 3], &ThermalConfig::default()).unwrap();
        assert_eq!(sol.junction_temperatures[supply.slot()], k(350.0));
        assert!((sol.junction_temperatures[mid.slot()].value - 350.0).abs() < 1e-9);
        assert!((sol.junction_temperatures[ret.slot()].value - 340.0).abs() < 1e-9);

        let pump = &sol.branches[0];
        assert!((pump.heat_to_fluid.value - 5.0 * 4180.0 * 10.0).abs() < 1e-6);
    }

    #[test]
    fn stagnant_branch_is_interpolated() {
        let mut b = NetworkBuilder::new().with_fluid(ConstantProperties::water_like());
        let a = b.add_junction("a", bar(3.0), k(300.0));
        let c = b.add_junction("c", bar(3.0), k(340.0));
        b.add_pipe("idle", a, c, pipe().with_segments(4).unwrap()).unwrap();
        let network = b.build().unwrap();

        let sol = solve_thermal(&network, &[kgps(0.0)], &ThermalConfig::default()).unwrap();
        let state = &sol.branches[0];
        assert!(state.stagnant);
        assert_eq!(state.heat_to_fluid, w(0.0));
        let profile = state.profile.as_ref().unwrap();
        assert_eq!(profile.midpoints.len(), 4);
        assert!((profile.midpoints[0].value - 305.0).abs() < 1e-9);
        assert!((profile.midpoints[3].value - 335.0).abs() < 1e-9);
    }
}
