//! Result records of a solve.
//!
//! Records carry plain `f64` fields with the unit in the field name so that
//! reporting layers can serialize them directly.

use crate::error::SolverResult;
use crate::hydraulic::HydraulicSolution;
use crate::network::Network;
use crate::solve::SolveMode;
use crate::thermal::ThermalSolution;
use hn_components::{BranchKind, BranchModel, SegmentProfile};
use hn_core::units::{Temperature, circle_area, k};
use hn_core::{BranchId, JunctionId};
use hn_fluids::FluidModel;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JunctionResult {
    pub id: JunctionId,
    pub name: String,
    pub p_pa: f64,
    pub t_k: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchResult {
    pub id: BranchId,
    pub name: String,
    pub kind: BranchKind,
    /// Positive from -> to
    pub mdot_kg_s: f64,
    /// Mean velocity, signed like the flow; None without a flow cross-section
    pub v_mean_m_s: Option<f64>,
    pub p_from_pa: f64,
    pub p_to_pa: f64,
    pub t_from_k: f64,
    pub t_to_k: f64,
    pub reynolds: Option<f64>,
    pub friction_factor: Option<f64>,
    /// Heat gained by the fluid; negative for heat loss and consumer duty
    pub heat_to_fluid_w: f64,
}

/// State at the midpoint of one pipe segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentResult {
    pub index: usize,
    /// Distance of the segment midpoint from the `from` junction
    pub position_m: f64,
    pub p_pa: f64,
    pub v_m_s: f64,
    pub t_k: f64,
    /// Heat lost to the surroundings by this segment
    pub heat_loss_w: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveDiagnostics {
    pub mode: SolveMode,
    /// Newton iterations of the final hydraulic pass
    pub iterations: usize,
    /// Final Newton update relative to the tolerances
    pub update_norm: f64,
    /// Hydraulic/thermal passes performed
    pub coupling_passes: usize,
}

/// Complete, immutable outcome of a solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    junctions: Vec<JunctionResult>,
    branches: Vec<BranchResult>,
    traces: Vec<Option<Vec<SegmentResult>>>,
    diagnostics: SolveDiagnostics,
}

impl SolveResult {
    pub fn junction(&self, id: JunctionId) -> Option<&JunctionResult> {
        self.junctions.get(id.slot())
    }

    pub fn branch(&self, id: BranchId) -> Option<&BranchResult> {
        self.branches.get(id.slot())
    }

    /// Per-segment states of a discretized branch, ordered from its `from`
    /// junction to its `to` junction. None for branches without segments.
    pub fn internal_trace(&self, id: BranchId) -> Option<&[SegmentResult]> {
        self.traces.get(id.slot())?.as_deref()
    }

    pub fn junctions(&self) -> &[JunctionResult] {
        &self.junctions
    }

    pub fn branches(&self) -> &[BranchResult] {
        &self.branches
    }

    pub fn diagnostics(&self) -> &SolveDiagnostics {
        &self.diagnostics
    }
}

/// Inputs to the projection of one branch.
struct BranchEnds<'p> {
    p_from: f64,
    p_to: f64,
    t_from: Temperature,
    t_to: Temperature,
    profile: Option<&'p SegmentProfile>,
}

/// Project solved state into result records.
///
/// `junction_temperatures` are used for every junction; `thermal` supplies
/// branch temperatures when a thermal sweep ran.
pub(crate) fn aggregate(
    network: &Network,
    hydraulic: &HydraulicSolution,
    junction_temperatures: &[Temperature],
    thermal: Option<&ThermalSolution>,
    diagnostics: SolveDiagnostics,
) -> SolverResult<SolveResult> {
    let junctions = network
        .graph()
        .junctions()
        .iter()
        .enumerate()
        .map(|(j, vertex)| JunctionResult {
            id: vertex.id,
            name: vertex.name.clone(),
            p_pa: hydraulic.pressures[j].value,
            t_k: junction_temperatures[j].value,
        })
        .collect();

    let projected = (0..network.branch_count())
        .into_par_iter()
        .map(|b| project_branch(network, hydraulic, junction_temperatures, thermal, b))
        .collect::<SolverResult<Vec<_>>>()?;
    let (branches, traces) = projected.into_iter().unzip();

    Ok(SolveResult {
        junctions,
        branches,
        traces,
        diagnostics,
    })
}

fn project_branch(
    network: &Network,
    hydraulic: &HydraulicSolution,
    junction_temperatures: &[Temperature],
    thermal: Option<&ThermalSolution>,
    b: usize,
) -> SolverResult<(BranchResult, Option<Vec<SegmentResult>>)> {
    let edge = &network.graph().branches()[b];
    let model = network.branches()[b].model();
    let mdot = hydraulic.mass_flows[b];
    let props = &hydraulic.branch_properties[b];
    let (from, to) = (edge.from.slot(), edge.to.slot());

    let (t_from, t_to, heat, profile) = match thermal {
        Some(th) => {
            let state = &th.branches[b];
            let (t_from, t_to) = state.end_temperatures();
            (t_from, t_to, state.heat_to_fluid.value, state.profile.as_ref())
        }
        None => (junction_temperatures[from], junction_temperatures[to], 0.0, None),
    };
    let ends = BranchEnds {
        p_from: hydraulic.pressures[from].value,
        p_to: hydraulic.pressures[to].value,
        t_from,
        t_to,
        profile,
    };

    let regime = model.flow_regime(mdot, props);
    let trace = match model.length() {
        Some(length) => Some(segment_trace(model, length.value, mdot.value, &ends, network.fluid())?),
        None => None,
    };

    let result = BranchResult {
        id: edge.id,
        name: edge.name.clone(),
        kind: model.kind(),
        mdot_kg_s: mdot.value,
        v_mean_m_s: regime.map(|r| r.velocity.value),
        p_from_pa: ends.p_from,
        p_to_pa: ends.p_to,
        t_from_k: t_from.value,
        t_to_k: t_to.value,
        reynolds: regime.map(|r| r.reynolds),
        friction_factor: regime.and_then(|r| r.friction_factor),
        heat_to_fluid_w: heat,
    };
    Ok((result, trace))
}

/// Segment midpoints from the `from` to the `to` junction.
///
/// Pressure varies linearly between the end pressures, which covers both
/// friction and the hydrostatic term. Velocity uses the density at the
/// segment temperature.
fn segment_trace(
    model: &dyn BranchModel,
    length: f64,
    mdot: f64,
    ends: &BranchEnds<'_>,
    fluid: &dyn FluidModel,
) -> SolverResult<Vec<SegmentResult>> {
    let n = model.segments();
    let area = model.flow_diameter().map(circle_area);

    (0..n)
        .map(|i| -> SolverResult<SegmentResult> {
            let frac = (i as f64 + 0.5) / n as f64;
            let t = ends
                .profile
                .and_then(|p| p.midpoints.get(i).copied())
                .unwrap_or_else(|| k(ends.t_from.value + frac * (ends.t_to.value - ends.t_from.value)));
            let heat_loss = ends
                .profile
                .and_then(|p| p.heat_losses.get(i))
                .map_or(0.0, |q| q.value);
            let v = match area {
                Some(a) => mdot / (fluid.rho(t)?.value * a.value),
                None => 0.0,
            };
            Ok(SegmentResult {
                index: i,
                position_m: frac * length,
                p_pa: ends.p_from + frac * (ends.p_to - ends.p_from),
                v_m_s: v,
                t_k: t.value,
                heat_loss_w: heat_loss,
            })
        })
        .collect()
}
