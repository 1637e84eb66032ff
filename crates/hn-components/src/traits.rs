//! Core traits for branch models.

use crate::branch::BranchKind;
use crate::common::{mean_velocity, reynolds};
use crate::error::{ComponentError, ComponentResult};
use hn_core::units::{Length, MassRate, Power, Pressure, Temperature, Velocity, circle_area, mps};
use hn_fluids::{FluidModel, PropertyPack};

/// Signed pressure drop from a branch's `from` to its `to` junction and its
/// derivative with respect to the branch mass flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureLoss {
    pub dp: Pressure,
    /// d(dp)/d(mdot) in Pa per kg/s
    pub ddp_dmdot: f64,
}

/// Per-segment temperatures of a discretized branch, ordered along the flow.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SegmentProfile {
    /// N+1 temperatures at segment boundaries, flow inlet first.
    pub boundaries: Vec<Temperature>,
    /// N temperatures at segment midpoints.
    pub midpoints: Vec<Temperature>,
    /// N heat flows lost to the surroundings (positive = fluid cools).
    pub heat_losses: Vec<Power>,
}

/// Result of propagating a temperature through a branch along its flow.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyBalance {
    pub outlet: Temperature,
    /// Heat gained by the fluid (negative when the branch cools it).
    pub heat_to_fluid: Power,
    /// Present for discretized branches.
    pub profile: Option<SegmentProfile>,
}

/// Boundary conditions imposed by a branch regardless of network state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowBoundary {
    pub mass_flow: MassRate,
    pub outlet_pressure: Pressure,
    pub outlet_temperature: Temperature,
}

/// Derived flow quantities for reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowRegime {
    pub velocity: Velocity,
    pub reynolds: f64,
    pub friction_factor: Option<f64>,
}

/// Trait for branches connecting a `from` junction to a `to` junction.
///
/// Models are deterministic functions of flow, temperature and their own
/// parameters, suitable for Newton assembly and sequential thermal sweeps.
pub trait BranchModel: Send + Sync {
    fn kind(&self) -> BranchKind;

    /// Boundary conditions for branches that impose them (circulation pumps).
    ///
    /// Branches returning `Some` take no part in the pressure-loss equations:
    /// their mass flow is fixed and their outlet junction is pinned.
    fn boundary(&self) -> Option<FlowBoundary> {
        None
    }

    /// Signed pressure drop `p_from - p_to` caused by friction and fittings.
    ///
    /// Positive flow means from -> to. The loss is odd in `mdot`.
    /// Default implementation returns NotSupported.
    fn pressure_loss(
        &self,
        _mdot: MassRate,
        _fluid: &PropertyPack,
    ) -> ComponentResult<PressureLoss> {
        Err(ComponentError::NotSupported {
            what: "pressure_loss not implemented for this branch",
        })
    }

    /// Outlet temperature for fluid entering at `inlet` with flow magnitude `mdot`.
    ///
    /// `mdot` is measured along the actual flow direction and must be positive.
    fn energy_balance(
        &self,
        inlet: Temperature,
        mdot: MassRate,
        fluid: &dyn FluidModel,
    ) -> ComponentResult<EnergyBalance>;

    /// Inner diameter for branches that have one.
    fn flow_diameter(&self) -> Option<Length> {
        None
    }

    /// Darcy friction factor at a Reynolds number, for branches modelling wall friction.
    fn friction_factor(&self, _reynolds: f64) -> Option<f64> {
        None
    }

    /// Velocity, Reynolds number and friction factor at a flow.
    ///
    /// Returns None for branches without a flow cross-section.
    fn flow_regime(&self, mdot: MassRate, fluid: &PropertyPack) -> Option<FlowRegime> {
        let d = self.flow_diameter()?;
        let area = circle_area(d);
        let re = reynolds(mdot.value.abs(), d, area, fluid.mu.value);
        Some(FlowRegime {
            velocity: mps(mean_velocity(mdot.value, fluid.rho.value, area)),
            reynolds: re,
            friction_factor: self.friction_factor(re),
        })
    }

    /// Number of equal segments the branch is discretized into.
    fn segments(&self) -> usize {
        1
    }

    /// Geometric length, for branches with one.
    fn length(&self) -> Option<Length> {
        None
    }
}
