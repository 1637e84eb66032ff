//! Circulation pump: a flow and supply boundary inside the loop.

use crate::branch::BranchKind;
use crate::common::EPSILON_MDOT;
use crate::error::{ComponentError, ComponentResult};
use crate::traits::{BranchModel, EnergyBalance, FlowBoundary};
use hn_core::numeric::ensure_positive;
use hn_core::units::{MassRate, Pressure, Temperature, w};
use hn_fluids::FluidModel;

/// Circulation pump.
///
/// Drives a fixed mass flow from its `from` (return) junction to its `to`
/// (supply) junction and fixes the pressure and temperature at the supply
/// side. The pressure at the return side follows from the network.
///
/// Heat needed to lift the returning fluid back to supply temperature is
/// reported as `heat_to_fluid = mdot * cp(T_return) * (T_supply - T_return)`.
#[derive(Clone, Debug, PartialEq)]
pub struct CirculationPump {
    /// Imposed mass flow, positive from -> to
    pub mass_flow: MassRate,
    /// Absolute pressure at the outlet junction
    pub outlet_pressure: Pressure,
    /// Temperature of the fluid leaving the pump
    pub outlet_temperature: Temperature,
}

impl CirculationPump {
    /// Create a pump.
    ///
    /// # Errors
    /// Returns `InvalidParameter` unless flow, pressure and temperature are
    /// all positive and finite.
    pub fn new(
        mass_flow: MassRate,
        outlet_pressure: Pressure,
        outlet_temperature: Temperature,
    ) -> ComponentResult<Self> {
        ensure_positive(mass_flow.value, "pump mass flow")?;
        ensure_positive(outlet_pressure.value, "pump outlet pressure")?;
        ensure_positive(outlet_temperature.value, "pump outlet temperature")?;
        Ok(Self {
            mass_flow,
            outlet_pressure,
            outlet_temperature,
        })
    }
}

impl BranchModel for CirculationPump {
    fn kind(&self) -> BranchKind {
        BranchKind::CirculationPump
    }

    fn boundary(&self) -> Option<FlowBoundary> {
        Some(FlowBoundary {
            mass_flow: self.mass_flow,
            outlet_pressure: self.outlet_pressure,
            outlet_temperature: self.outlet_temperature,
        })
    }

    fn energy_balance(
        &self,
        inlet: Temperature,
        mdot: MassRate,
        fluid: &dyn FluidModel,
    ) -> ComponentResult<EnergyBalance> {
        if !(mdot.value > EPSILON_MDOT) {
            return Err(ComponentError::NonPhysical {
                what: "pump energy balance needs a positive mass flow",
            });
        }
        let cp = fluid.cp(inlet)?;
        let heat = mdot.value * cp * (self.outlet_temperature.value - inlet.value);
        Ok(EnergyBalance {
            outlet: self.outlet_temperature,
            heat_to_fluid: w(heat),
            profile: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::units::{bar, k, kgps};
    use hn_fluids::ConstantProperties;

    fn supply_pump() -> CirculationPump {
        CirculationPump::new(kgps(20.0), bar(5.0), k(308.15)).unwrap()
    }

    #[test]
    fn rejects_non_positive_settings() {
        assert!(CirculationPump::new(kgps(0.0), bar(5.0), k(308.15)).is_err());
        assert!(CirculationPump::new(kgps(-1.0), bar(5.0), k(308.15)).is_err());
        assert!(CirculationPump::new(kgps(20.0), bar(0.0), k(308.15)).is_err());
        assert!(CirculationPump::new(kgps(20.0), bar(5.0), k(f64::NAN)).is_err());
    }

    #[test]
    fn imposes_boundary() {
        let b = supply_pump().boundary().unwrap();
        assert_eq!(b.mass_flow, kgps(20.0));
        assert_eq!(b.outlet_pressure, bar(5.0));
        assert_eq!(b.outlet_temperature, k(308.15));
    }

    #[test]
    fn reheats_return_flow_to_supply_temperature() {
        let fluid = ConstantProperties::water_like();
        let balance = supply_pump().energy_balance(k(300.0), kgps(20.0), &fluid).unwrap();
        assert_eq!(balance.outlet, k(308.15));
        assert!((balance.heat_to_fluid.value - 20.0 * 4180.0 * 8.15).abs() < 1e-6);
    }

    #[test]
    fn has_no_friction_model() {
        let props = ConstantProperties::water_like().properties(k(300.0)).unwrap();
        assert!(matches!(
            supply_pump().pressure_loss(kgps(20.0), &props),
            Err(ComponentError::NotSupported { .. })
        ));
        assert!(supply_pump().flow_regime(kgps(20.0), &props).is_none());
    }
}
