//! Heat exchanger with a prescribed duty.

use crate::branch::BranchKind;
use crate::common::{EPSILON_MDOT, check_finite};
use crate::error::{ComponentError, ComponentResult};
use crate::traits::{BranchModel, EnergyBalance, PressureLoss};
use hn_core::numeric::{ensure_finite, ensure_non_negative, ensure_positive};
use hn_core::units::{Area, Length, MassRate, Power, Temperature, circle_area, k, pa, w};
use hn_fluids::{FluidModel, PropertyPack};

/// Heat exchanger removing a fixed duty from the stream.
///
/// A positive `duty` is heat extracted from the fluid (a consumer); a negative
/// duty heats it. The outlet temperature is
///
/// ```text
/// T_out = T_in - duty / (mdot * cp(T_in))
/// ```
///
/// and is not limited by any secondary-side temperature. The hydraulic loss
/// is a lumped `K * rho * v² / 2` over the connection diameter.
#[derive(Clone, Debug, PartialEq)]
pub struct HeatExchanger {
    /// Heat extracted from the fluid
    pub duty: Power,
    /// Connection diameter
    pub diameter: Length,
    /// Lumped loss coefficient (0 = hydraulically ideal)
    pub loss_coefficient: f64,
}

impl HeatExchanger {
    /// Create a hydraulically ideal heat exchanger.
    pub fn new(duty: Power, diameter: Length) -> ComponentResult<Self> {
        ensure_finite(duty.value, "heat exchanger duty")?;
        ensure_positive(diameter.value, "heat exchanger diameter")?;
        Ok(Self {
            duty,
            diameter,
            loss_coefficient: 0.0,
        })
    }

    pub fn with_loss_coefficient(mut self, loss_coefficient: f64) -> ComponentResult<Self> {
        ensure_non_negative(loss_coefficient, "heat exchanger loss coefficient")?;
        self.loss_coefficient = loss_coefficient;
        Ok(self)
    }

    pub fn area(&self) -> Area {
        circle_area(self.diameter)
    }
}

impl BranchModel for HeatExchanger {
    fn kind(&self) -> BranchKind {
        BranchKind::HeatExchanger
    }

    fn pressure_loss(&self, mdot: MassRate, fluid: &PropertyPack) -> ComponentResult<PressureLoss> {
        let m = mdot.value;
        let area = self.area().value;
        let denom = fluid.rho.value * area * area;
        let dp = self.loss_coefficient * m.abs() * m / (2.0 * denom);
        let slope = self.loss_coefficient * m.abs() / denom;
        Ok(PressureLoss {
            dp: pa(check_finite(dp, "heat exchanger pressure drop")?),
            ddp_dmdot: check_finite(slope, "heat exchanger pressure drop slope")?,
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
                what: "heat exchanger energy balance needs a positive mass flow",
            });
        }
        let cp = fluid.cp(inlet)?;
        let outlet = inlet.value - self.duty.value / (mdot.value * cp);
        if !(outlet > 0.0) {
            return Err(ComponentError::NonPhysical {
                what: "heat exchanger duty drives the outlet below absolute zero",
            });
        }
        Ok(EnergyBalance {
            outlet: k(outlet),
            heat_to_fluid: w(-self.duty.value),
            profile: None,
        })
    }

    fn flow_diameter(&self) -> Option<Length> {
        Some(self.diameter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::units::{kgps, m};
    use hn_fluids::ConstantProperties;

    fn consumer() -> HeatExchanger {
        HeatExchanger::new(w(100_000.0), m(0.2)).unwrap()
    }

    #[test]
    fn rejects_bad_geometry() {
        assert!(HeatExchanger::new(w(1.0), m(0.0)).is_err());
        assert!(HeatExchanger::new(w(f64::INFINITY), m(0.1)).is_err());
        assert!(consumer().with_loss_coefficient(-0.5).is_err());
    }

    #[test]
    fn duty_cools_the_stream() {
        let fluid = ConstantProperties::water_like();
        let balance = consumer().energy_balance(k(308.0), kgps(20.0), &fluid).unwrap();
        let expected = 308.0 - 100_000.0 / (20.0 * 4180.0);
        assert!((balance.outlet.value - expected).abs() < 1e-12);
        assert_eq!(balance.heat_to_fluid, w(-100_000.0));
    }

    #[test]
    fn negative_duty_heats_the_stream() {
        let fluid = ConstantProperties::water_like();
        let hx = HeatExchanger::new(w(-41_800.0), m(0.1)).unwrap();
        let balance = hx.energy_balance(k(300.0), kgps(1.0), &fluid).unwrap();
        assert!((balance.outlet.value - 310.0).abs() < 1e-12);
    }

    #[test]
    fn absurd_duty_is_rejected() {
        let fluid = ConstantProperties::water_like();
        let hx = HeatExchanger::new(w(1.0e9), m(0.1)).unwrap();
        assert!(hx.energy_balance(k(300.0), kgps(0.1), &fluid).is_err());
    }

    #[test]
    fn ideal_exchanger_has_no_pressure_drop() {
        let props = ConstantProperties::water_like().properties(k(300.0)).unwrap();
        let loss = consumer().pressure_loss(kgps(20.0), &props).unwrap();
        assert_eq!(loss.dp.value, 0.0);
    }

    #[test]
    fn lumped_loss_is_k_times_dynamic_pressure() {
        let props = ConstantProperties::water_like().properties(k(300.0)).unwrap();
        let hx = consumer().with_loss_coefficient(2.0).unwrap();
        let loss = hx.pressure_loss(kgps(20.0), &props).unwrap();
        let v = 20.0 / (1000.0 * hx.area().value);
        assert!((loss.dp.value - 2.0 * 0.5 * 1000.0 * v * v).abs() < 1e-9);

        let reverse = hx.pressure_loss(kgps(-20.0), &props).unwrap();
        assert!((reverse.dp.value + loss.dp.value).abs() < 1e-9);
    }
}
