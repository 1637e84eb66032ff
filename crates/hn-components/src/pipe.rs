//! Pipe with Darcy-Weisbach friction and heat loss to the surroundings.

use crate::branch::BranchKind;
use crate::common::{EPSILON_MDOT, check_finite, reynolds};
use crate::error::{ComponentError, ComponentResult};
use crate::friction;
use crate::traits::{BranchModel, EnergyBalance, PressureLoss, SegmentProfile};
use hn_core::numeric::{ensure_non_negative, ensure_positive};
use hn_core::units::{
    Area, HeatTransferCoeff, Length, MassRate, Temperature, circle_area, k, pa, w,
};
use hn_fluids::{FluidModel, PropertyPack};

/// Ambient temperature used until `with_heat_loss` sets one [K].
pub const DEFAULT_AMBIENT_K: f64 = 293.15;

/// Pipe with friction and optional heat loss.
///
/// ## Hydraulics
///
/// ```text
/// dp = sign(mdot) * (f(Re) * L/d + K) * mdot² / (2 * rho * A²)
/// ```
///
/// with the Darcy friction factor from [`friction::darcy`]. Below `Re = 2300`
/// this reduces to Hagen-Poiseuille, which keeps the loss law differentiable
/// through zero flow.
///
/// ## Heat loss
///
/// The pipe is split into `segments` equal parts. Each part exchanges heat
/// with the surroundings through its inner surface `pi * d * L_seg`:
///
/// ```text
/// T_out = T_amb + (T_in - T_amb) * exp(-alpha * pi * d * L_seg / (mdot * cp))
/// ```
///
/// `cp` is evaluated at the segment inlet temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    /// Pipe length
    pub length: Length,
    /// Pipe inner diameter
    pub diameter: Length,
    /// Surface roughness (absolute)
    pub roughness: Length,
    /// Minor loss coefficient (sum of K factors for fittings, bends, etc.)
    pub loss_coefficient: f64,
    /// Heat-transfer coefficient to the surroundings [W/(m²·K)]
    pub alpha: HeatTransferCoeff,
    /// Temperature of the surroundings
    pub ambient: Temperature,
    segments: usize,
}

impl Pipe {
    /// Create an adiabatic, single-segment pipe.
    ///
    /// # Errors
    /// Returns `InvalidParameter` for non-positive length or diameter and for
    /// negative roughness.
    pub fn new(length: Length, diameter: Length, roughness: Length) -> ComponentResult<Self> {
        ensure_positive(length.value, "pipe length")?;
        ensure_positive(diameter.value, "pipe diameter")?;
        ensure_non_negative(roughness.value, "pipe roughness")?;
        Ok(Self {
            length,
            diameter,
            roughness,
            loss_coefficient: 0.0,
            alpha: 0.0,
            ambient: k(DEFAULT_AMBIENT_K),
            segments: 1,
        })
    }

    /// Enable heat exchange with surroundings at `ambient`.
    pub fn with_heat_loss(
        mut self,
        alpha: HeatTransferCoeff,
        ambient: Temperature,
    ) -> ComponentResult<Self> {
        ensure_non_negative(alpha, "heat-transfer coefficient")?;
        ensure_positive(ambient.value, "ambient temperature")?;
        self.alpha = alpha;
        self.ambient = ambient;
        Ok(self)
    }

    /// Split the pipe into `segments` equal parts (at least one).
    pub fn with_segments(mut self, segments: usize) -> ComponentResult<Self> {
        ensure_positive(segments as f64, "pipe segment count")?;
        self.segments = segments;
        Ok(self)
    }

    /// Add a lumped minor-loss coefficient for fittings and bends.
    pub fn with_loss_coefficient(mut self, loss_coefficient: f64) -> ComponentResult<Self> {
        ensure_non_negative(loss_coefficient, "pipe loss coefficient")?;
        self.loss_coefficient = loss_coefficient;
        Ok(self)
    }

    /// Inner cross-section.
    pub fn area(&self) -> Area {
        circle_area(self.diameter)
    }

    /// Length of one segment.
    pub fn segment_length(&self) -> Length {
        self.length / self.segments as f64
    }

    /// Relative roughness e/d.
    fn rel_roughness(&self) -> f64 {
        self.roughness.value / self.diameter.value
    }

    /// Slope of the laminar loss law, Pa per kg/s: 32 mu L / (d² rho A).
    fn laminar_slope(&self, fluid: &PropertyPack) -> f64 {
        32.0 * fluid.mu.value * self.length.value
            / (self.diameter.value.powi(2) * fluid.rho.value * self.area().value)
    }

    /// Heat-exchange exponent of one segment: alpha * pi * d * L_seg / (mdot * cp).
    fn segment_ntu(&self, mdot_abs: f64, cp: f64) -> f64 {
        self.alpha * std::f64::consts::PI * self.diameter.value * self.segment_length().value
            / (mdot_abs * cp)
    }
}

impl BranchModel for Pipe {
    fn kind(&self) -> BranchKind {
        BranchKind::Pipe
    }

    fn pressure_loss(&self, mdot: MassRate, fluid: &PropertyPack) -> ComponentResult<PressureLoss> {
        let m = mdot.value;
        let m_abs = m.abs();

        if m_abs < EPSILON_MDOT {
            let slope = self.laminar_slope(fluid);
            return Ok(PressureLoss {
                dp: pa(slope * m),
                ddp_dmdot: slope,
            });
        }

        let rho = fluid.rho.value;
        let area = self.area().value;
        let l_over_d = self.length.value / self.diameter.value;
        let re = reynolds(m_abs, self.diameter, self.area(), fluid.mu.value);
        check_finite(re, "Reynolds number")?;

        let f = friction::darcy(re, self.rel_roughness());
        let dyn_p = m_abs * m_abs / (2.0 * rho * area * area);
        let resistance = f.factor * l_over_d + self.loss_coefficient;

        let dp_abs = check_finite(resistance * dyn_p, "pressure drop")?;
        // Re is proportional to |mdot|, so dRe/d|mdot| = Re/|mdot|.
        let slope = resistance * m_abs / (rho * area * area)
            + l_over_d * f.d_factor_d_re * (re / m_abs) * dyn_p;

        Ok(PressureLoss {
            dp: pa(m.signum() * dp_abs),
            ddp_dmdot: check_finite(slope, "pressure drop slope")?,
        })
    }

    fn energy_balance(
        &self,
        inlet: Temperature,
        mdot: MassRate,
        fluid: &dyn FluidModel,
    ) -> ComponentResult<EnergyBalance> {
        let m = mdot.value;
        if !(m > EPSILON_MDOT) {
            return Err(ComponentError::NonPhysical {
                what: "pipe energy balance needs a positive mass flow",
            });
        }

        let t_amb = self.ambient.value;
        let mut profile = SegmentProfile {
            boundaries: Vec::with_capacity(self.segments + 1),
            midpoints: Vec::with_capacity(self.segments),
            heat_losses: Vec::with_capacity(self.segments),
        };
        profile.boundaries.push(inlet);

        let mut t_in = inlet.value;
        let mut heat_to_fluid = 0.0;
        for _ in 0..self.segments {
            let cp = fluid.cp(k(t_in))?;
            let ntu = self.segment_ntu(m, cp);
            let t_mid = t_amb + (t_in - t_amb) * (-0.5 * ntu).exp();
            let t_out = check_finite(t_amb + (t_in - t_amb) * (-ntu).exp(), "pipe outlet temperature")?;
            let loss = m * cp * (t_in - t_out);

            profile.midpoints.push(k(t_mid));
            profile.boundaries.push(k(t_out));
            profile.heat_losses.push(w(loss));
            heat_to_fluid -= loss;
            t_in = t_out;
        }

        Ok(EnergyBalance {
            outlet: k(t_in),
            heat_to_fluid: w(heat_to_fluid),
            profile: Some(profile),
        })
    }

    fn flow_diameter(&self) -> Option<Length> {
        Some(self.diameter)
    }

    fn friction_factor(&self, reynolds: f64) -> Option<f64> {
        (reynolds > 0.0).then(|| friction::darcy(reynolds, self.rel_roughness()).factor)
    }

    fn segments(&self) -> usize {
        self.segments
    }

    fn length(&self) -> Option<Length> {
        Some(self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::units::{kgps, km, m, mm};
    use hn_fluids::{ConstantProperties, FluidModel};

    fn district_pipe() -> Pipe {
        Pipe::new(km(1.0), m(0.2), mm(0.1))
            .unwrap()
            .with_heat_loss(10.0, k(273.15))
            .unwrap()
            .with_segments(5)
            .unwrap()
    }

    fn props() -> PropertyPack {
        ConstantProperties::water_like().properties(k(300.0)).unwrap()
    }

    #[test]
    fn rejects_non_physical_geometry() {
        assert!(Pipe::new(m(0.0), m(0.1), mm(0.1)).is_err());
        assert!(Pipe::new(m(10.0), m(-0.1), mm(0.1)).is_err());
        assert!(Pipe::new(m(10.0), m(0.1), mm(-0.1)).is_err());
        assert!(Pipe::new(m(10.0), m(0.1), mm(0.1)).unwrap().with_segments(0).is_err());
        assert!(Pipe::new(m(10.0), m(0.1), mm(0.1))
            .unwrap()
            .with_heat_loss(-1.0, k(280.0))
            .is_err());
    }

    #[test]
    fn zero_flow_has_zero_drop_and_laminar_slope() {
        let pipe = district_pipe();
        let loss = pipe.pressure_loss(kgps(0.0), &props()).unwrap();
        assert_eq!(loss.dp.value, 0.0);
        assert!(loss.ddp_dmdot > 0.0);
    }

    #[test]
    fn pressure_loss_is_odd() {
        let pipe = district_pipe();
        let fwd = pipe.pressure_loss(kgps(20.0), &props()).unwrap();
        let rev = pipe.pressure_loss(kgps(-20.0), &props()).unwrap();
        assert!(fwd.dp.value > 0.0);
        assert!((fwd.dp.value + rev.dp.value).abs() < 1e-9);
        assert!((fwd.ddp_dmdot - rev.ddp_dmdot).abs() < 1e-9);
    }

    #[test]
    fn turbulent_drop_matches_darcy_weisbach() {
        let pipe = district_pipe();
        let p = props();
        let loss = pipe.pressure_loss(kgps(20.0), &p).unwrap();

        let area = pipe.area().value;
        let v = 20.0 / (1000.0 * area);
        let re = 1000.0 * v * 0.2 / 1.0e-3;
        let f = friction::darcy(re, 0.1e-3 / 0.2).factor;
        let expected = f * 1000.0 / 0.2 * 0.5 * 1000.0 * v * v;
        assert!((loss.dp.value - expected).abs() / expected < 1e-10);
    }

    #[test]
    fn slope_matches_finite_difference() {
        let pipe = district_pipe().with_loss_coefficient(1.5).unwrap();
        let p = props();
        for mdot in [0.05_f64, 3.0, 20.0, -12.0] {
            let h = 1e-6 * mdot.abs().max(1.0);
            let up = pipe.pressure_loss(kgps(mdot + h), &p).unwrap().dp.value;
            let down = pipe.pressure_loss(kgps(mdot - h), &p).unwrap().dp.value;
            let fd = (up - down) / (2.0 * h);
            let analytic = pipe.pressure_loss(kgps(mdot), &p).unwrap().ddp_dmdot;
            assert!(
                (fd - analytic).abs() <= 1e-5 * analytic.abs(),
                "mdot={mdot}: fd={fd}, analytic={analytic}"
            );
        }
    }

    #[test]
    fn longer_pipe_loses_more_pressure() {
        let p = props();
        let short = Pipe::new(m(100.0), m(0.1), mm(0.05)).unwrap();
        let long = Pipe::new(m(400.0), m(0.1), mm(0.05)).unwrap();
        let dp_short = short.pressure_loss(kgps(5.0), &p).unwrap().dp.value;
        let dp_long = long.pressure_loss(kgps(5.0), &p).unwrap().dp.value;
        assert!(dp_long > dp_short);
    }

    #[test]
    fn heat_loss_profile_decays_toward_ambient() {
        let pipe = district_pipe();
        let fluid = ConstantProperties::water_like();
        let balance = pipe.energy_balance(k(308.15), kgps(20.0), &fluid).unwrap();
        let profile = balance.profile.unwrap();

        assert_eq!(profile.boundaries.len(), 6);
        assert_eq!(profile.midpoints.len(), 5);
        for pair in profile.boundaries.windows(2) {
            assert!(pair[1] < pair[0]);
            assert!(pair[1].value > 273.15);
        }

        // Closed form over the whole pipe: segments compose exactly.
        let ua = 10.0 * std::f64::consts::PI * 0.2 * 1000.0;
        let expected = 273.15 + 35.0 * (-ua / (20.0 * 4180.0)).exp();
        assert!((balance.outlet.value - expected).abs() < 1e-9);

        let lost: f64 = profile.heat_losses.iter().map(|q| q.value).sum();
        assert!((lost + balance.heat_to_fluid.value).abs() < 1e-6);
        assert!((lost - 20.0 * 4180.0 * (308.15 - expected)).abs() < 1e-6);
    }

    #[test]
    fn adiabatic_pipe_keeps_temperature() {
        let pipe = Pipe::new(m(50.0), m(0.05), mm(0.1)).unwrap();
        let fluid = ConstantProperties::water_like();
        let balance = pipe.energy_balance(k(330.0), kgps(1.0), &fluid).unwrap();
        assert_eq!(balance.outlet, k(330.0));
        assert_eq!(balance.heat_to_fluid.value, 0.0);
    }

    #[test]
    fn energy_balance_rejects_stagnant_flow() {
        let fluid = ConstantProperties::water_like();
        assert!(district_pipe().energy_balance(k(330.0), kgps(0.0), &fluid).is_err());
    }
}
