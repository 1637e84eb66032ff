//! Constant-property fluid.

use crate::error::FluidResult;
use crate::model::{FluidModel, check_temperature};
use hn_core::numeric::ensure_positive;
use hn_core::units::{Density, DynVisc, SpecHeatCapacity, Temperature, kg_per_m3, pa_s};

/// Fluid whose properties do not vary with temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantProperties {
    rho: Density,
    mu: DynVisc,
    cp: SpecHeatCapacity,
}

impl ConstantProperties {
    /// Create a constant-property fluid; every property must be positive.
    pub fn new(rho: Density, mu: DynVisc, cp: SpecHeatCapacity) -> FluidResult<Self> {
        ensure_positive(rho.value, "density")?;
        ensure_positive(mu.value, "viscosity")?;
        ensure_positive(cp, "heat capacity")?;
        Ok(Self { rho, mu, cp })
    }

    /// Round-number water: 1000 kg/m³, 1 mPa·s, 4180 J/(kg·K).
    pub fn water_like() -> Self {
        Self {
            rho: kg_per_m3(1000.0),
            mu: pa_s(1.0e-3),
            cp: 4180.0,
        }
    }
}

impl FluidModel for ConstantProperties {
    fn name(&self) -> &str {
        "constant"
    }

    fn rho(&self, t: Temperature) -> FluidResult<Density> {
        check_temperature(t)?;
        Ok(self.rho)
    }

    fn mu(&self, t: Temperature) -> FluidResult<DynVisc> {
        check_temperature(t)?;
        Ok(self.mu)
    }

    fn cp(&self, t: Temperature) -> FluidResult<SpecHeatCapacity> {
        check_temperature(t)?;
        Ok(self.cp)
    }
}
