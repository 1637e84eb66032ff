//! Liquid water from the CoolProp reference equation of state.

use crate::error::{FluidError, FluidResult};
use crate::model::{FluidModel, PropertyPack, check_temperature};
use hn_core::numeric::ensure_positive;
use hn_core::units::{
    Density, DynVisc, Pressure, SpecHeatCapacity, Temperature, bar, kg_per_m3, pa, pa_s,
};
use rfluids::prelude::*;

/// Liquid water evaluated through `rfluids` at a fixed reference pressure.
///
/// The network treats the liquid as incompressible, so every property is
/// looked up at `(reference pressure, T)`. The default reference of 5 bar
/// keeps water liquid up to roughly 150 °C.
#[derive(Debug, Clone, Copy)]
pub struct Water {
    pressure_pa: f64,
}

impl Water {
    /// Water at the default 5 bar reference pressure.
    pub fn new() -> Self {
        Self {
            pressure_pa: bar(5.0).value,
        }
    }

    /// Water evaluated at another reference pressure.
    pub fn at_pressure(pressure: Pressure) -> FluidResult<Self> {
        ensure_positive(pressure.value, "water reference pressure")?;
        Ok(Self {
            pressure_pa: pressure.value,
        })
    }

    pub fn reference_pressure(&self) -> Pressure {
        pa(self.pressure_pa)
    }

    /// Backend state at the reference pressure and `t`.
    fn fluid_at(&self, t: Temperature) -> FluidResult<Fluid> {
        check_temperature(t)?;
        Fluid::from(Pure::Water)
            .in_state(
                FluidInput::pressure(self.pressure_pa),
                FluidInput::temperature(t.value),
            )
            .map_err(|e| FluidError::Backend {
                message: format!(
                    "rfluids error at P={} Pa, T={} K: {}",
                    self.pressure_pa, t.value, e
                ),
            })
    }
}

impl Default for Water {
    fn default() -> Self {
        Self::new()
    }
}

fn backend(what: &str, e: impl std::fmt::Display) -> FluidError {
    FluidError::Backend {
        message: format!("rfluids error getting {what}: {e}"),
    }
}

impl FluidModel for Water {
    fn name(&self) -> &str {
        "water"
    }

    fn rho(&self, t: Temperature) -> FluidResult<Density> {
        let mut fluid = self.fluid_at(t)?;
        let rho = fluid.density().map_err(|e| backend("density", e))?;
        Ok(kg_per_m3(rho))
    }

    fn mu(&self, t: Temperature) -> FluidResult<DynVisc> {
        let mut fluid = self.fluid_at(t)?;
        let mu = fluid
            .dynamic_viscosity()
            .map_err(|e| backend("viscosity", e))?;
        Ok(pa_s(mu))
    }

    fn cp(&self, t: Temperature) -> FluidResult<SpecHeatCapacity> {
        let mut fluid = self.fluid_at(t)?;
        fluid.specific_heat().map_err(|e| backend("specific heat", e))
    }

    /// One backend state for all three properties.
    fn properties(&self, t: Temperature) -> FluidResult<PropertyPack> {
        let mut fluid = self.fluid_at(t)?;
        let rho = fluid.density().map_err(|e| backend("density", e))?;
        let mu = fluid
            .dynamic_viscosity()
            .map_err(|e| backend("viscosity", e))?;
        let cp = fluid.specific_heat().map_err(|e| backend("specific heat", e))?;
        Ok(PropertyPack {
            t,
            rho: kg_per_m3(rho),
            mu: pa_s(mu),
            cp,
        })
    }
}
