//! Fluid property model trait and property pack.

use crate::error::{FluidError, FluidResult};
use hn_core::units::{Density, DynVisc, SpecHeatCapacity, Temperature};

/// Properties evaluated once at a temperature and reused by branch models.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropertyPack {
    /// Temperature the pack was evaluated at [K]
    pub t: Temperature,

    /// Density [kg/m³]
    pub rho: Density,

    /// Dynamic viscosity [Pa·s]
    pub mu: DynVisc,

    /// Specific heat capacity at constant pressure [J/(kg·K)]
    pub cp: SpecHeatCapacity,
}

/// Trait for fluid property models.
///
/// Implementations must be thread-safe (Send + Sync) so a network can be
/// shared across threads.
pub trait FluidModel: Send + Sync + std::fmt::Debug {
    /// Get the model name (for debugging/logging).
    fn name(&self) -> &str;

    /// Density [kg/m³] at the given temperature.
    fn rho(&self, t: Temperature) -> FluidResult<Density>;

    /// Dynamic viscosity [Pa·s] at the given temperature.
    fn mu(&self, t: Temperature) -> FluidResult<DynVisc>;

    /// Specific heat capacity [J/(kg·K)] at the given temperature.
    fn cp(&self, t: Temperature) -> FluidResult<SpecHeatCapacity>;

    /// Evaluate all properties at once.
    fn properties(&self, t: Temperature) -> FluidResult<PropertyPack> {
        check_temperature(t)?;
        Ok(PropertyPack {
            t,
            rho: self.rho(t)?,
            mu: self.mu(t)?,
            cp: self.cp(t)?,
        })
    }
}

/// Reject absolute temperatures that are not finite and positive.
pub fn check_temperature(t: Temperature) -> FluidResult<()> {
    if !t.value.is_finite() || t.value <= 0.0 {
        return Err(FluidError::NonPhysical {
            what: "temperature",
            value: t.value,
        });
    }
    Ok(())
}
