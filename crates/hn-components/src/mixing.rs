//! Adiabatic mixing of streams meeting at a junction.

use crate::common::EPSILON_MDOT;
use hn_core::units::{MassRate, Temperature, k};

/// Mass-weighted mean temperature of the incoming streams: `sum(m T) / sum(m)`.
///
/// Streams with a mass flow at or below the stagnation threshold carry no
/// enthalpy and are ignored. Returns None when nothing flows in.
pub fn mix_temperatures(streams: &[(MassRate, Temperature)]) -> Option<Temperature> {
    let (flow, weighted) = streams
        .iter()
        .filter(|(m, _)| m.value > EPSILON_MDOT)
        .fold((0.0, 0.0), |(flow, weighted), (m, t)| {
            (flow + m.value, weighted + m.value * t.value)
        });

    (flow > 0.0).then(|| k(weighted / flow))
}
