//! Common utilities for component calculations.

use crate::error::{ComponentError, ComponentResult};
use hn_core::numeric::ensure_finite;
use hn_core::units::{Area, Length};

/// Below this mass flow (kg/s) a branch is treated as stagnant.
pub const EPSILON_MDOT: f64 = 1e-9;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<f64> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })
}

/// Reynolds number of a circular duct: 4|mdot| / (pi d mu), written via the flow area.
pub fn reynolds(mdot_abs: f64, diameter: Length, area: Area, mu: f64) -> f64 {
    mdot_abs * diameter.value / (area.value * mu)
}

/// Mean velocity from mass flow, density and flow area (signed like `mdot`).
pub fn mean_velocity(mdot: f64, rho: f64, area: Area) -> f64 {
    mdot / (rho * area.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::units::{circle_area, m};

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::INFINITY, "test").is_err());
        assert!(check_finite(f64::NAN, "test").is_err());
    }

    #[test]
    fn reynolds_matches_textbook_form() {
        let d = m(0.2);
        let area = circle_area(d);
        let mu = 1.0e-3;
        let expected = 4.0 * 20.0 / (std::f64::consts::PI * 0.2 * mu);
        assert!((reynolds(20.0, d, area, mu) - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn velocity_keeps_sign() {
        let area = circle_area(m(0.1));
        assert!(mean_velocity(-1.0, 1000.0, area) < 0.0);
    }
}
