//! Property trend checks across the district-heating temperature range.

use hn_core::units::k;
use hn_fluids::{FluidModel, Water};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn water_properties_are_positive_and_finite(t in 280.0_f64..420.0) {
        let pack = Water::new().properties(k(t)).unwrap();
        prop_assert!(pack.rho.value.is_finite() && pack.rho.value > 900.0);
        prop_assert!(pack.mu.value.is_finite() && pack.mu.value > 0.0);
        prop_assert!(pack.cp > 4100.0 && pack.cp < 4350.0);
    }

    #[test]
    fn water_density_falls_above_four_celsius(t in 280.0_f64..370.0, dt in 1.0_f64..3.0) {
        let water = Water::new();
        let cooler = water.rho(k(t)).unwrap().value;
        let warmer = water.rho(k(t + dt)).unwrap().value;
        prop_assert!(warmer < cooler);
    }
}

#[test]
fn liquid_at_supply_temperature() {
    let pack = Water::new().properties(k(308.15)).unwrap();
    assert!(pack.rho.value > 990.0 && pack.rho.value < 1000.0);
    assert!(pack.mu.value > 6.0e-4 && pack.mu.value < 8.0e-4);
}
