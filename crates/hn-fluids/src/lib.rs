//! hn-fluids: fluid property models for heatnet.
//!
//! Provides:
//! - `FluidModel` trait: temperature-dependent density, viscosity and heat capacity
//! - `Water`: liquid water from CoolProp (via `rfluids`) at a reference pressure
//! - `ConstantProperties`: fixed properties, handy for hand-checkable cases
//!
//! Liquids are treated as incompressible: properties depend on temperature only.
//!
//! # Example
//!
//! ```
//! use hn_fluids::{FluidModel, Water};
//! use hn_core::units::k;
//!
//! let water = Water::new();
//! let props = water.properties(k(308.15)).unwrap();
//! assert!(props.rho.value > 990.0 && props.rho.value < 1000.0);
//! ```

pub mod constant;
pub mod error;
pub mod model;
pub mod water;

pub use constant::ConstantProperties;
pub use error::{FluidError, FluidResult};
pub use model::{FluidModel, PropertyPack};
pub use water::Water;
