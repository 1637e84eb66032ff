//! hn-components: branch models for district-heating networks.
//!
//! Provides models for the branch kinds a network is built from:
//! - Pipes with Darcy-Weisbach friction and segment-wise heat loss to ambient
//! - Circulation pumps imposing mass flow, supply pressure and supply temperature
//! - Heat exchangers applying a fixed external duty
//!
//! All kinds implement the `BranchModel` trait and are collected in the
//! `Branch` tagged variant the solver dispatches on.
//!
//! # Example
//!
//! ```
//! use hn_components::{BranchModel, Pipe};
//! use hn_core::units::{k, kgps, km, m, mm};
//! use hn_fluids::{FluidModel, Water};
//!
//! let pipe = Pipe::new(km(1.0), m(0.2), mm(0.1))
//!     .unwrap()
//!     .with_heat_loss(10.0, k(273.15))
//!     .unwrap()
//!     .with_segments(5)
//!     .unwrap();
//!
//! let water = Water::new();
//! let props = water.properties(k(308.15)).unwrap();
//! let loss = pipe.pressure_loss(kgps(20.0), &props).unwrap();
//! assert!(loss.dp.value > 0.0);
//!
//! let balance = pipe.energy_balance(k(308.15), kgps(20.0), &water).unwrap();
//! assert!(balance.outlet.value < 308.15 && balance.outlet.value > 273.15);
//! ```

pub mod branch;
pub mod common;
pub mod error;
pub mod friction;
pub mod heat_exchanger;
pub mod mixing;
pub mod pipe;
pub mod pump;
pub mod traits;

pub use branch::{Branch, BranchKind};
pub use error::{ComponentError, ComponentResult};
pub use heat_exchanger::HeatExchanger;
pub use mixing::mix_temperatures;
pub use pipe::Pipe;
pub use pump::CirculationPump;
pub use traits::{BranchModel, EnergyBalance, FlowBoundary, FlowRegime, PressureLoss, SegmentProfile};
