//! # Shared Types Crate
//!
//! Primitive types shared by the ledger, the event bus and the node runtime.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identities, money and flight keys are defined
//!   once here and re-used everywhere.
//! - **Integer Money**: all amounts are [`Wei`] (`u128`); no floating point
//!   ever touches a balance.
//! - **Wire Codes**: [`FlightStatus`] and [`AirlineState`] keep the numeric
//!   codes external clients already understand.

pub mod entities;
pub mod errors;
pub mod units;

pub use entities::*;
pub use errors::*;
pub use units::*;
