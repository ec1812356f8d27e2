//! Core types for Hilal - crescent visibility and Hijri calendar offset engine.
//!
//! This crate contains pure type definitions with no astronomy or calendar logic.

mod geo;
mod measurement;
mod adjustment;
mod error;

pub use geo::{Observer, VisibilityCriteria};
pub use measurement::HilalMeasurement;
pub use adjustment::{AdjustmentOutcome, CalendarAdjustment};
pub use error::HilalError;
