//! Unit conversion layer.
//!
//! Measurement units are partitioned into dimensions (weight, volume, count,
//! custom). Standard units convert through a per-dimension linear factor table;
//! piece counts reach weight only through an ingredient's piece weight, and
//! ingredient-specific overrides cover everything the standard graph cannot.
//!
//! Conversions never panic: failures come back as [`ConversionFailure`] so
//! callers can flag a single line and keep going.

pub mod convert;
pub mod overrides;
pub mod unit;

pub use convert::{
    ConversionFailure, are_units_compatible, are_units_compatible_with, convert, convert_str,
};
pub use overrides::{ConversionOverride, OverrideTable};
pub use unit::{Dimension, Unit, compatible_units, dimension_of, units_in};
