//! # cc-curves
//!
//! The curve data model: the ordered date→value [`Curve`] ADT, calibration
//! instrument records ([`CurveTenor`]), the per-market [`CalibratedCurve`]
//! with its dependency bookkeeping, and the id-keyed [`CurveRegistry`] that
//! replaces direct curve-to-curve references.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// A curve plus tenors and dependency bookkeeping.
pub mod calibrated_curve;

/// The ordered date→value curve ADT.
pub mod curve;

/// Id-keyed curve storage and parent/dependent helpers.
pub mod registry;

/// Calibration instrument records.
pub mod tenor;

pub use calibrated_curve::CalibratedCurve;
pub use curve::{Curve, DiscountProvider, Interpolation, ValueConvention};
pub use registry::{CurveId, CurveRegistry};
pub use tenor::CurveTenor;
