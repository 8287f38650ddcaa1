//! # cc-cashflows
//!
//! The minimal cashflow model the calibration engine prices against:
//! fixed, floating, and accrued (mid-period) flows grouped into legs.
//! Schedule *generation* is an external collaborator; this crate only
//! evaluates the lists it is handed.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Individual cashflows.
pub mod cashflow;

/// Payment legs and present-value evaluation.
pub mod leg;

pub use cashflow::Cashflow;
pub use leg::Leg;
