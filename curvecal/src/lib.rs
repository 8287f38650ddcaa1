//! # curvecal
//!
//! Self-consistent market-curve calibration: sequential bootstrap and
//! penalized global fitting of discount curves, with dependency-ordered
//! orchestration across curve families and chain discovery over basis
//! quotes.
//!
//! This crate is a **façade** that re-exports all public items from the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `cc-*` crates.
//!
//! ## Quick start
//!
//! ```toml
//! [dependencies]
//! curvecal = "0.1"
//! ```
//!
//! ```rust
//! use curvecal::curves::{Curve, DiscountProvider};
//! use curvecal::time::ymd;
//!
//! let mut curve = Curve::new(ymd(2026, 1, 2));
//! curve.add(ymd(2027, 1, 2), 0.99).unwrap();
//! let df = curve.discount_factor(ymd(2027, 1, 2)).unwrap();
//! assert!((df - 0.99).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use cc_core as core;

/// Dates and day counters.
pub use cc_time as time;

/// Arrays, one-dimensional solvers, and the optimization framework.
pub use cc_math as math;

/// The curve data model: curves, tenors, and the id-keyed registry.
pub use cc_curves as curves;

/// Cashflows and leg valuation.
pub use cc_cashflows as cashflows;

/// The calibration engine: fitter, calibrators, dependency graph, and
/// basis-chain discovery.
pub use cc_calibration as calibration;
