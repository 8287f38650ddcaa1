//! # cc-core
//!
//! Core types and error definitions shared across the curvecal workspace –
//! numeric type aliases, the error enum, and the `ensure!` / `fail!`
//! convenience macros.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Error types and the `ensure!` / `fail!` / `ensure_post!` macros.
pub mod errors;

// ── Primitive type aliases ───────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// A year fraction.
pub type Time = f64;

/// An interest rate (decimal, e.g. 0.05 for 5 %).
pub type Rate = f64;

/// A discount factor.
pub type DiscountFactor = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;
