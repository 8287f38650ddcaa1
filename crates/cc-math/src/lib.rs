//! # cc-math
//!
//! Numerical building blocks for the calibration engine: a dynamically
//! sized real vector ([`Array`]), bracketed 1-D root finders, and a bounded
//! nonlinear least-squares optimizer.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Dynamically sized real vector backed by `nalgebra`.
pub mod array;

/// Bounded nonlinear least-squares optimization.
pub mod optimization;

/// Bracketed one-dimensional root finders.
pub mod solvers1d;

pub use array::Array;
pub use optimization::{
    BoundaryConstraint, CostFunction, EndCriteria, EndCriteriaType, LevenbergMarquardt,
    OptimizationResult,
};
