//! # cc-calibration
//!
//! The calibration engine: the dual-mode numerical fitter (sequential
//! bootstrap and simultaneous global fit), the Fit/ReFit orchestration
//! protocol, the scoped cross-curve dependency graph, and the backtracking
//! basis-chain search.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// The Fit/ReFit protocol and concrete calibration strategies.
pub mod calibrator;

/// Backtracking search for basis-instrument chains.
pub mod chain;

/// Scoped construction of the cross-curve dependency graph.
pub mod dependency;

/// Per-fit instrument records.
pub mod fit_record;

/// The dual-mode numerical fitter.
pub mod fitter;

/// A registry of curves plus their calibrators.
pub mod system;

pub use calibrator::{fit, refit, Calibrator, CashflowCalibrator, FitContext, Pricer, ResolvedInstrument, ScheduleSource};
pub use calibrator::BasisCalibrator;
pub use chain::{find_chain, find_chain_any, BasisInstrument, LegIndex};
pub use dependency::DependencyScope;
pub use fit_record::{FitRecord, RecordLegs};
pub use fitter::{CashflowFitter, FitMethod, FitOptions, FitReport, FitStatus, ParametricForm, SmoothingParams};
pub use system::CurveSystem;
