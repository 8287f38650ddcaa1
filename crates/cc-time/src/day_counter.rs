//! Day-count conventions.
//!
//! A *day counter* converts a pair of dates into a year fraction.  Only the
//! conventions the calibration engine itself needs are provided; exotic
//! conventions belong to the schedule-generation collaborator.

use cc_core::Time;
use chrono::NaiveDate;

/// A day-count convention.
pub trait DayCounter: std::fmt::Debug + Send + Sync {
    /// Human-readable name of this convention (e.g. `"Actual/360"`).
    fn name(&self) -> &str;

    /// Number of calendar days between `d1` and `d2`.
    fn day_count(&self, d1: NaiveDate, d2: NaiveDate) -> i64 {
        (d2 - d1).num_days()
    }

    /// Fraction of a year between `d1` and `d2`.
    fn year_fraction(&self, d1: NaiveDate, d2: NaiveDate) -> Time;
}

/// Actual/360 convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct Actual360;

impl DayCounter for Actual360 {
    fn name(&self) -> &str {
        "Actual/360"
    }

    fn year_fraction(&self, d1: NaiveDate, d2: NaiveDate) -> Time {
        self.day_count(d1, d2) as Time / 360.0
    }
}

/// Actual/365 (Fixed) convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct Actual365Fixed;

impl DayCounter for Actual365Fixed {
    fn name(&self) -> &str {
        "Actual/365 (Fixed)"
    }

    fn year_fraction(&self, d1: NaiveDate, d2: NaiveDate) -> Time {
        self.day_count(d1, d2) as Time / 365.0
    }
}
