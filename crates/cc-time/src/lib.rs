//! # cc-time
//!
//! Dates and day-count conventions.  Dates are plain `chrono::NaiveDate`s;
//! calendar arithmetic and schedule *generation* are external collaborators
//! and deliberately absent here.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Day-count conventions.
pub mod day_counter;

pub use chrono::NaiveDate as Date;
pub use day_counter::{Actual360, Actual365Fixed, DayCounter};

/// Construct a date from year/month/day, panicking on invalid input.
///
/// Test-and-example helper; production code should handle the `Option`
/// from `chrono` itself.
pub fn ymd(year: i32, month: u32, day: u32) -> Date {
    Date::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| panic!("invalid date {year}-{month:02}-{day:02}"))
}
