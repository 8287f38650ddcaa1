//! The ordered date→value curve ADT.
//!
//! A [`Curve`] stores strictly date-increasing points and interpolates
//! between them.  Value semantics depend on use (discount factor, implied
//! rate, volatility); the calibration engine mutates the points in place
//! while solving, so concurrent external reads during a fit must be
//! serialized by the caller.

use cc_core::{
    errors::{Error, Result},
    DiscountFactor, Rate, Real,
};
use cc_time::{Date, DayCounter};

/// Interpolation scheme between curve points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Linear interpolation of log-values (the natural scheme for discount
    /// factors).  Falls back to linear when a value is non-positive.
    LogLinear,
    /// Linear interpolation of values.
    Linear,
    /// Value of the nearest earlier point.  Used transiently by the
    /// bootstrap reformat step for root-finder robustness.
    PreviousConstant,
}

/// How curve values relate to the as-of date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueConvention {
    /// Values are discount factors anchored at 1 on the as-of date.
    DiscountFactor,
    /// Values are multiplicative day-count/frequency factors; the bootstrap
    /// reformat step re-bases the as-of date for such curves.
    MultiplicativeFactor,
}

/// An ordered sequence of (date, value) points with strictly increasing
/// dates.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    as_of: Date,
    points: Vec<(Date, Real)>,
    interpolation: Interpolation,
    convention: ValueConvention,
}

impl Curve {
    /// An empty log-linear discount-factor curve anchored at `as_of`.
    pub fn new(as_of: Date) -> Self {
        Self {
            as_of,
            points: Vec::new(),
            interpolation: Interpolation::LogLinear,
            convention: ValueConvention::DiscountFactor,
        }
    }

    /// Builder: set the interpolation scheme.
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Builder: set the value convention.
    pub fn with_convention(mut self, convention: ValueConvention) -> Self {
        self.convention = convention;
        self
    }

    /// The curve's as-of (anchor) date.
    pub fn as_of(&self) -> Date {
        self.as_of
    }

    /// Move the as-of date (used by the bootstrap reformat step).
    pub fn set_as_of(&mut self, as_of: Date) {
        self.as_of = as_of;
    }

    /// Current interpolation scheme.
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Switch the interpolation scheme.
    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    /// The value convention.
    pub fn convention(&self) -> ValueConvention {
        self.convention
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the curve has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The ordered points.
    pub fn points(&self) -> &[(Date, Real)] {
        &self.points
    }

    /// The last pillar date, if any.
    pub fn last_date(&self) -> Option<Date> {
        self.points.last().map(|&(d, _)| d)
    }

    /// Insert a point, keeping dates strictly increasing.
    ///
    /// A duplicate date is an invalid argument: every pillar belongs to
    /// exactly one instrument.
    pub fn add(&mut self, date: Date, value: Real) -> Result<()> {
        match self.points.binary_search_by_key(&date, |&(d, _)| d) {
            Ok(_) => Err(Error::InvalidArgument(format!(
                "curve already has a point at {date}"
            ))),
            Err(pos) => {
                self.points.insert(pos, (date, value));
                Ok(())
            }
        }
    }

    /// Overwrite the value of point `idx`.
    pub fn set_value(&mut self, idx: usize, value: Real) -> Result<()> {
        cc_core::ensure!(
            idx < self.points.len(),
            "point index {idx} out of range for curve of {} points",
            self.points.len()
        );
        self.points[idx].1 = value;
        Ok(())
    }

    /// Value of point `idx`.
    pub fn value(&self, idx: usize) -> Result<Real> {
        self.points
            .get(idx)
            .map(|&(_, v)| v)
            .ok_or_else(|| Error::InvalidArgument(format!("point index {idx} out of range")))
    }

    /// Remove all points.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Truncate the curve to its first `n` points.
    pub fn shrink(&mut self, n: usize) {
        self.points.truncate(n);
    }

    /// Interpolated value at `date`, with flat extrapolation on both ends.
    ///
    /// Errors on an empty curve.
    pub fn interpolate(&self, date: Date) -> Result<Real> {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => {
                return Err(Error::Runtime(
                    "cannot interpolate an empty curve".into(),
                ))
            }
        };
        if date <= first.0 {
            return Ok(first.1);
        }
        if date >= last.0 {
            return Ok(last.1);
        }

        // `date` is strictly inside (first, last): binary search finds the
        // right-hand neighbour.
        let hi = match self.points.binary_search_by_key(&date, |&(d, _)| d) {
            Ok(i) => return Ok(self.points[i].1),
            Err(i) => i,
        };
        let (d0, v0) = self.points[hi - 1];
        let (d1, v1) = self.points[hi];

        match self.interpolation {
            Interpolation::PreviousConstant => Ok(v0),
            Interpolation::Linear => Ok(lerp(d0, v0, d1, v1, date)),
            Interpolation::LogLinear => {
                if v0 > 0.0 && v1 > 0.0 {
                    Ok(lerp(d0, v0.ln(), d1, v1.ln(), date).exp())
                } else {
                    Ok(lerp(d0, v0, d1, v1, date))
                }
            }
        }
    }
}

fn lerp(d0: Date, v0: Real, d1: Date, v1: Real, date: Date) -> Real {
    let w = (date - d0).num_days() as Real / (d1 - d0).num_days() as Real;
    v0 + w * (v1 - v0)
}

// ── Discounting view ─────────────────────────────────────────────────────────

/// Read-only discounting interface over a curve.
pub trait DiscountProvider {
    /// Discount factor at `date` (1 on or before the as-of date).
    fn discount_factor(&self, date: Date) -> Result<DiscountFactor>;

    /// Simple forward rate between `d1` and `d2` implied by discount-factor
    /// ratios.
    fn simple_forward(&self, d1: Date, d2: Date, dc: &dyn DayCounter) -> Result<Rate> {
        cc_core::ensure!(d1 < d2, "forward period [{d1}, {d2}] is empty");
        let df1 = self.discount_factor(d1)?;
        let df2 = self.discount_factor(d2)?;
        let tau = dc.year_fraction(d1, d2);
        Ok((df1 / df2 - 1.0) / tau)
    }
}

impl DiscountProvider for Curve {
    fn discount_factor(&self, date: Date) -> Result<DiscountFactor> {
        if date <= self.as_of {
            return Ok(1.0);
        }
        match self.points.first() {
            None => Err(Error::Runtime(
                "cannot discount off an empty curve".into(),
            )),
            // Before the first pillar the unit anchor at as-of participates.
            Some(&(d0, v0)) if date < d0 => match self.interpolation {
                Interpolation::PreviousConstant => Ok(v0),
                Interpolation::Linear => Ok(lerp(self.as_of, 1.0, d0, v0, date)),
                Interpolation::LogLinear => {
                    if v0 > 0.0 {
                        Ok(lerp(self.as_of, 0.0, d0, v0.ln(), date).exp())
                    } else {
                        Ok(lerp(self.as_of, 1.0, d0, v0, date))
                    }
                }
            },
            Some(_) => self.interpolate(date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use cc_time::{ymd, Actual365Fixed};

    fn sample() -> Curve {
        let mut c = Curve::new(ymd(2026, 1, 2));
        c.add(ymd(2027, 1, 2), 0.97).unwrap();
        c.add(ymd(2028, 1, 2), 0.94).unwrap();
        c.add(ymd(2029, 1, 2), 0.90).unwrap();
        c
    }

    #[test]
    fn points_stay_ordered() {
        let mut c = Curve::new(ymd(2026, 1, 2));
        c.add(ymd(2028, 1, 2), 0.94).unwrap();
        c.add(ymd(2027, 1, 2), 0.97).unwrap();
        let dates: Vec<_> = c.points().iter().map(|&(d, _)| d).collect();
        assert_eq!(dates, vec![ymd(2027, 1, 2), ymd(2028, 1, 2)]);
    }

    #[test]
    fn duplicate_date_rejected() {
        let mut c = sample();
        assert!(c.add(ymd(2027, 1, 2), 0.5).is_err());
    }

    #[test]
    fn interpolation_hits_pillars_exactly() {
        let c = sample();
        assert_abs_diff_eq!(c.interpolate(ymd(2028, 1, 2)).unwrap(), 0.94);
    }

    #[test]
    fn flat_extrapolation() {
        let c = sample();
        assert_abs_diff_eq!(c.interpolate(ymd(2020, 1, 1)).unwrap(), 0.97);
        assert_abs_diff_eq!(c.interpolate(ymd(2040, 1, 1)).unwrap(), 0.90);
    }

    #[test]
    fn log_linear_between_pillars() {
        let c = sample();
        let mid = ymd(2027, 7, 4); // 183 of 365 days into the interval
        let v = c.interpolate(mid).unwrap();
        let w = 183.0 / 365.0;
        let expect = (0.97_f64.ln() + w * (0.94_f64.ln() - 0.97_f64.ln())).exp();
        assert_abs_diff_eq!(v, expect, epsilon = 1e-12);
    }

    #[test]
    fn previous_constant_holds_left_value() {
        let c = sample().with_interpolation(Interpolation::PreviousConstant);
        assert_abs_diff_eq!(c.interpolate(ymd(2027, 8, 1)).unwrap(), 0.97);
    }

    #[test]
    fn shrink_truncates() {
        let mut c = sample();
        c.shrink(1);
        assert_eq!(c.len(), 1);
        assert_abs_diff_eq!(c.interpolate(ymd(2030, 1, 1)).unwrap(), 0.97);
    }

    #[test]
    fn discount_factor_unit_at_as_of() {
        let c = sample();
        assert_abs_diff_eq!(c.discount_factor(ymd(2026, 1, 2)).unwrap(), 1.0);
        assert_abs_diff_eq!(c.discount_factor(ymd(2025, 6, 1)).unwrap(), 1.0);
    }

    #[test]
    fn discount_factor_blends_to_first_pillar() {
        let c = sample();
        let df = c.discount_factor(ymd(2026, 7, 2)).unwrap();
        assert!(df < 1.0 && df > 0.97, "df = {df}");
    }

    #[test]
    fn simple_forward_positive_for_decreasing_dfs() {
        let c = sample();
        let f = c
            .simple_forward(ymd(2027, 1, 2), ymd(2028, 1, 2), &Actual365Fixed)
            .unwrap();
        assert!(f > 0.0, "forward = {f}");
        // df ratio 0.97/0.94 over one Act/365 year
        assert_abs_diff_eq!(f, (0.97 / 0.94 - 1.0) / (365.0 / 365.0), epsilon = 1e-12);
    }

    #[test]
    fn empty_curve_errors() {
        let c = Curve::new(ymd(2026, 1, 2));
        assert!(c.interpolate(ymd(2027, 1, 1)).is_err());
        assert!(c.discount_factor(ymd(2027, 1, 1)).is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn insertion_order_never_matters(
                mut offsets in proptest::collection::vec(1i64..3000, 1..12),
                values in proptest::collection::vec(0.01f64..2.0, 12),
            ) {
                offsets.sort_unstable();
                offsets.dedup();
                let as_of = ymd(2026, 1, 2);
                let pairs: Vec<(Date, Real)> = offsets
                    .iter()
                    .zip(values.iter())
                    .map(|(&o, &v)| (as_of + chrono::Days::new(o as u64), v))
                    .collect();

                let mut forward = Curve::new(as_of);
                for &(d, v) in &pairs {
                    forward.add(d, v).unwrap();
                }
                let mut backward = Curve::new(as_of);
                for &(d, v) in pairs.iter().rev() {
                    backward.add(d, v).unwrap();
                }
                prop_assert_eq!(forward.points(), backward.points());

                // Interpolation stays within the envelope of the values.
                let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
                let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                for probe in [1u64, 500, 1500, 3500] {
                    let v = forward.interpolate(as_of + chrono::Days::new(probe)).unwrap();
                    prop_assert!(v >= lo - 1e-12 && v <= hi + 1e-12, "{v} outside [{lo}, {hi}]");
                }
            }
        }
    }
}
