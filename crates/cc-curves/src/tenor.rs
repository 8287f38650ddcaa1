//! Calibration instrument records.

use cc_core::{errors::Result, Real};
use cc_time::Date;

/// One calibration instrument attached to a curve: a product reference, a
/// target full price, a weight, and the curve date keying the solved point.
///
/// The fitter writes `model_price` each time it revalues the instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveTenor {
    instrument: String,
    target: Real,
    weight: Real,
    curve_date: Date,
    model_price: Option<Real>,
}

impl CurveTenor {
    /// Create a tenor.  The weight must be non-negative; a zero weight
    /// excludes the tenor from fitting without removing it from the curve.
    pub fn new(instrument: impl Into<String>, target: Real, weight: Real, curve_date: Date) -> Result<Self> {
        cc_core::ensure!(weight >= 0.0, "tenor weight must be >= 0, got {weight}");
        Ok(Self {
            instrument: instrument.into(),
            target,
            weight,
            curve_date,
            model_price: None,
        })
    }

    /// The product / payment-schedule reference.
    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// Target full price.
    pub fn target(&self) -> Real {
        self.target
    }

    /// Fitting weight.
    pub fn weight(&self) -> Real {
        self.weight
    }

    /// The curve date (x-axis key of the solved point).
    pub fn curve_date(&self) -> Date {
        self.curve_date
    }

    /// Whether this tenor participates in fitting.
    pub fn is_active(&self) -> bool {
        self.weight > 0.0
    }

    /// Two tenors overlap when their curve dates coincide.
    pub fn overlaps(&self, other: &CurveTenor) -> bool {
        self.curve_date == other.curve_date
    }

    /// Model price from the most recent revaluation, if any.
    pub fn model_price(&self) -> Option<Real> {
        self.model_price
    }

    /// Record the model price after a revaluation.
    pub fn set_model_price(&mut self, price: Real) {
        self.model_price = Some(price);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_time::ymd;

    #[test]
    fn negative_weight_rejected() {
        assert!(CurveTenor::new("swap-2y", 0.97, -1.0, ymd(2028, 1, 2)).is_err());
    }

    #[test]
    fn zero_weight_is_inactive() {
        let t = CurveTenor::new("swap-2y", 0.97, 0.0, ymd(2028, 1, 2)).unwrap();
        assert!(!t.is_active());
    }

    #[test]
    fn overlap_is_curve_date_equality() {
        let a = CurveTenor::new("a", 0.99, 1.0, ymd(2027, 1, 2)).unwrap();
        let b = CurveTenor::new("b", 0.98, 1.0, ymd(2027, 1, 2)).unwrap();
        let c = CurveTenor::new("c", 0.97, 1.0, ymd(2028, 1, 2)).unwrap();
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }
}
