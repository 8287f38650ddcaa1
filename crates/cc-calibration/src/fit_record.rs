//! Per-fit instrument records.
//!
//! A [`FitRecord`] is the immutable tuple the fitter actually prices: the
//! tenor's target and weight, the resolved payment legs, and a snapshot of
//! the discount curve taken when the record was built.  Records are rebuilt
//! fresh for every fit, so a parent curve refitted in between is picked up
//! automatically.

use cc_core::{errors::Result, Real};
use cc_cashflows::Leg;
use cc_curves::{Curve, DiscountProvider};
use cc_time::{Date, DayCounter};
use std::sync::Arc;

/// One side of an instrument, split into the accrued (mid-period) flows
/// that need special treatment and the regular future flows.
#[derive(Debug, Clone, Default)]
pub struct RecordLegs {
    /// Flows already part-way through their accrual period.
    pub accrued: Leg,
    /// Regular future flows.
    pub regular: Leg,
}

impl RecordLegs {
    /// Present value of both pieces.
    pub fn npv(&self, projection: &Curve, discount: &Curve, dc: &dyn DayCounter) -> Result<Real> {
        Ok(self.accrued.npv(projection, discount, dc)? + self.regular.npv(projection, discount, dc)?)
    }

    /// Whether both pieces are empty.
    pub fn is_empty(&self) -> bool {
        self.accrued.is_empty() && self.regular.is_empty()
    }
}

/// An immutable per-tenor fit tuple, built fresh each fit.
#[derive(Debug, Clone)]
pub struct FitRecord {
    /// Target full price.
    pub target: Real,
    /// Fitting weight (strictly positive; zero-weight tenors are excluded
    /// before records are built).
    pub weight: Real,
    /// Settlement date of the resolved instrument.
    pub settlement: Date,
    /// The curve date keying the solved point.
    pub curve_date: Date,
    /// Snapshot of the discounting curve; `None` means the curve being
    /// fitted discounts its own flows.
    pub discount: Option<Arc<Curve>>,
    /// Receiver-side legs.
    pub receive: RecordLegs,
    /// Payer-side legs.
    pub pay: RecordLegs,
}

impl FitRecord {
    /// Two records overlap when their curve dates coincide; this equality
    /// is what makes a system ambiguous for sequential bootstrap.
    pub fn overlaps(&self, other: &FitRecord) -> bool {
        self.curve_date == other.curve_date
    }

    /// Model price of the instrument against the curve being fitted.
    pub fn present_value(&self, curve: &Curve, dc: &dyn DayCounter) -> Result<Real> {
        let discount: &Curve = self.discount.as_deref().unwrap_or(curve);
        Ok(self.receive.npv(curve, discount, dc)? - self.pay.npv(curve, discount, dc)?)
    }

    /// Pricing error `target - pv`.
    pub fn pricing_error(&self, curve: &Curve, dc: &dyn DayCounter) -> Result<Real> {
        Ok(self.target - self.present_value(curve, dc)?)
    }
}
