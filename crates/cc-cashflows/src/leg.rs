//! Payment legs and present-value evaluation.

use crate::cashflow::Cashflow;
use cc_core::{errors::Result, Real};
use cc_curves::DiscountProvider;
use cc_time::DayCounter;
use rayon::prelude::*;

/// Legs shorter than this are always summed sequentially; the parallel
/// path only pays off for expensive averaging legs.
const PARALLEL_THRESHOLD: usize = 16;

/// An ordered list of cashflows on one side of an instrument.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Leg {
    cashflows: Vec<Cashflow>,
    parallel: bool,
}

impl Leg {
    /// A leg over the given cashflows.
    pub fn new(cashflows: Vec<Cashflow>) -> Self {
        Self {
            cashflows,
            parallel: false,
        }
    }

    /// Mark the leg as carrying an expensive averaging computation whose
    /// per-payment amounts may be evaluated on parallel workers.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The cashflows.
    pub fn cashflows(&self) -> &[Cashflow] {
        &self.cashflows
    }

    /// Whether the leg is empty.
    pub fn is_empty(&self) -> bool {
        self.cashflows.is_empty()
    }

    /// Present value: each amount projected off `projection`, discounted on
    /// `discount`.
    ///
    /// The parallel path computes per-cashflow values into an indexed
    /// buffer and sums sequentially, so the reduction order — and therefore
    /// the result — is identical for any worker count.
    pub fn npv<P, D>(&self, projection: &P, discount: &D, dc: &dyn DayCounter) -> Result<Real>
    where
        P: DiscountProvider + Sync + ?Sized,
        D: DiscountProvider + Sync + ?Sized,
    {
        if self.parallel && self.cashflows.len() >= PARALLEL_THRESHOLD {
            let values: Vec<Result<Real>> = self
                .cashflows
                .par_iter()
                .map(|cf| {
                    let amount = cf.amount(projection, dc)?;
                    let df = discount.discount_factor(cf.payment_date())?;
                    Ok(amount * df)
                })
                .collect();
            let mut total = 0.0;
            for v in values {
                total += v?;
            }
            Ok(total)
        } else {
            let mut total = 0.0;
            for cf in &self.cashflows {
                let amount = cf.amount(projection, dc)?;
                let df = discount.discount_factor(cf.payment_date())?;
                total += amount * df;
            }
            Ok(total)
        }
    }
}
