//! Individual cashflows.

use cc_core::{errors::Result, Rate, Real};
use cc_curves::DiscountProvider;
use cc_time::{Date, DayCounter};

/// A single payment.
///
/// Floating amounts are projected off the curve being calibrated; the
/// `Accrued` variant carries the mid-period split of a coupon whose accrual
/// started before the as-of date.
#[derive(Debug, Clone, PartialEq)]
pub enum Cashflow {
    /// A known amount paid on a date.
    Fixed {
        /// Payment date.
        payment_date: Date,
        /// Amount paid.
        amount: Real,
    },
    /// A simple-forward coupon projected off the curve.
    Floating {
        /// Payment date.
        payment_date: Date,
        /// Accrual period start.
        accrual_start: Date,
        /// Accrual period end.
        accrual_end: Date,
        /// Accrual year fraction.
        accrual_fraction: Real,
        /// Notional amount.
        notional: Real,
        /// Additive spread over the projected forward.
        spread: Rate,
    },
    /// A coupon already part-way through its accrual period: the elapsed
    /// portion accrues at the known fixed rate, the remainder at the
    /// forward projected from the reset date.
    Accrued {
        /// Payment date.
        payment_date: Date,
        /// Rate fixed at the last reset.
        fixed_rate: Rate,
        /// Year fraction already accrued at `fixed_rate`.
        elapsed_fraction: Real,
        /// Start of the remaining (unfixed) sub-period.
        reset_date: Date,
        /// Accrual period end.
        accrual_end: Date,
        /// Year fraction remaining after `reset_date`.
        remaining_fraction: Real,
        /// Notional amount.
        notional: Real,
    },
}

impl Cashflow {
    /// The payment date.
    pub fn payment_date(&self) -> Date {
        match *self {
            Cashflow::Fixed { payment_date, .. }
            | Cashflow::Floating { payment_date, .. }
            | Cashflow::Accrued { payment_date, .. } => payment_date,
        }
    }

    /// The undiscounted amount, projecting floating pieces off `projection`.
    pub fn amount<P>(&self, projection: &P, dc: &dyn DayCounter) -> Result<Real>
    where
        P: DiscountProvider + ?Sized,
    {
        match *self {
            Cashflow::Fixed { amount, .. } => Ok(amount),
            Cashflow::Floating {
                accrual_start,
                accrual_end,
                accrual_fraction,
                notional,
                spread,
                ..
            } => {
                let fwd = projection.simple_forward(accrual_start, accrual_end, dc)?;
                Ok(notional * accrual_fraction * (fwd + spread))
            }
            Cashflow::Accrued {
                fixed_rate,
                elapsed_fraction,
                reset_date,
                accrual_end,
                remaining_fraction,
                notional,
                ..
            } => {
                let fwd = projection.simple_forward(reset_date, accrual_end, dc)?;
                Ok(notional * (fixed_rate * elapsed_fraction + fwd * remaining_fraction))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use cc_curves::Curve;
    use cc_time::{ymd, Actual365Fixed};

    fn flat_5pct() -> Curve {
        // df(t) ≈ 1/(1+5%·t) at yearly pillars, so one-year simple forwards
        // come out near 5 %.
        let mut c = Curve::new(ymd(2026, 1, 2));
        c.add(ymd(2027, 1, 2), 1.0 / 1.05).unwrap();
        c.add(ymd(2028, 1, 2), 1.0 / (1.05 * 1.05)).unwrap();
        c
    }

    #[test]
    fn fixed_amount_passthrough() {
        let cf = Cashflow::Fixed {
            payment_date: ymd(2027, 1, 2),
            amount: 100.0,
        };
        let v = cf.amount(&flat_5pct(), &Actual365Fixed).unwrap();
        assert_abs_diff_eq!(v, 100.0);
    }

    #[test]
    fn floating_amount_uses_curve_forward() {
        let cf = Cashflow::Floating {
            payment_date: ymd(2028, 1, 2),
            accrual_start: ymd(2027, 1, 2),
            accrual_end: ymd(2028, 1, 2),
            accrual_fraction: 1.0,
            notional: 100.0,
            spread: 0.0,
        };
        let v = cf.amount(&flat_5pct(), &Actual365Fixed).unwrap();
        assert_abs_diff_eq!(v, 5.0, epsilon = 1e-10);
    }

    #[test]
    fn accrued_amount_blends_fixed_and_forward() {
        let cf = Cashflow::Accrued {
            payment_date: ymd(2027, 1, 2),
            fixed_rate: 0.04,
            elapsed_fraction: 0.5,
            reset_date: ymd(2027, 1, 2),
            accrual_end: ymd(2028, 1, 2),
            remaining_fraction: 1.0,
            notional: 100.0,
        };
        let v = cf.amount(&flat_5pct(), &Actual365Fixed).unwrap();
        // 100·(0.04·0.5 + fwd·1.0) with fwd ≈ 5 %
        assert_abs_diff_eq!(v, 2.0 + 5.0, epsilon = 1e-9);
    }
}
