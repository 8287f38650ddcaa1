//! The calibration protocol.
//!
//! A [`Calibrator`] owns the per-instrument-family knowledge: how a tenor
//! becomes a priceable [`FitRecord`], which parent curves it reads, and how
//! a resolved segment is handed to the numerical fitter.  The free
//! functions [`fit`] and [`refit`] drive the protocol around it; they are
//! the only code that mutates a [`CalibratedCurve`] during a fit.

use crate::chain::{find_chain_any, BasisInstrument, LegIndex};
use crate::fit_record::{FitRecord, RecordLegs};
use crate::fitter::{CashflowFitter, FitMethod, FitOptions, FitReport};
use cc_core::{
    errors::{Error, Result},
    Real, Size,
};
use cc_curves::{CalibratedCurve, Curve, CurveId, CurveRegistry, CurveTenor};
use cc_time::{Date, DayCounter};
use log::debug;
use std::sync::Arc;
use std::time::Instant;

/// Everything a calibrator may read while resolving and fitting: the
/// registry (for parent curves), the pricing date, and the day counter.
/// The curve being fitted is never inside the registry during a fit, so
/// reads through the context cannot alias it.
pub struct FitContext<'a> {
    /// Curve registry, for parent lookups.
    pub registry: &'a CurveRegistry,
    /// The valuation date of this fit.
    pub pricing_date: Date,
    /// Day counter used for accrual and discounting time.
    pub day_counter: &'a dyn DayCounter,
}

impl<'a> FitContext<'a> {
    /// Bundle the fit inputs.
    pub fn new(
        registry: &'a CurveRegistry,
        pricing_date: Date,
        day_counter: &'a dyn DayCounter,
    ) -> Self {
        Self {
            registry,
            pricing_date,
            day_counter,
        }
    }
}

/// Per-instrument-family calibration knowledge.
pub trait Calibrator {
    /// Turn a tenor into a priceable record, snapshotting any parent
    /// curves it reads.
    fn resolve_tenor(&self, tenor: &CurveTenor, ctx: &FitContext<'_>) -> Result<FitRecord>;

    /// Hook run after resolution, before the numerical fit.
    fn pre_process(&self, _curve: &mut CalibratedCurve, _ctx: &FitContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Hook run after a successful numerical fit.
    fn post_process(&self, _curve: &mut CalibratedCurve, _ctx: &FitContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Fit records `[from..]` into the curve.
    fn fit_segment(
        &self,
        curve: &mut CalibratedCurve,
        records: Vec<FitRecord>,
        from: Size,
        ctx: &FitContext<'_>,
    ) -> Result<FitReport>;

    /// A pricer consistent with how this calibrator resolves instruments.
    fn pricer(&self) -> Result<Box<dyn Pricer>> {
        Err(Error::MissingPricer(
            "this calibrator does not expose a pricer".into(),
        ))
    }

    /// Ids of the curves this calibrator reads while resolving.
    fn parent_curves(&self) -> Vec<CurveId> {
        Vec::new()
    }
}

/// Prices an instrument off an already-calibrated curve, using the same
/// resolution path the fit used.
pub trait Pricer {
    /// Model price of `instrument` against `curve`.
    fn price(&self, instrument: &str, curve: &Curve, ctx: &FitContext<'_>) -> Result<Real>;
}

/// Resolves an instrument identifier into dated payment legs.
pub trait ScheduleSource: Send + Sync {
    /// Payment legs of `instrument` as seen from `as_of`.
    fn resolve(&self, instrument: &str, as_of: Date) -> Result<ResolvedInstrument>;
}

/// The dated output of schedule resolution.
#[derive(Debug, Clone)]
pub struct ResolvedInstrument {
    /// Settlement date.
    pub settlement: Date,
    /// Receiver-side legs.
    pub receive: RecordLegs,
    /// Payer-side legs.
    pub pay: RecordLegs,
}

// ── The fit protocol ─────────────────────────────────────────────────────────

/// Full fit: clear the curve and solve every active tenor.
///
/// The curve's default date is carried across the fit, and model prices
/// are written back onto the tenors afterwards.
pub fn fit(
    calibrator: &dyn Calibrator,
    curve: &mut CalibratedCurve,
    ctx: &FitContext<'_>,
) -> Result<FitReport> {
    let started = Instant::now();
    let default_date = curve.default_date();
    curve.curve_mut().clear();

    let records = resolve_active(calibrator, curve, ctx)?;
    calibrator.pre_process(curve, ctx)?;
    let report = calibrator.fit_segment(curve, records, 0, ctx)?;
    calibrator.post_process(curve, ctx)?;

    write_model_prices(curve, &report);
    curve.set_default_date(default_date);
    curve.set_last_fit(started.elapsed());
    Ok(report)
}

/// Incremental fit: keep points `[0, from)` and re-solve the rest.
///
/// Only valid while the curve carries exactly one point per active tenor;
/// a curve that has drifted from that shape needs a full [`fit`].
pub fn refit(
    calibrator: &dyn Calibrator,
    curve: &mut CalibratedCurve,
    ctx: &FitContext<'_>,
    from: Size,
) -> Result<FitReport> {
    cc_core::ensure!(
        curve.supports_incremental_fit(),
        "curve '{}' has {} points for {} active tenors; full fit required",
        curve.name(),
        curve.curve().len(),
        curve.active_tenor_count()
    );
    let started = Instant::now();

    let records = resolve_active(calibrator, curve, ctx)?;
    cc_core::ensure!(
        from <= records.len(),
        "refit start {from} beyond {} records",
        records.len()
    );
    calibrator.pre_process(curve, ctx)?;
    let report = calibrator.fit_segment(curve, records, from, ctx)?;
    calibrator.post_process(curve, ctx)?;

    write_model_prices(curve, &report);
    curve.set_last_fit(started.elapsed());
    Ok(report)
}

fn resolve_active(
    calibrator: &dyn Calibrator,
    curve: &CalibratedCurve,
    ctx: &FitContext<'_>,
) -> Result<Vec<FitRecord>> {
    let mut records = Vec::with_capacity(curve.active_tenor_count());
    for tenor in curve.tenors().iter().filter(|t| t.is_active()) {
        records.push(calibrator.resolve_tenor(tenor, ctx)?);
    }
    cc_core::ensure!(
        !records.is_empty(),
        "curve '{}' has no active tenors",
        curve.name()
    );
    Ok(records)
}

/// Report errors are ordered like the active tenors, so the model price of
/// tenor `i` is `target_i - error_i`.
fn write_model_prices(curve: &mut CalibratedCurve, report: &FitReport) {
    let mut errors = report.errors.iter();
    for tenor in curve.tenors_mut().iter_mut().filter(|t| t.is_active()) {
        if let Some(&e) = errors.next() {
            let model = tenor.target() - e;
            tenor.set_model_price(model);
        }
    }
}

// ── Cashflow calibrator ──────────────────────────────────────────────────────

/// The standard calibrator: tenors resolve through a [`ScheduleSource`]
/// and fit with a [`CashflowFitter`], optionally discounting on a parent
/// curve snapshot.
pub struct CashflowCalibrator {
    method: FitMethod,
    options: FitOptions,
    schedules: Arc<dyn ScheduleSource>,
    discount: Option<CurveId>,
    parents: Vec<CurveId>,
}

impl CashflowCalibrator {
    /// A self-discounting calibrator.
    pub fn new(method: FitMethod, options: FitOptions, schedules: Arc<dyn ScheduleSource>) -> Self {
        Self {
            method,
            options,
            schedules,
            discount: None,
            parents: Vec::new(),
        }
    }

    /// Discount on the named curve instead of the curve being fitted.
    pub fn with_discount(mut self, id: CurveId) -> Self {
        self.discount = Some(id);
        if !self.parents.contains(&id) {
            self.parents.push(id);
        }
        self
    }

    /// Declare a projection parent read during resolution.
    pub fn with_parent(mut self, id: CurveId) -> Self {
        if !self.parents.contains(&id) {
            self.parents.push(id);
        }
        self
    }

    fn discount_snapshot(&self, ctx: &FitContext<'_>) -> Result<Option<Arc<Curve>>> {
        match self.discount {
            Some(id) => Ok(Some(Arc::new(ctx.registry.get(id)?.curve().clone()))),
            None => Ok(None),
        }
    }
}

impl Calibrator for CashflowCalibrator {
    fn resolve_tenor(&self, tenor: &CurveTenor, ctx: &FitContext<'_>) -> Result<FitRecord> {
        let resolved = self.schedules.resolve(tenor.instrument(), ctx.pricing_date)?;
        Ok(FitRecord {
            target: tenor.target(),
            weight: tenor.weight(),
            settlement: resolved.settlement,
            curve_date: tenor.curve_date(),
            discount: self.discount_snapshot(ctx)?,
            receive: resolved.receive,
            pay: resolved.pay,
        })
    }

    fn fit_segment(
        &self,
        curve: &mut CalibratedCurve,
        records: Vec<FitRecord>,
        from: Size,
        ctx: &FitContext<'_>,
    ) -> Result<FitReport> {
        let fitter = CashflowFitter::new(records, self.options.clone())?;
        fitter.fit(curve.curve_mut(), &self.method, ctx.day_counter, from)
    }

    fn pricer(&self) -> Result<Box<dyn Pricer>> {
        Ok(Box::new(CashflowPricer {
            schedules: self.schedules.clone(),
            discount: self.discount,
        }))
    }

    fn parent_curves(&self) -> Vec<CurveId> {
        self.parents.clone()
    }
}

/// Pricer counterpart of [`CashflowCalibrator`]: same schedules, same
/// discounting rule, but reads the live parent curve instead of a
/// snapshot.
struct CashflowPricer {
    schedules: Arc<dyn ScheduleSource>,
    discount: Option<CurveId>,
}

impl Pricer for CashflowPricer {
    fn price(&self, instrument: &str, curve: &Curve, ctx: &FitContext<'_>) -> Result<Real> {
        let resolved = self.schedules.resolve(instrument, ctx.pricing_date)?;
        let parent;
        let discount: &Curve = match self.discount {
            Some(id) => {
                parent = ctx.registry.get(id)?.curve();
                parent
            }
            None => curve,
        };
        let receive = resolved.receive.npv(curve, discount, ctx.day_counter)?;
        let pay = resolved.pay.npv(curve, discount, ctx.day_counter)?;
        Ok(receive - pay)
    }
}

// ── Basis calibrator ─────────────────────────────────────────────────────────

/// Calibrator for an index with no directly quoted instruments: when a
/// tenor cannot be resolved as quoted, a chain of basis quotes linking the
/// target index to a known one is discovered and the composite instrument
/// `"<instrument>|<link>+<link>+..."` is resolved instead.  The schedule
/// source is expected to understand that composite form.
pub struct BasisCalibrator {
    inner: CashflowCalibrator,
    pool: Vec<BasisInstrument>,
    target: LegIndex,
    known: Vec<LegIndex>,
}

impl BasisCalibrator {
    /// Wrap `inner` with a basis pool and the index it calibrates.
    pub fn new(
        inner: CashflowCalibrator,
        pool: Vec<BasisInstrument>,
        target: LegIndex,
        known: Vec<LegIndex>,
    ) -> Self {
        Self {
            inner,
            pool,
            target,
            known,
        }
    }

    /// Joined ids of a chain linking the target index to a known one.
    fn chain_ids(&self) -> Result<String> {
        let mut pool = self.pool.clone();
        let (len, terminal) = find_chain_any(&mut pool, &self.target, &self.known)
            .ok_or_else(|| {
                Error::Runtime(format!(
                    "no basis chain links {} to any known index",
                    self.target
                ))
            })?;
        debug!("basis chain for {}: {} links, terminal {terminal}", self.target, len);
        Ok(pool[..len]
            .iter()
            .map(|i| i.id.as_str())
            .collect::<Vec<_>>()
            .join("+"))
    }
}

impl Calibrator for BasisCalibrator {
    fn resolve_tenor(&self, tenor: &CurveTenor, ctx: &FitContext<'_>) -> Result<FitRecord> {
        match self.inner.resolve_tenor(tenor, ctx) {
            Ok(record) => Ok(record),
            Err(direct_err) => {
                let composite = format!("{}|{}", tenor.instrument(), self.chain_ids()?);
                debug!(
                    "direct quote for '{}' unavailable ({direct_err}); trying '{composite}'",
                    tenor.instrument()
                );
                let resolved = self.inner.schedules.resolve(&composite, ctx.pricing_date)?;
                Ok(FitRecord {
                    target: tenor.target(),
                    weight: tenor.weight(),
                    settlement: resolved.settlement,
                    curve_date: tenor.curve_date(),
                    discount: self.inner.discount_snapshot(ctx)?,
                    receive: resolved.receive,
                    pay: resolved.pay,
                })
            }
        }
    }

    fn fit_segment(
        &self,
        curve: &mut CalibratedCurve,
        records: Vec<FitRecord>,
        from: Size,
        ctx: &FitContext<'_>,
    ) -> Result<FitReport> {
        self.inner.fit_segment(curve, records, from, ctx)
    }

    fn pricer(&self) -> Result<Box<dyn Pricer>> {
        self.inner.pricer()
    }

    fn parent_curves(&self) -> Vec<CurveId> {
        self.inner.parent_curves()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitter::FitStatus;
    use approx::assert_abs_diff_eq;
    use cc_cashflows::{Cashflow, Leg};
    use cc_time::{ymd, Actual365Fixed};
    use std::collections::BTreeMap;

    /// Maps instrument names to a single unit fixed cashflow on a date.
    struct StubSchedules {
        payments: BTreeMap<String, Date>,
    }

    impl StubSchedules {
        fn new(payments: &[(&str, Date)]) -> Arc<Self> {
            Arc::new(Self {
                payments: payments
                    .iter()
                    .map(|&(k, d)| (k.to_string(), d))
                    .collect(),
            })
        }
    }

    impl ScheduleSource for StubSchedules {
        fn resolve(&self, instrument: &str, as_of: Date) -> Result<ResolvedInstrument> {
            let date = self.payments.get(instrument).ok_or_else(|| {
                Error::InvalidArgument(format!("unknown instrument '{instrument}'"))
            })?;
            Ok(ResolvedInstrument {
                settlement: as_of,
                receive: RecordLegs {
                    accrued: Leg::default(),
                    regular: Leg::new(vec![Cashflow::Fixed {
                        payment_date: *date,
                        amount: 1.0,
                    }]),
                },
                pay: RecordLegs::default(),
            })
        }
    }

    fn tenor(instrument: &str, target: Real, date: Date) -> CurveTenor {
        CurveTenor::new(instrument, target, 1.0, date).unwrap()
    }

    fn three_tenor_curve() -> CalibratedCurve {
        let mut curve = CalibratedCurve::new("ois", Curve::new(ymd(2026, 1, 2)));
        curve.add_tenor(tenor("1y", 0.99, ymd(2027, 1, 2)));
        curve.add_tenor(tenor("2y", 0.97, ymd(2028, 1, 2)));
        curve.add_tenor(tenor("3y", 0.94, ymd(2029, 1, 2)));
        curve
    }

    fn schedules() -> Arc<StubSchedules> {
        StubSchedules::new(&[
            ("1y", ymd(2027, 1, 2)),
            ("2y", ymd(2028, 1, 2)),
            ("3y", ymd(2029, 1, 2)),
        ])
    }

    fn bootstrap_calibrator(schedules: Arc<StubSchedules>) -> CashflowCalibrator {
        CashflowCalibrator::new(FitMethod::Bootstrap, FitOptions::default(), schedules)
    }

    #[test]
    fn full_fit_solves_and_writes_model_prices() {
        let registry = CurveRegistry::new();
        let ctx = FitContext::new(&registry, ymd(2026, 1, 2), &Actual365Fixed);
        let calibrator = bootstrap_calibrator(schedules());
        let mut curve = three_tenor_curve();
        curve.set_default_date(Some(ymd(2026, 6, 30)));

        let report = fit(&calibrator, &mut curve, &ctx).unwrap();
        assert_eq!(report.status, FitStatus::Converged);
        assert_eq!(curve.curve().len(), 3);
        assert_abs_diff_eq!(curve.curve().value(0).unwrap(), 0.99, epsilon = 1e-10);

        // Model prices land back on the tenors; bookkeeping survives.
        for t in curve.tenors() {
            let model = t.model_price().unwrap();
            assert_abs_diff_eq!(model, t.target(), epsilon = 1e-9);
        }
        assert_eq!(curve.default_date(), Some(ymd(2026, 6, 30)));
        assert!(curve.last_fit().is_some());
    }

    #[test]
    fn zero_weight_tenors_are_excluded() {
        let registry = CurveRegistry::new();
        let ctx = FitContext::new(&registry, ymd(2026, 1, 2), &Actual365Fixed);
        let calibrator = bootstrap_calibrator(schedules());
        let mut curve = three_tenor_curve();
        curve.add_tenor(CurveTenor::new("2y", 0.5, 0.0, ymd(2028, 1, 2)).unwrap());

        // The zero-weight duplicate is skipped, so bootstrap sees no
        // overlap and three points come out.
        let report = fit(&calibrator, &mut curve, &ctx).unwrap();
        assert_eq!(report.status, FitStatus::Converged);
        assert_eq!(curve.curve().len(), 3);
    }

    #[test]
    fn refit_requires_point_per_active_tenor() {
        let registry = CurveRegistry::new();
        let ctx = FitContext::new(&registry, ymd(2026, 1, 2), &Actual365Fixed);
        let calibrator = bootstrap_calibrator(schedules());
        let mut curve = three_tenor_curve();

        let err = refit(&calibrator, &mut curve, &ctx, 0).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)), "got {err:?}");

        fit(&calibrator, &mut curve, &ctx).unwrap();
        curve.curve_mut().set_value(2, 0.5).unwrap();
        let report = refit(&calibrator, &mut curve, &ctx, 2).unwrap();
        assert_eq!(report.status, FitStatus::Converged);
        assert_abs_diff_eq!(curve.curve().value(2).unwrap(), 0.94, epsilon = 1e-10);
    }

    #[test]
    fn discount_parent_is_snapshotted() {
        let mut registry = CurveRegistry::new();
        let mut parent = CalibratedCurve::new("disc", Curve::new(ymd(2026, 1, 2)));
        parent.curve_mut().add(ymd(2027, 1, 2), 0.9).unwrap();
        let parent_id = registry.insert(parent);

        let schedules = StubSchedules::new(&[("1y", ymd(2027, 1, 2))]);
        let calibrator = bootstrap_calibrator(schedules).with_discount(parent_id);
        assert_eq!(calibrator.parent_curves(), vec![parent_id]);

        let ctx = FitContext::new(&registry, ymd(2026, 1, 2), &Actual365Fixed);
        let mut curve = CalibratedCurve::new("proj", Curve::new(ymd(2026, 1, 2)));
        // A fixed flow prices entirely off the discount snapshot, so no
        // solved value can move the pv to 0.99: pv is pinned at 0.90.
        curve.add_tenor(tenor("1y", 0.9, ymd(2027, 1, 2)));
        let report = fit(&calibrator, &mut curve, &ctx).unwrap();
        assert_eq!(report.status, FitStatus::Converged);
    }

    #[test]
    fn pricer_reprices_the_calibration_instruments() {
        let registry = CurveRegistry::new();
        let ctx = FitContext::new(&registry, ymd(2026, 1, 2), &Actual365Fixed);
        let calibrator = bootstrap_calibrator(schedules());
        let mut curve = three_tenor_curve();
        fit(&calibrator, &mut curve, &ctx).unwrap();

        let pricer = calibrator.pricer().unwrap();
        let px = pricer.price("2y", curve.curve(), &ctx).unwrap();
        assert_abs_diff_eq!(px, 0.97, epsilon = 1e-9);
    }

    #[test]
    fn default_pricer_is_missing() {
        struct Opaque;
        impl Calibrator for Opaque {
            fn resolve_tenor(&self, _: &CurveTenor, _: &FitContext<'_>) -> Result<FitRecord> {
                unimplemented!()
            }
            fn fit_segment(
                &self,
                _: &mut CalibratedCurve,
                _: Vec<FitRecord>,
                _: Size,
                _: &FitContext<'_>,
            ) -> Result<FitReport> {
                unimplemented!()
            }
        }
        assert!(matches!(
            Opaque.pricer().err().unwrap(),
            Error::MissingPricer(_)
        ));
    }

    #[test]
    fn basis_calibrator_falls_back_to_composite_quotes() {
        // "1y" is not quoted for index A; only the composite via the
        // A-B and B-C basis quotes resolves.
        let schedules = StubSchedules::new(&[("1y|a-vs-b+b-vs-c", ymd(2027, 1, 2))]);
        let inner = bootstrap_calibrator(schedules);
        let pool = vec![
            BasisInstrument::new("b-vs-c", LegIndex::index("B"), LegIndex::index("C")),
            BasisInstrument::new("a-vs-b", LegIndex::index("A"), LegIndex::index("B")),
        ];
        let calibrator = BasisCalibrator::new(
            inner,
            pool,
            LegIndex::index("A"),
            vec![LegIndex::index("C")],
        );

        let registry = CurveRegistry::new();
        let ctx = FitContext::new(&registry, ymd(2026, 1, 2), &Actual365Fixed);
        let mut curve = CalibratedCurve::new("a-index", Curve::new(ymd(2026, 1, 2)));
        curve.add_tenor(tenor("1y", 0.99, ymd(2027, 1, 2)));

        let report = fit(&calibrator, &mut curve, &ctx).unwrap();
        assert_eq!(report.status, FitStatus::Converged);
        assert_abs_diff_eq!(curve.curve().value(0).unwrap(), 0.99, epsilon = 1e-10);
    }

    #[test]
    fn basis_calibrator_errors_without_a_chain() {
        let schedules = StubSchedules::new(&[]);
        let inner = bootstrap_calibrator(schedules);
        let calibrator = BasisCalibrator::new(
            inner,
            vec![],
            LegIndex::index("A"),
            vec![LegIndex::index("C")],
        );
        let registry = CurveRegistry::new();
        let ctx = FitContext::new(&registry, ymd(2026, 1, 2), &Actual365Fixed);
        let t = tenor("1y", 0.99, ymd(2027, 1, 2));
        assert!(calibrator.resolve_tenor(&t, &ctx).is_err());
    }
}
