//! A calibration universe: the curve registry plus one calibrator per
//! curve, driven from a single pricing date.
//!
//! Fitting takes the curve out of the registry for the duration of the
//! fit, so the calibrator reads parent curves through the registry while
//! holding the fitted curve mutably; the curve goes back under its id on
//! every exit path.

use crate::calibrator::{self, Calibrator, FitContext, Pricer};
use crate::dependency::DependencyScope;
use crate::fitter::FitReport;
use cc_core::{errors::Result, Size};
use cc_curves::{CalibratedCurve, CurveId, CurveRegistry};
use cc_time::{Date, DayCounter};
use std::collections::BTreeMap;

/// Owns the curves of one calibration universe together with their
/// calibrators.  All orchestration is single-threaded; only leg summation
/// inside the fitter fans out.
pub struct CurveSystem {
    registry: CurveRegistry,
    calibrators: BTreeMap<CurveId, Box<dyn Calibrator>>,
    pricing_date: Date,
    day_counter: Box<dyn DayCounter>,
}

impl CurveSystem {
    /// An empty universe valued at `pricing_date`.
    pub fn new(pricing_date: Date, day_counter: Box<dyn DayCounter>) -> Self {
        Self {
            registry: CurveRegistry::new(),
            calibrators: BTreeMap::new(),
            pricing_date,
            day_counter,
        }
    }

    /// The valuation date.
    pub fn pricing_date(&self) -> Date {
        self.pricing_date
    }

    /// Move the universe to a new valuation date.  Curves keep their
    /// solved points until the next fit.
    pub fn set_pricing_date(&mut self, date: Date) {
        self.pricing_date = date;
    }

    /// Register a curve with the calibrator that fits it.
    pub fn add_curve(&mut self, curve: CalibratedCurve, calibrator: Box<dyn Calibrator>) -> CurveId {
        let id = self.registry.insert(curve);
        self.calibrators.insert(id, calibrator);
        id
    }

    /// Register a curve with no calibrator: an exogenous input that is
    /// never fitted, only read as a parent.
    pub fn add_exogenous_curve(&mut self, curve: CalibratedCurve) -> CurveId {
        self.registry.insert(curve)
    }

    /// Attach or replace the calibrator of an existing curve.  Needed when
    /// two curves reference each other and neither calibrator can be
    /// built before both ids exist.
    pub fn set_calibrator(&mut self, id: CurveId, calibrator: Box<dyn Calibrator>) -> Result<()> {
        self.registry.get(id)?;
        self.calibrators.insert(id, calibrator);
        Ok(())
    }

    /// The curve registry.
    pub fn registry(&self) -> &CurveRegistry {
        &self.registry
    }

    /// The curve registry, mutably.
    pub fn registry_mut(&mut self) -> &mut CurveRegistry {
        &mut self.registry
    }

    /// The calibrator fitted to `id`, when one is registered.
    pub fn calibrator(&self, id: CurveId) -> Option<&dyn Calibrator> {
        self.calibrators.get(&id).map(|c| c.as_ref())
    }

    /// A pricer consistent with how `id` was calibrated.
    pub fn pricer(&self, id: CurveId) -> Result<Box<dyn Pricer>> {
        let cal = self.require_calibrator(id)?;
        cal.pricer()
    }

    /// Full fit of one curve.
    pub fn fit_curve(&mut self, id: CurveId) -> Result<FitReport> {
        self.run_fit(id, None)
    }

    /// Incremental fit of one curve, re-solving points `[from..]`.
    pub fn refit_curve(&mut self, id: CurveId, from: Size) -> Result<FitReport> {
        self.run_fit(id, Some(from))
    }

    /// Fit the given curves and everything they depend on, parents first.
    ///
    /// Dependency bookkeeping is rebuilt for the duration of the call and
    /// restored afterwards.
    pub fn fit_in_order(&mut self, ids: &[CurveId]) -> Result<Vec<(CurveId, FitReport)>> {
        let mut scope = DependencyScope::build(self, ids)?;
        scope.refit_all()
    }

    /// Fit every calibrated curve in the universe, parents first.
    pub fn fit_all(&mut self) -> Result<Vec<(CurveId, FitReport)>> {
        let ids: Vec<CurveId> = self.calibrators.keys().copied().collect();
        self.fit_in_order(&ids)
    }

    fn require_calibrator(&self, id: CurveId) -> Result<&dyn Calibrator> {
        self.calibrators
            .get(&id)
            .map(|c| c.as_ref())
            .ok_or_else(|| {
                cc_core::errors::Error::Runtime(format!("no calibrator registered for {id}"))
            })
    }

    /// The take-out/fit/put-back dance.  The curve must be restored on
    /// the error path too, so the fit outcome is held until after
    /// restore.
    fn run_fit(&mut self, id: CurveId, from: Option<Size>) -> Result<FitReport> {
        self.require_calibrator(id)?;
        let mut curve = self.registry.remove(id)?;
        let outcome = {
            let ctx = FitContext::new(&self.registry, self.pricing_date, self.day_counter.as_ref());
            // Calibrator lookup cannot fail here; checked above and the
            // map is untouched in between.
            match (self.calibrators.get(&id), from) {
                (Some(cal), None) => calibrator::fit(cal.as_ref(), &mut curve, &ctx),
                (Some(cal), Some(from)) => calibrator::refit(cal.as_ref(), &mut curve, &ctx, from),
                (None, _) => Err(cc_core::errors::Error::Runtime(format!(
                    "no calibrator registered for {id}"
                ))),
            }
        };
        self.registry.restore(id, curve)?;
        outcome
    }
}

impl std::fmt::Debug for CurveSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurveSystem")
            .field("curves", &self.registry.len())
            .field("calibrators", &self.calibrators.len())
            .field("pricing_date", &self.pricing_date)
            .finish()
    }
}
