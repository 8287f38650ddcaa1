//! The dual-mode numerical fitter.
//!
//! [`CashflowFitter`] turns a set of (target price, weight, payment
//! schedule) records into curve points, either by sequential root-finding
//! (bootstrap) or by simultaneous bounded least squares (global fit).  The
//! curve being calibrated is mutated in place by the very algorithm reading
//! it; callers must serialize any concurrent reads.

use crate::fit_record::FitRecord;
use cc_core::{
    errors::{Error, Result},
    Real, Size,
};
use cc_curves::{Curve, Interpolation, ValueConvention};
use cc_math::{
    solvers1d, Array, BoundaryConstraint, CostFunction, EndCriteria, EndCriteriaType,
    LevenbergMarquardt,
};
use cc_time::{Date, DayCounter};
use log::{debug, warn};
use std::cell::{Cell, RefCell};

/// Cold-start guess for a solved curve value.
const DEFAULT_GUESS: Real = 1.0;

/// A warm-start guess this close to the solver's global bounds is replaced
/// by [`DEFAULT_GUESS`].
const BRACKET_EDGE_TOLERANCE: Real = 1e-3;

/// A smoothness penalty with weight at or below this is omitted from the
/// residual vector entirely.
const PENALTY_CUTOFF: Real = 1e-12;

/// Residual stand-in when a price evaluation fails inside the optimizer.
const BAD_RESIDUAL: Real = 1e6;

// ── Method, status, report ───────────────────────────────────────────────────

/// Smoothness penalty weights for the global fit, applied to the implied
/// simple-forward-rate parameterization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    /// Weight of the first-difference (slope) penalty.
    pub slope_weight: Real,
    /// Weight of the second-difference (curvature) penalty.
    pub curvature_weight: Real,
}

/// A fixed functional curve form whose coefficients are the optimization
/// variables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParametricForm {
    /// Nelson–Siegel zero-rate form with a fixed decay time `(β₀, β₁, β₂)`.
    NelsonSiegel {
        /// Decay time of the exponential terms, in years.
        decay: Real,
    },
}

/// The fitting method tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitMethod {
    /// Sequential point-by-point root finding.  Duplicate curve dates are a
    /// hard structural error under this method.
    Bootstrap,
    /// Bootstrap seed followed by smoothness-penalized global refinement;
    /// tolerates overlapping curve dates.
    Smoothed(SmoothingParams),
    /// Global fit directly against the functional coefficients.
    Parametric(ParametricForm),
}

/// Terminal status of a fit — returned, never thrown, so the caller can
/// accept an approximate solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitStatus {
    /// Sup-norm pricing error within tolerance.
    Converged,
    /// The optimizer hit its function-evaluation cap.
    MaxEvaluationsReached,
    /// The optimizer hit its iteration cap.
    MaxIterationsReached,
    /// The underlying solver failed for an unidentified reason.
    FailedForUnknownReason,
    /// The fit terminated normally but outside tolerance.
    ExactSolutionNotFound,
}

impl FitStatus {
    /// Whether the fit met the sup-norm tolerance.
    pub fn is_converged(self) -> bool {
        self == FitStatus::Converged
    }
}

/// Outcome of a fit: status, per-record pricing errors (aligned with the
/// fitter's record order), their sup-norm, and the time spent solving.
#[derive(Debug, Clone)]
pub struct FitReport {
    /// Terminal status.
    pub status: FitStatus,
    /// Per-record pricing errors `target - pv`.
    pub errors: Vec<Real>,
    /// Maximum absolute pricing error.
    pub sup_norm: Real,
    /// Wall time of the numerical solve.
    pub elapsed: std::time::Duration,
}

/// Numerical controls for both fitting modes.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Global lower bound for solved curve values.
    pub lower_bound: Real,
    /// Global upper bound for solved curve values.
    pub upper_bound: Real,
    /// Bounds for implied forward rates / parametric coefficients.
    pub rate_bounds: (Real, Real),
    /// Initial half-width of the root-finder bracket around the guess.
    pub bracket_step: Real,
    /// Root-finder accuracy.
    pub accuracy: Real,
    /// Sup-norm convergence tolerance.
    pub tolerance: Real,
    /// Maximum number of Gauss–Seidel refinement sweeps after the first
    /// bootstrap pass.
    pub max_sweeps: Size,
    /// Degrade gracefully when a later bootstrap point fails to solve,
    /// instead of propagating the failure.
    pub force_fit: bool,
    /// Termination controls for the global-fit optimizer.
    pub end_criteria: EndCriteria,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            lower_bound: 1e-8,
            upper_bound: 10.0,
            rate_bounds: (-0.95, 5.0),
            bracket_step: 0.05,
            accuracy: 1e-13,
            tolerance: 1e-9,
            max_sweeps: 10,
            force_fit: false,
            end_criteria: EndCriteria::default(),
        }
    }
}

// ── The fitter ───────────────────────────────────────────────────────────────

/// Dual-mode curve fitter over a fixed set of fit records.
#[derive(Debug)]
pub struct CashflowFitter {
    records: Vec<FitRecord>,
    options: FitOptions,
    overlap: bool,
}

impl CashflowFitter {
    /// Validate and order the records.
    ///
    /// Structural problems — no records, non-positive weights, empty
    /// instruments, inverted bounds — are rejected here, before any
    /// numerical work.
    pub fn new(mut records: Vec<FitRecord>, options: FitOptions) -> Result<Self> {
        cc_core::ensure!(!records.is_empty(), "no fit records supplied");
        cc_core::ensure!(
            options.lower_bound < options.upper_bound,
            "empty solver domain [{}, {}]",
            options.lower_bound,
            options.upper_bound
        );
        for (i, rec) in records.iter().enumerate() {
            if rec.weight <= 0.0 {
                return Err(Error::InvalidArgument(format!(
                    "record {i} has non-positive weight {}",
                    rec.weight
                )));
            }
            if rec.receive.is_empty() && rec.pay.is_empty() {
                return Err(Error::InvalidArgument(format!(
                    "record {i} ({}) has no payments on either side",
                    rec.curve_date
                )));
            }
        }
        records.sort_by_key(|r| r.curve_date);
        let overlap = records.windows(2).any(|w| w[0].overlaps(&w[1]));
        Ok(Self {
            records,
            options,
            overlap,
        })
    }

    /// The ordered records.
    pub fn records(&self) -> &[FitRecord] {
        &self.records
    }

    /// Whether any two records share a curve date.
    pub fn has_overlap(&self) -> bool {
        self.overlap
    }

    /// Fit `curve` with the given method, starting at record `from`.
    ///
    /// `from > 0` is the incremental (ReFit) entry: points `[0, from)` are
    /// assumed valid and unchanged, which requires the curve to already
    /// carry one point per record. Only [`FitMethod::Bootstrap`] solves
    /// point by point; the global methods re-optimize every variable
    /// jointly and therefore only accept `from == 0`.
    pub fn fit(
        &self,
        curve: &mut Curve,
        method: &FitMethod,
        dc: &dyn DayCounter,
        from: Size,
    ) -> Result<FitReport> {
        cc_core::ensure!(
            from <= self.records.len(),
            "start index {from} beyond {} records",
            self.records.len()
        );
        if from > 0 {
            cc_core::ensure!(
                matches!(method, FitMethod::Bootstrap),
                "incremental fit is bootstrap-only; global methods refit the whole curve"
            );
            cc_core::ensure!(
                curve.len() == self.records.len(),
                "incremental fit requires {} curve points, found {}",
                self.records.len(),
                curve.len()
            );
        }
        let started = std::time::Instant::now();
        let mut report = match method {
            FitMethod::Bootstrap => {
                if let Some(date) = self.first_overlap_date() {
                    return Err(Error::DuplicatePillar(date.to_string()));
                }
                self.bootstrap_fit(curve, dc, from)
            }
            FitMethod::Smoothed(params) => self.global_fit(curve, dc, Some(params), None),
            FitMethod::Parametric(form) => self.global_fit(curve, dc, None, Some(form)),
        }?;
        report.elapsed = started.elapsed();
        Ok(report)
    }

    fn first_overlap_date(&self) -> Option<Date> {
        self.records
            .windows(2)
            .find(|w| w[0].overlaps(&w[1]))
            .map(|w| w[0].curve_date)
    }

    // ── Bootstrap ────────────────────────────────────────────────────────

    fn bootstrap_fit(&self, curve: &mut Curve, dc: &dyn DayCounter, from: Size) -> Result<FitReport> {
        let n = self.records.len();
        cc_core::ensure!(
            curve.is_empty() || curve.len() == n,
            "curve carries {} points for {n} records; clear it or fit incrementally",
            curve.len()
        );
        let appending = curve.len() < n;

        // Warm start: only meaningful when the curve already carries one
        // point per record (repeated small-perturbation fits).
        let warm: Option<Vec<Real>> = if curve.len() == n {
            let mut values = Vec::with_capacity(n);
            for rec in &self.records {
                values.push(curve.interpolate(rec.curve_date)?);
            }
            Some(values)
        } else {
            None
        };

        // First pass under the transient reformat; the original
        // interpolation and as-of date come back on every exit path.
        {
            let mut guard = Reformat::apply(curve, &self.records);
            self.sequential_pass(guard.curve(), dc, from, warm.as_deref(), appending)?;
        }

        let mut errors = self.pricing_errors(curve, dc)?;
        let mut sup = sup_norm(&errors);
        if sup <= self.options.tolerance {
            return Ok(FitReport {
                status: FitStatus::Converged,
                errors,
                sup_norm: sup,
                elapsed: std::time::Duration::ZERO,
            });
        }

        // Gauss–Seidel refinement: re-solve every point holding the others
        // fixed, keeping the best vector seen and reverting to it when a
        // sweep makes things worse or fails outright.
        let mut best_values = point_values(curve);
        let mut best_errors = errors.clone();
        let mut best_sup = sup;
        let mut converged = false;

        for sweep in 0..self.options.max_sweeps {
            let outcome = self
                .refine_sweep(curve, dc)
                .and_then(|()| self.pricing_errors(curve, dc));
            match outcome {
                Ok(new_errors) => {
                    errors = new_errors;
                    sup = sup_norm(&errors);
                    debug!("bootstrap sweep {sweep}: sup-norm {sup:e} (best {best_sup:e})");
                    if sup < best_sup {
                        best_values = point_values(curve);
                        best_errors = errors.clone();
                        best_sup = sup;
                    }
                    if sup <= self.options.tolerance {
                        converged = true;
                        break;
                    }
                    if sup > best_sup {
                        restore_points(curve, &best_values)?;
                        errors = best_errors.clone();
                        sup = best_sup;
                        break;
                    }
                }
                Err(e) => {
                    warn!("bootstrap sweep {sweep} failed ({e}); reverting to best-known vector");
                    restore_points(curve, &best_values)?;
                    errors = best_errors.clone();
                    sup = best_sup;
                    break;
                }
            }
        }

        Ok(FitReport {
            status: if converged {
                FitStatus::Converged
            } else {
                FitStatus::ExactSolutionNotFound
            },
            errors,
            sup_norm: sup,
            elapsed: std::time::Duration::ZERO,
        })
    }

    /// One sequential pass: solve each record's point in curve-date order.
    /// `appending` means the curve is being grown point by point; only then
    /// can force fit shrink-and-continue past a failed point.
    fn sequential_pass(
        &self,
        curve: &mut Curve,
        dc: &dyn DayCounter,
        from: Size,
        warm: Option<&[Real]>,
        appending: bool,
    ) -> Result<()> {
        for i in from..self.records.len() {
            let rec = &self.records[i];
            let guess = self.edge_safe_guess(warm.map_or(DEFAULT_GUESS, |w| w[i]));
            if appending {
                curve.add(rec.curve_date, guess)?;
            } else {
                curve.set_value(i, guess)?;
            }
            match self.solve_point(rec, i, curve, dc, guess) {
                Ok(_) => {}
                Err(e) if self.options.force_fit && appending && i > 0 => {
                    // Best-effort degradation: drop back to the solved
                    // prefix and re-interpolate a fallback for this date.
                    warn!(
                        "force fit: root find failed at {} ({e}); interpolating fallback",
                        rec.curve_date
                    );
                    curve.shrink(i);
                    let fallback = curve.interpolate(rec.curve_date)?;
                    curve.add(rec.curve_date, fallback)?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Re-solve every point against the full curve.
    fn refine_sweep(&self, curve: &mut Curve, dc: &dyn DayCounter) -> Result<()> {
        for i in 0..self.records.len() {
            let guess = self.edge_safe_guess(curve.value(i)?);
            self.solve_point(&self.records[i], i, curve, dc, guess)?;
        }
        Ok(())
    }

    /// Solve `target - pv(curve value at point_idx) = 0` by bracketed Brent.
    fn solve_point(
        &self,
        rec: &FitRecord,
        point_idx: Size,
        curve: &mut Curve,
        dc: &dyn DayCounter,
        guess: Real,
    ) -> Result<Real> {
        let failure: RefCell<Option<Error>> = RefCell::new(None);
        let mut objective = |x: Real| -> Real {
            if let Err(e) = curve.set_value(point_idx, x) {
                *failure.borrow_mut() = Some(e);
                return Real::NAN;
            }
            match rec.pricing_error(curve, dc) {
                Ok(err) => err,
                Err(e) => {
                    *failure.borrow_mut() = Some(e);
                    Real::NAN
                }
            }
        };

        let (a, b) = solvers1d::find_bracket(
            &mut objective,
            guess,
            self.options.bracket_step,
            self.options.lower_bound,
            self.options.upper_bound,
        )?;
        let root = solvers1d::brent(&mut objective, a, b, self.options.accuracy)?;
        if let Some(e) = failure.into_inner() {
            return Err(e);
        }
        curve.set_value(point_idx, root)?;
        Ok(root)
    }

    /// Replace a guess that sits within [`BRACKET_EDGE_TOLERANCE`] of the
    /// global bounds by the default.
    fn edge_safe_guess(&self, guess: Real) -> Real {
        if guess - self.options.lower_bound < BRACKET_EDGE_TOLERANCE
            || self.options.upper_bound - guess < BRACKET_EDGE_TOLERANCE
        {
            DEFAULT_GUESS
        } else {
            guess
        }
    }

    fn pricing_errors(&self, curve: &Curve, dc: &dyn DayCounter) -> Result<Vec<Real>> {
        self.records
            .iter()
            .map(|r| r.pricing_error(curve, dc))
            .collect()
    }

    // ── Global fit ───────────────────────────────────────────────────────

    fn global_fit(
        &self,
        curve: &mut Curve,
        dc: &dyn DayCounter,
        smoothing: Option<&SmoothingParams>,
        form: Option<&ParametricForm>,
    ) -> Result<FitReport> {
        // One pillar per distinct curve date; overlapping records share a
        // pillar and are disambiguated by the joint optimization.
        let mut pillars: Vec<Date> = self.records.iter().map(|r| r.curve_date).collect();
        pillars.dedup();

        let (repr, x0) = match form {
            None => {
                // Seed from a fast de-duplicated bootstrap pass, then
                // re-express the seeded points as implied simple forwards.
                self.bootstrap_seed(curve, dc)?;
                let (forwards, taus) = implied_forwards(curve, dc);
                (Representation::PiecewiseForward { taus }, forwards)
            }
            Some(&ParametricForm::NelsonSiegel { decay }) => {
                cc_core::ensure!(decay > 0.0, "Nelson-Siegel decay must be positive, got {decay}");
                curve.clear();
                let mut times = Vec::with_capacity(pillars.len());
                for &d in &pillars {
                    curve.add(d, DEFAULT_GUESS)?;
                    times.push(dc.year_fraction(curve.as_of(), d));
                }
                (
                    Representation::NelsonSiegel { decay, times },
                    vec![0.02, 0.0, 0.0],
                )
            }
        };

        let constraint = BoundaryConstraint::new(self.options.rate_bounds.0, self.options.rate_bounds.1);
        let lm = LevenbergMarquardt::new();

        let (outcome, degraded) = {
            let residuals = GlobalResiduals {
                records: &self.records,
                curve: RefCell::new(curve),
                dc,
                repr: &repr,
                smoothing: if matches!(repr, Representation::PiecewiseForward { .. }) {
                    smoothing
                } else {
                    None
                },
                degraded: Cell::new(false),
            };
            let out = lm.minimize(
                &residuals,
                &constraint,
                &Array::from_vec(x0),
                &self.options.end_criteria,
            );
            (out, residuals.degraded.get())
        };
        if degraded {
            debug!("global fit: some price evaluations failed and were penalized");
        }

        match outcome {
            Ok(result) => {
                repr.write_points(curve, result.x.as_slice())?;
                let errors = self.pricing_errors(curve, dc)?;
                let sup = sup_norm(&errors);
                let status = if sup <= self.options.tolerance {
                    FitStatus::Converged
                } else {
                    match result.end_type {
                        EndCriteriaType::MaxIterations => FitStatus::MaxIterationsReached,
                        EndCriteriaType::MaxEvaluations => FitStatus::MaxEvaluationsReached,
                        EndCriteriaType::RootEpsilon
                        | EndCriteriaType::FunctionEpsilon
                        | EndCriteriaType::StationaryPoint => FitStatus::ExactSolutionNotFound,
                    }
                };
                Ok(FitReport {
                    status,
                    errors,
                    sup_norm: sup,
                    elapsed: std::time::Duration::ZERO,
                })
            }
            Err(e) => {
                warn!("global fit optimizer failed: {e}");
                let errors = self
                    .pricing_errors(curve, dc)
                    .unwrap_or_else(|_| vec![Real::NAN; self.records.len()]);
                let sup = sup_norm(&errors);
                Ok(FitReport {
                    status: FitStatus::FailedForUnknownReason,
                    errors,
                    sup_norm: sup,
                    elapsed: std::time::Duration::ZERO,
                })
            }
        }
    }

    /// Fast bootstrap seed: one pass over a de-duplicated subset (first
    /// record per curve date), no refinement sweeps, tolerant of per-point
    /// failures.
    fn bootstrap_seed(&self, curve: &mut Curve, dc: &dyn DayCounter) -> Result<()> {
        curve.clear();
        let mut last_date: Option<Date> = None;
        let mut idx: Size = 0;
        for rec in &self.records {
            if last_date == Some(rec.curve_date) {
                continue;
            }
            let guess = if idx == 0 {
                DEFAULT_GUESS
            } else {
                self.edge_safe_guess(curve.value(idx - 1)?)
            };
            curve.add(rec.curve_date, guess)?;
            if let Err(e) = self.solve_point(rec, idx, curve, dc, guess) {
                debug!("seed solve failed at {} ({e}); holding previous value", rec.curve_date);
                curve.set_value(idx, guess)?;
            }
            last_date = Some(rec.curve_date);
            idx += 1;
        }
        Ok(())
    }
}

// ── Transient reformat ───────────────────────────────────────────────────────

/// Scoped curve reformatting for the first bootstrap pass: simple
/// weighted-constant interpolation and, for multiplicative-convention
/// curves, an as-of date re-based to the earliest record settlement.
/// Restores the original state on drop, errors included.
struct Reformat<'c> {
    curve: &'c mut Curve,
    interpolation: Interpolation,
    as_of: Date,
}

impl<'c> Reformat<'c> {
    fn apply(curve: &'c mut Curve, records: &[FitRecord]) -> Self {
        let interpolation = curve.interpolation();
        let as_of = curve.as_of();
        curve.set_interpolation(Interpolation::PreviousConstant);
        if curve.convention() == ValueConvention::MultiplicativeFactor {
            if let Some(earliest) = records.iter().map(|r| r.settlement).min() {
                curve.set_as_of(earliest);
            }
        }
        Self {
            curve,
            interpolation,
            as_of,
        }
    }

    fn curve(&mut self) -> &mut Curve {
        self.curve
    }
}

impl Drop for Reformat<'_> {
    fn drop(&mut self) {
        self.curve.set_interpolation(self.interpolation);
        self.curve.set_as_of(self.as_of);
    }
}

// ── Global-fit residuals ─────────────────────────────────────────────────────

/// How optimization variables map onto curve points.
#[derive(Debug)]
enum Representation {
    /// `x[i]` is the simple forward over the i-th pillar interval;
    /// points are the cumulative products `df_k = Π 1/(1 + x_i·τ_i)`.
    PiecewiseForward {
        /// Year fractions of the pillar intervals.
        taus: Vec<Real>,
    },
    /// `x = (β₀, β₁, β₂)` of a Nelson–Siegel zero-rate form.
    NelsonSiegel {
        /// Fixed decay time.
        decay: Real,
        /// Pillar times from the as-of date.
        times: Vec<Real>,
    },
}

impl Representation {
    /// Number of optimization variables.
    fn dimension(&self) -> Size {
        match self {
            Representation::PiecewiseForward { taus } => taus.len(),
            Representation::NelsonSiegel { .. } => 3,
        }
    }

    /// Write curve point values implied by `x`.
    fn write_points(&self, curve: &mut Curve, x: &[Real]) -> Result<()> {
        match self {
            Representation::PiecewiseForward { taus } => {
                let mut df = 1.0;
                for (i, (&f, &tau)) in x.iter().zip(taus.iter()).enumerate() {
                    let growth = 1.0 + f * tau;
                    df /= growth.max(1e-12);
                    curve.set_value(i, df)?;
                }
                Ok(())
            }
            Representation::NelsonSiegel { decay, times } => {
                let (b0, b1, b2) = (x[0], x[1], x[2]);
                for (i, &t) in times.iter().enumerate() {
                    let u = (t / decay).max(1e-12);
                    let h = (1.0 - (-u).exp()) / u;
                    let z = b0 + (b1 + b2) * h - b2 * (-u).exp();
                    curve.set_value(i, (-z * t).exp())?;
                }
                Ok(())
            }
        }
    }
}

struct GlobalResiduals<'a> {
    records: &'a [FitRecord],
    curve: RefCell<&'a mut Curve>,
    dc: &'a dyn DayCounter,
    repr: &'a Representation,
    smoothing: Option<&'a SmoothingParams>,
    degraded: Cell<bool>,
}

impl GlobalResiduals<'_> {
    /// Fixed residual dimension: one entry per record plus the enabled
    /// penalty blocks.
    fn dimension(&self) -> Size {
        let n = self.repr.dimension();
        let mut dim = self.records.len();
        if let Some(s) = self.smoothing {
            if s.slope_weight > PENALTY_CUTOFF {
                dim += n.saturating_sub(1);
            }
            if s.curvature_weight > PENALTY_CUTOFF {
                dim += n.saturating_sub(2);
            }
        }
        dim
    }
}

impl CostFunction for GlobalResiduals<'_> {
    fn values(&self, x: &Array) -> Array {
        let mut curve = self.curve.borrow_mut();
        let n = self.repr.dimension();
        let mut res = Vec::with_capacity(self.records.len() + 2 * n);

        if self.repr.write_points(&mut curve, x.as_slice()).is_err() {
            self.degraded.set(true);
            return Array::from_vec(vec![BAD_RESIDUAL; self.dimension()]);
        }

        for rec in self.records {
            match rec.pricing_error(&curve, self.dc) {
                Ok(e) => res.push(rec.weight * e),
                Err(_) => {
                    self.degraded.set(true);
                    res.push(BAD_RESIDUAL);
                }
            }
        }

        if let Some(s) = self.smoothing {
            if s.slope_weight > PENALTY_CUTOFF {
                for i in 1..n {
                    res.push(s.slope_weight * (x[i] - x[i - 1]));
                }
            }
            if s.curvature_weight > PENALTY_CUTOFF {
                for i in 1..n.saturating_sub(1) {
                    res.push(s.curvature_weight * (x[i + 1] - 2.0 * x[i] + x[i - 1]));
                }
            }
        }

        Array::from_vec(res)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn sup_norm(errors: &[Real]) -> Real {
    errors.iter().fold(0.0, |m, &e| m.max(e.abs()))
}

fn point_values(curve: &Curve) -> Vec<Real> {
    curve.points().iter().map(|&(_, v)| v).collect()
}

fn restore_points(curve: &mut Curve, values: &[Real]) -> Result<()> {
    for (i, &v) in values.iter().enumerate() {
        curve.set_value(i, v)?;
    }
    Ok(())
}

/// Re-express curve points as per-interval implied simple forwards.
fn implied_forwards(curve: &Curve, dc: &dyn DayCounter) -> (Vec<Real>, Vec<Real>) {
    let mut forwards = Vec::with_capacity(curve.len());
    let mut taus = Vec::with_capacity(curve.len());
    let mut prev_date = curve.as_of();
    let mut prev_df = 1.0;
    for &(date, value) in curve.points() {
        let tau = dc.year_fraction(prev_date, date).max(1e-12);
        let value = value.max(1e-12);
        forwards.push((prev_df / value - 1.0) / tau);
        taus.push(tau);
        prev_date = date;
        prev_df = value;
    }
    (forwards, taus)
}
