//! A market curve together with its calibration state.

use crate::curve::Curve;
use crate::registry::CurveId;
use crate::tenor::CurveTenor;
use cc_time::Date;
use std::collections::BTreeSet;
use std::time::Duration;

/// A [`Curve`] plus its tenor collection and cross-curve bookkeeping: the
/// set of curves that read it (dependents) and the list of curves it reads
/// (parents).
///
/// The dependent/parent sets are rewritten transiently by the dependency
/// graph and otherwise persist across refits.
#[derive(Debug, Clone)]
pub struct CalibratedCurve {
    name: String,
    curve: Curve,
    tenors: Vec<CurveTenor>,
    dependents: BTreeSet<CurveId>,
    parent_ids: Vec<CurveId>,
    default_date: Option<Date>,
    last_fit: Option<Duration>,
}

impl CalibratedCurve {
    /// Wrap a curve under a market name.
    pub fn new(name: impl Into<String>, curve: Curve) -> Self {
        Self {
            name: name.into(),
            curve,
            tenors: Vec::new(),
            dependents: BTreeSet::new(),
            parent_ids: Vec::new(),
            default_date: None,
            last_fit: None,
        }
    }

    /// The market name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the curve.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The underlying curve.
    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    /// Mutable access to the underlying curve (the fitter writes points
    /// through this).
    pub fn curve_mut(&mut self) -> &mut Curve {
        &mut self.curve
    }

    /// Attach a calibration instrument.
    pub fn add_tenor(&mut self, tenor: CurveTenor) {
        self.tenors.push(tenor);
        self.tenors.sort_by_key(|t| t.curve_date());
    }

    /// The tenor collection, ordered by curve date.
    pub fn tenors(&self) -> &[CurveTenor] {
        &self.tenors
    }

    /// Mutable tenor access (the fitter records model prices here).
    pub fn tenors_mut(&mut self) -> &mut [CurveTenor] {
        &mut self.tenors
    }

    /// Drop all tenors (explicit curve clear).
    pub fn clear_tenors(&mut self) {
        self.tenors.clear();
    }

    /// Number of tenors with positive weight.
    pub fn active_tenor_count(&self) -> usize {
        self.tenors.iter().filter(|t| t.is_active()).count()
    }

    /// Whether any two tenors share a curve date.
    pub fn has_overlap(&self) -> bool {
        self.tenors
            .windows(2)
            .any(|w| w[0].is_active() && w[1].is_active() && w[0].overlaps(&w[1]))
    }

    /// Incremental ("refit") calibration requires one curve point per
    /// active tenor; anything else forces a full fit.
    pub fn supports_incremental_fit(&self) -> bool {
        self.curve.len() == self.active_tenor_count()
    }

    /// Curves that read this one during their own fits.
    pub fn dependents(&self) -> &BTreeSet<CurveId> {
        &self.dependents
    }

    /// Mutable dependent set (dependency-graph bookkeeping).
    pub fn dependents_mut(&mut self) -> &mut BTreeSet<CurveId> {
        &mut self.dependents
    }

    /// Curves this one reads during its fit.
    pub fn parent_ids(&self) -> &[CurveId] {
        &self.parent_ids
    }

    /// Mutable parent-id list (dependency-graph bookkeeping).
    pub fn parent_ids_mut(&mut self) -> &mut Vec<CurveId> {
        &mut self.parent_ids
    }

    /// The jump/default date, if the curve has defaulted.
    pub fn default_date(&self) -> Option<Date> {
        self.default_date
    }

    /// Set or clear the jump/default date.  A fit must not erase this.
    pub fn set_default_date(&mut self, date: Option<Date>) {
        self.default_date = date;
    }

    /// Elapsed time of the most recent fit.
    pub fn last_fit(&self) -> Option<Duration> {
        self.last_fit
    }

    /// Record the elapsed time of a fit.
    pub fn set_last_fit(&mut self, elapsed: Duration) {
        self.last_fit = Some(elapsed);
    }
}
