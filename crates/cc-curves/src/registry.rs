//! Id-keyed curve storage.
//!
//! Curves reference one another by opaque [`CurveId`]s held in a
//! [`CurveRegistry`] rather than by direct object references; graph
//! algorithms operate purely over ids, which removes ownership cycles
//! between curves, their orchestrators, and their parents.

use crate::calibrated_curve::CalibratedCurve;
use cc_core::errors::{Error, Result};
use std::collections::BTreeMap;

/// Opaque identifier of a curve within a [`CurveRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CurveId(u64);

impl CurveId {
    /// The raw id value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for CurveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "curve#{}", self.0)
    }
}

/// Owns every [`CalibratedCurve`] in a calibration universe, keyed by id.
#[derive(Debug, Default)]
pub struct CurveRegistry {
    curves: BTreeMap<CurveId, CalibratedCurve>,
    next_id: u64,
}

impl CurveRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a curve and return its id.
    pub fn insert(&mut self, curve: CalibratedCurve) -> CurveId {
        let id = CurveId(self.next_id);
        self.next_id += 1;
        self.curves.insert(id, curve);
        id
    }

    /// Look up a curve.
    pub fn get(&self, id: CurveId) -> Result<&CalibratedCurve> {
        self.curves.get(&id).ok_or(Error::UnknownCurve(id.0))
    }

    /// Look up a curve mutably.
    pub fn get_mut(&mut self, id: CurveId) -> Result<&mut CalibratedCurve> {
        self.curves.get_mut(&id).ok_or(Error::UnknownCurve(id.0))
    }

    /// Whether `id` is present.
    pub fn contains(&self, id: CurveId) -> bool {
        self.curves.contains_key(&id)
    }

    /// All curve ids, ascending.
    pub fn ids(&self) -> impl Iterator<Item = CurveId> + '_ {
        self.curves.keys().copied()
    }

    /// Number of curves.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Whether the registry holds no curves.
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Take a curve out of the registry, keeping its id reserved.
    ///
    /// Fitting needs the curve mutably while its parents are still read
    /// through the registry; the caller takes the curve out, fits it, and
    /// puts it back with [`restore`](Self::restore).
    pub fn remove(&mut self, id: CurveId) -> Result<CalibratedCurve> {
        self.curves.remove(&id).ok_or(Error::UnknownCurve(id.0))
    }

    /// Put back a curve taken out with [`remove`](Self::remove).
    pub fn restore(&mut self, id: CurveId, curve: CalibratedCurve) -> Result<()> {
        cc_core::ensure!(
            id.0 < self.next_id,
            "{id} was never issued by this registry"
        );
        cc_core::ensure!(!self.curves.contains_key(&id), "{id} is already present");
        self.curves.insert(id, curve);
        Ok(())
    }

    // ── Parent/dependent bookkeeping ─────────────────────────────────────

    /// Whether `ancestor` is reachable from `id` through parent links.
    pub fn is_ancestor(&self, ancestor: CurveId, id: CurveId) -> bool {
        let mut stack = vec![id];
        let mut seen = std::collections::BTreeSet::new();
        while let Some(cur) = stack.pop() {
            if !seen.insert(cur) {
                continue;
            }
            if let Ok(curve) = self.get(cur) {
                for &p in curve.parent_ids() {
                    if p == ancestor {
                        return true;
                    }
                    stack.push(p);
                }
            }
        }
        false
    }

    /// Add `parent` to `child`'s parent list.
    ///
    /// Returns `false` without adding when `parent` is already reachable
    /// through one of the child's existing parents: an indirect path makes
    /// the direct edge redundant (transitive reduction).
    pub fn add_parent(&mut self, child: CurveId, parent: CurveId) -> Result<bool> {
        cc_core::ensure!(child != parent, "{child} cannot be its own parent");
        self.get(parent)?;
        let existing = self.get(child)?.parent_ids().to_vec();
        if existing.contains(&parent) {
            return Ok(false);
        }
        for p in existing {
            if p == parent || self.is_ancestor(parent, p) {
                return Ok(false);
            }
        }
        self.get_mut(child)?.parent_ids_mut().push(parent);
        Ok(true)
    }

    /// Register `child` as a dependent of `parent`.
    ///
    /// Only valid once the child's parent list already contains `parent`.
    pub fn add_dependent(&mut self, parent: CurveId, child: CurveId) -> Result<()> {
        cc_core::ensure!(
            self.get(child)?.parent_ids().contains(&parent),
            "{child} does not list {parent} as a parent"
        );
        self.get_mut(parent)?.dependents_mut().insert(child);
        Ok(())
    }
}
