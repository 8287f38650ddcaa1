//! Scoped dependency-graph construction.
//!
//! Parent/dependent bookkeeping on curves is only trustworthy while a
//! [`DependencyScope`] is alive: building the scope saves whatever edges
//! the curves carried, wipes them, and rediscovers the graph from the
//! calibrators' declared parents.  Dropping the scope puts the saved
//! bookkeeping back, errors or not, so a failed multi-curve fit never
//! leaves half-built edges behind.
//!
//! A parent reached while it is still being visited closes a cycle.  The
//! cycle is logged and the edge is kept; ordering then follows discovery
//! order, which is well-defined even though no topological order exists.

use crate::fitter::FitReport;
use crate::system::CurveSystem;
use cc_core::errors::Result;
use cc_curves::CurveId;
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

/// Bookkeeping fields saved before discovery wipes them.
struct SavedBookkeeping {
    name: String,
    dependents: BTreeSet<CurveId>,
    parents: Vec<CurveId>,
}

enum VisitState {
    InProgress,
    Done,
}

/// A live dependency graph over a [`CurveSystem`], valid until dropped.
pub struct DependencyScope<'a> {
    system: &'a mut CurveSystem,
    saved: Vec<(CurveId, SavedBookkeeping)>,
    order: Vec<CurveId>,
}

impl<'a> DependencyScope<'a> {
    /// Discover the dependency graph reachable from `roots`.
    ///
    /// Every reachable curve has its bookkeeping saved, cleared, and
    /// rebuilt from its calibrator's declared parents, with transitive
    /// edges reduced away.  The discovery order puts parents before
    /// their dependents.
    pub fn build(system: &'a mut CurveSystem, roots: &[CurveId]) -> Result<Self> {
        let mut scope = Self {
            system,
            saved: Vec::new(),
            order: Vec::new(),
        };
        let mut state = BTreeMap::new();
        for &id in roots {
            scope.visit(&mut state, id)?;
        }
        Ok(scope)
    }

    fn visit(&mut self, state: &mut BTreeMap<CurveId, VisitState>, id: CurveId) -> Result<()> {
        match state.get(&id) {
            Some(VisitState::InProgress) => {
                warn!("dependency cycle through {id}; keeping the closing edge");
                return Ok(());
            }
            Some(VisitState::Done) => return Ok(()),
            None => {}
        }

        {
            let curve = self.system.registry_mut().get_mut(id)?;
            self.saved.push((
                id,
                SavedBookkeeping {
                    name: curve.name().to_string(),
                    dependents: curve.dependents().clone(),
                    parents: curve.parent_ids().to_vec(),
                },
            ));
            curve.dependents_mut().clear();
            curve.parent_ids_mut().clear();
        }
        state.insert(id, VisitState::InProgress);

        let parents = self
            .system
            .calibrator(id)
            .map(|c| c.parent_curves())
            .unwrap_or_default();
        for p in parents {
            self.visit(state, p)?;
            let registry = self.system.registry_mut();
            if registry.add_parent(id, p)? {
                registry.add_dependent(p, id)?;
            } else {
                debug!("parent edge {id} -> {p} is redundant; skipped");
            }
        }

        state.insert(id, VisitState::Done);
        self.order.push(id);
        Ok(())
    }

    /// Discovery order: parents before their dependents.
    pub fn topological_order(&self) -> &[CurveId] {
        &self.order
    }

    /// Fit every discovered curve in order.  Curves without a calibrator
    /// (exogenous parents) are skipped.
    pub fn refit_all(&mut self) -> Result<Vec<(CurveId, FitReport)>> {
        let mut reports = Vec::with_capacity(self.order.len());
        for id in self.order.clone() {
            if self.system.calibrator(id).is_none() {
                debug!("{id} has no calibrator; skipping");
                continue;
            }
            reports.push((id, self.system.fit_curve(id)?));
        }
        Ok(reports)
    }
}

impl Drop for DependencyScope<'_> {
    fn drop(&mut self) {
        // Restore in reverse discovery order; failures are logged, not
        // propagated, since drop may already be on an error path.
        for (id, saved) in self.saved.drain(..).rev() {
            match self.system.registry_mut().get_mut(id) {
                Ok(curve) => {
                    curve.set_name(saved.name);
                    *curve.dependents_mut() = saved.dependents;
                    *curve.parent_ids_mut() = saved.parents;
                }
                Err(e) => warn!("could not restore bookkeeping for {id}: {e}"),
            }
        }
    }
}
