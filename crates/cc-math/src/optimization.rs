//! Bounded nonlinear least-squares optimization.
//!
//! The global-fit algorithm casts calibration as a residual vector and
//! minimizes it with [`LevenbergMarquardt`].  Termination is always reported
//! through [`EndCriteriaType`]; running out of iterations or evaluations is
//! an outcome, not an error.

use crate::array::Array;
use cc_core::{
    errors::{Error, Result},
    Real, Size,
};
use nalgebra::{DMatrix, DVector};

// ── Cost function ────────────────────────────────────────────────────────────

/// A vector-valued objective: `values(x)` returns the residual vector whose
/// squared norm is minimized.
pub trait CostFunction {
    /// Residual vector at `x`.
    fn values(&self, x: &Array) -> Array;

    /// Scalar cost `0.5 * Σ rᵢ²(x)`.
    fn value(&self, x: &Array) -> Real {
        0.5 * self.values(x).norm_squared()
    }
}

// ── Box constraint ───────────────────────────────────────────────────────────

/// A box constraint: every parameter must lie in `[lo, hi]`.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryConstraint {
    /// Lower bound (inclusive).
    pub lo: Real,
    /// Upper bound (inclusive).
    pub hi: Real,
}

impl BoundaryConstraint {
    /// Create a box constraint.
    pub fn new(lo: Real, hi: Real) -> Self {
        Self { lo, hi }
    }

    /// Whether `x` satisfies the constraint.
    pub fn test(&self, x: &Array) -> bool {
        x.iter().all(|&v| v >= self.lo && v <= self.hi)
    }

    /// Project `x` onto the box.
    pub fn clamp(&self, x: &mut Array) {
        for i in 0..x.size() {
            x[i] = x[i].clamp(self.lo, self.hi);
        }
    }
}

// ── End criteria ─────────────────────────────────────────────────────────────

/// Iteration and evaluation caps plus convergence thresholds.
#[derive(Debug, Clone)]
pub struct EndCriteria {
    /// Maximum number of outer iterations.
    pub max_iterations: Size,
    /// Maximum number of residual-vector evaluations.
    pub max_function_evaluations: Size,
    /// Stop when the scalar cost drops below this.
    pub root_epsilon: Real,
    /// Stop when the relative cost improvement drops below this.
    pub function_epsilon: Real,
}

impl Default for EndCriteria {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            max_function_evaluations: 10_000,
            root_epsilon: 1e-16,
            function_epsilon: 1e-12,
        }
    }
}

/// The reason an optimization terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCriteriaType {
    /// Scalar cost below `root_epsilon`.
    RootEpsilon,
    /// Relative cost improvement below `function_epsilon`.
    FunctionEpsilon,
    /// Iteration cap reached.
    MaxIterations,
    /// Evaluation cap reached.
    MaxEvaluations,
    /// Damping grew without any accepted step.
    StationaryPoint,
}

/// Result of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Final parameter vector.
    pub x: Array,
    /// Final scalar cost.
    pub value: Real,
    /// Outer iterations performed.
    pub iterations: Size,
    /// Residual-vector evaluations performed.
    pub evaluations: Size,
    /// Reason for termination.
    pub end_type: EndCriteriaType,
}

// ── Levenberg–Marquardt ──────────────────────────────────────────────────────

/// Damped Gauss–Newton least-squares optimizer with box-constraint
/// projection.
///
/// Each iteration solves `(JᵀJ + λ·diag(JᵀJ)) δ = -Jᵀr` and clamps the
/// updated parameters into the constraint box.  An accepted step divides the
/// damping by 10, a rejected one multiplies it by 10.
pub struct LevenbergMarquardt {
    initial_lambda: Real,
    fd_epsilon: Real,
}

const LAMBDA_CEILING: Real = 1e12;

impl LevenbergMarquardt {
    /// Create an optimizer with default damping and finite-difference step.
    pub fn new() -> Self {
        Self {
            initial_lambda: 1e-3,
            fd_epsilon: 1e-7,
        }
    }

    /// Override the initial damping factor.
    pub fn with_initial_lambda(mut self, lambda: Real) -> Self {
        self.initial_lambda = lambda;
        self
    }

    /// Minimize `cost` starting from `initial`, projected into `constraint`.
    pub fn minimize<C: CostFunction>(
        &self,
        cost: &C,
        constraint: &BoundaryConstraint,
        initial: &Array,
        criteria: &EndCriteria,
    ) -> Result<OptimizationResult> {
        let n = initial.size();
        if n == 0 {
            return Err(Error::InvalidArgument(
                "empty parameter vector for optimization".into(),
            ));
        }

        let mut x = initial.clone();
        constraint.clamp(&mut x);

        let mut evaluations: Size = 0;
        let mut eval = |x: &Array, evaluations: &mut Size| -> Array {
            *evaluations += 1;
            cost.values(x)
        };

        let mut r = eval(&x, &mut evaluations);
        let m = r.size();
        if m == 0 {
            return Err(Error::InvalidArgument("empty residual vector".into()));
        }
        let mut cost_now = 0.5 * r.norm_squared();
        let mut lambda = self.initial_lambda;

        for iteration in 0..criteria.max_iterations {
            if cost_now < criteria.root_epsilon {
                return Ok(OptimizationResult {
                    x,
                    value: cost_now,
                    iterations: iteration,
                    evaluations,
                    end_type: EndCriteriaType::RootEpsilon,
                });
            }

            // Forward-difference Jacobian, one evaluation per parameter.
            let mut jac = DMatrix::<Real>::zeros(m, n);
            for j in 0..n {
                let h = self.fd_epsilon * x[j].abs().max(1.0);
                let mut xp = x.clone();
                xp[j] += h;
                let rp = eval(&xp, &mut evaluations);
                for i in 0..m {
                    jac[(i, j)] = (rp[i] - r[i]) / h;
                }
            }

            let jt = jac.transpose();
            let jtj = &jt * &jac;
            let jtr = &jt * DVector::from_column_slice(r.as_slice());

            // Inner damping loop: grow lambda until a step is accepted.
            let mut accepted = false;
            while lambda < LAMBDA_CEILING {
                if evaluations >= criteria.max_function_evaluations {
                    return Ok(OptimizationResult {
                        x,
                        value: cost_now,
                        iterations: iteration,
                        evaluations,
                        end_type: EndCriteriaType::MaxEvaluations,
                    });
                }

                let mut damped = jtj.clone();
                for d in 0..n {
                    let diag = jtj[(d, d)].max(f64::EPSILON);
                    damped[(d, d)] += lambda * diag;
                }
                let step = match damped.lu().solve(&(-&jtr)) {
                    Some(s) => s,
                    None => {
                        lambda *= 10.0;
                        continue;
                    }
                };

                let mut x_new = x.clone();
                for i in 0..n {
                    x_new[i] += step[i];
                }
                constraint.clamp(&mut x_new);

                let r_new = eval(&x_new, &mut evaluations);
                let cost_new = 0.5 * r_new.norm_squared();

                if cost_new.is_finite() && cost_new < cost_now {
                    let improvement = (cost_now - cost_new) / cost_now.max(f64::MIN_POSITIVE);
                    x = x_new;
                    r = r_new;
                    cost_now = cost_new;
                    lambda = (lambda * 0.1).max(1e-12);
                    accepted = true;

                    if improvement < criteria.function_epsilon {
                        return Ok(OptimizationResult {
                            x,
                            value: cost_now,
                            iterations: iteration + 1,
                            evaluations,
                            end_type: EndCriteriaType::FunctionEpsilon,
                        });
                    }
                    break;
                }
                lambda *= 10.0;
            }

            if !accepted {
                return Ok(OptimizationResult {
                    x,
                    value: cost_now,
                    iterations: iteration,
                    evaluations,
                    end_type: EndCriteriaType::StationaryPoint,
                });
            }
        }

        Ok(OptimizationResult {
            x,
            value: cost_now,
            iterations: criteria.max_iterations,
            evaluations,
            end_type: EndCriteriaType::MaxIterations,
        })
    }
}

impl Default for LevenbergMarquardt {
    fn default() -> Self {
        Self::new()
    }
}
