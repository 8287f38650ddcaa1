//! Bracketed one-dimensional root finders.
//!
//! The bootstrap fitter treats these as black boxes with the contract
//! `evaluate(x) -> residual`, explicit bounds, and a definite
//! success/failure signal.

use cc_core::{
    errors::{Error, Result},
    Real,
};

const MAX_ITERATIONS: u32 = 100;
const DEFAULT_ACCURACY: Real = 1.0e-11;

/// Grow a bracket around `guess` until `f` changes sign, doubling the step
/// each attempt and clamping to `[lo, hi]`.
///
/// Returns the bracket endpoints.  Fails if no sign change is found once
/// both ends have hit the global bounds.
pub fn find_bracket<F>(
    f: &mut F,
    guess: Real,
    initial_step: Real,
    lo: Real,
    hi: Real,
) -> Result<(Real, Real)>
where
    F: FnMut(Real) -> Real,
{
    cc_core::ensure!(lo < hi, "empty solver domain [{lo}, {hi}]");
    cc_core::ensure!(
        initial_step > 0.0,
        "bracket step must be positive, got {initial_step}"
    );

    let mut step = initial_step;
    loop {
        let a = (guess - step).max(lo);
        let b = (guess + step).min(hi);
        if f(a) * f(b) <= 0.0 {
            return Ok((a, b));
        }
        if a <= lo && b >= hi {
            return Err(Error::Runtime(format!(
                "no sign change in [{lo}, {hi}] around guess {guess}"
            )));
        }
        step *= 2.0;
    }
}

/// Brent's method: find the root of `f` in `[x_min, x_max]`.
///
/// Combines bisection, secant, and inverse quadratic interpolation.  The
/// endpoints must bracket a root.
pub fn brent<F>(mut f: F, x_min: Real, x_max: Real, accuracy: Real) -> Result<Real>
where
    F: FnMut(Real) -> Real,
{
    let acc = if accuracy > 0.0 {
        accuracy
    } else {
        DEFAULT_ACCURACY
    };

    let mut a = x_min;
    let mut b = x_max;
    let mut fa = f(a);
    let mut fb = f(b);

    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if fa * fb > 0.0 {
        return Err(Error::Precondition(format!(
            "root not bracketed: f({a}) = {fa}, f({b}) = {fb}"
        )));
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = b - a;
    let mut e = d;

    for _ in 0..MAX_ITERATIONS {
        if fb * fc > 0.0 {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * acc;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol || fb == 0.0 {
            return Ok(b);
        }

        if e.abs() >= tol && fa.abs() > fb.abs() {
            // Secant / inverse quadratic interpolation step
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let q0 = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q0 * (q0 - r) - (b - a) * (r - 1.0)),
                    (q0 - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            } else {
                p = -p;
            }
            if 2.0 * p < (3.0 * xm * q - (tol * q).abs()) && 2.0 * p < (e * q).abs() {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol {
            d
        } else if xm > 0.0 {
            tol
        } else {
            -tol
        };
        fb = f(b);
    }

    Err(Error::Runtime(
        "Brent solver: maximum iterations reached".into(),
    ))
}

/// Simple bisection.  Slower than [`brent`] but immune to pathological
/// residual shapes; used as a reference in tests.
pub fn bisection<F>(mut f: F, x_min: Real, x_max: Real, accuracy: Real) -> Result<Real>
where
    F: FnMut(Real) -> Real,
{
    let acc = if accuracy > 0.0 {
        accuracy
    } else {
        DEFAULT_ACCURACY
    };
    let mut a = x_min;
    let mut b = x_max;
    let fa = f(a);
    let fb = f(b);
    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if fa * fb > 0.0 {
        return Err(Error::Precondition(format!(
            "root not bracketed: f({a}) = {fa}, f({b}) = {fb}"
        )));
    }

    let mut flo = fa;
    for _ in 0..MAX_ITERATIONS {
        let mid = 0.5 * (a + b);
        let fm = f(mid);
        if fm == 0.0 || (b - a).abs() < acc {
            return Ok(mid);
        }
        if flo * fm < 0.0 {
            b = mid;
        } else {
            a = mid;
            flo = fm;
        }
    }
    Err(Error::Runtime(
        "bisection: maximum iterations reached".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn brent_finds_cubic_root() {
        let root = brent(|x| x * x * x - 2.0, 0.0, 2.0, 1e-12).unwrap();
        assert_abs_diff_eq!(root, 2.0_f64.powf(1.0 / 3.0), epsilon = 1e-10);
    }

    #[test]
    fn brent_rejects_unbracketed_root() {
        let res = brent(|x| x * x + 1.0, -1.0, 1.0, 1e-12);
        assert!(res.is_err());
    }

    #[test]
    fn bisection_matches_brent() {
        let f = |x: f64| (x - 0.3).exp() - 1.0;
        let rb = brent(f, -1.0, 1.0, 1e-10).unwrap();
        let rs = bisection(f, -1.0, 1.0, 1e-10).unwrap();
        assert_abs_diff_eq!(rb, rs, epsilon = 1e-8);
    }

    #[test]
    fn bracket_expands_until_sign_change() {
        let mut f = |x: f64| x - 0.9;
        let (a, b) = find_bracket(&mut f, 0.1, 0.05, 0.0, 2.0).unwrap();
        assert!(a <= 0.9 && 0.9 <= b);
    }

    #[test]
    fn bracket_fails_without_root() {
        let mut f = |x: f64| x + 10.0;
        assert!(find_bracket(&mut f, 0.5, 0.1, 0.0, 1.0).is_err());
    }

    proptest! {
        #[test]
        fn brent_solves_shifted_lines(root in -5.0..5.0f64, slope in 0.1..10.0f64) {
            let got = brent(|x| slope * (x - root), -10.0, 10.0, 1e-12).unwrap();
            prop_assert!((got - root).abs() < 1e-9);
        }
    }
}
