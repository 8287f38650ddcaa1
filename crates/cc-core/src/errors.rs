//! Error types for curvecal.
//!
//! Structural problems (bad arguments, violated preconditions, duplicate
//! pillar dates) are surfaced through this enum; ordinary non-convergence of
//! a fit is *not* an error and travels through the fitter's status enum
//! instead.

use thiserror::Error;

/// The top-level error type used throughout curvecal.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Two calibration instruments share the same curve date — unsolvable
    /// by sequential bootstrap.
    #[error("duplicate curve date {0} among calibration instruments")]
    DuplicatePillar(String),

    /// No pricer is registered for a product type; calibration-consistent
    /// pricing is mandatory, so this is reportable rather than silent.
    #[error("no pricer available for product type '{0}'")]
    MissingPricer(String),

    /// A referenced curve id is not present in the registry.
    #[error("unknown curve id curve#{0}")]
    UnknownCurve(u64),
}

/// Shorthand `Result` type used throughout curvecal.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use cc_core::ensure;
/// fn positive(x: f64) -> cc_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use cc_core::fail;
/// fn always_err() -> cc_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn needs_sorted(v: &[f64]) -> Result<()> {
        crate::ensure!(v.windows(2).all(|w| w[0] <= w[1]), "input not sorted");
        Ok(())
    }

    #[test]
    fn ensure_macro_rejects() {
        assert!(needs_sorted(&[1.0, 2.0]).is_ok());
        let err = needs_sorted(&[2.0, 1.0]).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
    }

    #[test]
    fn display_messages() {
        let e = Error::DuplicatePillar("2026-06-30".into());
        assert!(e.to_string().contains("2026-06-30"));
        let e = Error::MissingPricer("basis-swap".into());
        assert!(e.to_string().contains("basis-swap"));
        // Curve ids render as `curve#N` wherever they appear.
        let e = Error::UnknownCurve(7);
        assert!(e.to_string().contains("curve#7"));
    }
}
