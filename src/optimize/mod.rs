//! Scalar root finding.
//!
//! - [`brentq`]: Brent's method on a bracketing interval

use crate::error::{ClustalignError, Result};
use serde::{Deserialize, Serialize};

/// Stopping criteria for [`brentq`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrentOptions {
    /// Absolute tolerance on the root.
    pub xtol: f64,
    /// Relative tolerance on the root.
    pub rtol: f64,
    /// Maximum number of iterations.
    pub max_iter: usize,
}

impl Default for BrentOptions {
    fn default() -> Self {
        Self {
            xtol: 2e-12,
            rtol: 4.0 * f64::EPSILON,
            max_iter: 100,
        }
    }
}

impl BrentOptions {
    /// Sets the absolute tolerance.
    #[must_use]
    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.xtol = xtol;
        self
    }

    /// Sets the relative tolerance.
    #[must_use]
    pub fn with_rtol(mut self, rtol: f64) -> Self {
        self.rtol = rtol;
        self
    }

    /// Sets the iteration limit.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }
}

/// Converged root with solver statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootResult {
    /// Location of the root.
    pub root: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Number of function evaluations.
    pub function_calls: usize,
}

/// Finds a root of `f` in `[a, b]` with Brent's method.
///
/// Combines bisection with secant and inverse quadratic steps, falling
/// back to bisection whenever an interpolated step would not shrink the
/// bracket fast enough.
///
/// # Errors
///
/// - `InvalidInput` if `f(a)` and `f(b)` have the same sign, or either is
///   not finite.
/// - `InvalidHyperparameter` for non-positive tolerances.
/// - `ConvergenceFailure` if `max_iter` is reached.
///
/// # Examples
///
/// ```
/// use clustalign::optimize::{brentq, BrentOptions};
///
/// let r = brentq(|x| x * x - 2.0, 0.0, 2.0, BrentOptions::default()).unwrap();
/// assert!((r.root - 2f64.sqrt()).abs() < 1e-10);
/// ```
pub fn brentq<F>(mut f: F, a: f64, b: f64, options: BrentOptions) -> Result<RootResult>
where
    F: FnMut(f64) -> f64,
{
    if options.xtol <= 0.0 {
        return Err(ClustalignError::invalid_hyperparameter(
            "xtol",
            options.xtol,
            "> 0",
        ));
    }
    if options.rtol < 0.0 {
        return Err(ClustalignError::invalid_hyperparameter(
            "rtol",
            options.rtol,
            ">= 0",
        ));
    }

    let (mut xpre, mut xcur) = (a, b);
    let (mut fpre, mut fcur) = (f(xpre), f(xcur));
    let mut function_calls = 2;

    if !(fpre.is_finite() && fcur.is_finite()) {
        return Err(ClustalignError::invalid_input(format!(
            "f is not finite at the bracket ends: f({a}) = {fpre}, f({b}) = {fcur}"
        )));
    }
    if fpre * fcur > 0.0 {
        return Err(ClustalignError::invalid_input(format!(
            "f({a}) = {fpre} and f({b}) = {fcur} must have different signs"
        )));
    }
    if fpre == 0.0 {
        return Ok(RootResult {
            root: xpre,
            iterations: 0,
            function_calls,
        });
    }
    if fcur == 0.0 {
        return Ok(RootResult {
            root: xcur,
            iterations: 0,
            function_calls,
        });
    }

    // Contrapoint `xblk` keeps the root bracketed between it and `xcur`
    let (mut xblk, mut fblk) = (0.0, 0.0);
    let (mut spre, mut scur) = (0.0_f64, 0.0_f64);

    for iteration in 1..=options.max_iter {
        if fpre != 0.0 && fcur != 0.0 && fpre.is_sign_negative() != fcur.is_sign_negative() {
            xblk = xpre;
            fblk = fpre;
            scur = xcur - xpre;
            spre = scur;
        }
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;
            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let delta = (options.xtol + options.rtol * xcur.abs()) / 2.0;
        let sbis = (xblk - xcur) / 2.0;
        if fcur == 0.0 || sbis.abs() < delta {
            tracing::trace!(root = xcur, iterations = iteration, "brentq converged");
            return Ok(RootResult {
                root: xcur,
                iterations: iteration,
                function_calls,
            });
        }

        if spre.abs() > delta && fcur.abs() < fpre.abs() {
            let stry = if xpre == xblk {
                // Secant
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                // Inverse quadratic
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
            };
            if 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - delta) {
                spre = scur;
                scur = stry;
            } else {
                spre = sbis;
                scur = sbis;
            }
        } else {
            spre = sbis;
            scur = sbis;
        }

        xpre = xcur;
        fpre = fcur;
        if scur.abs() > delta {
            xcur += scur;
        } else {
            xcur += if sbis > 0.0 { delta } else { -delta };
        }
        fcur = f(xcur);
        function_calls += 1;
    }

    Err(ClustalignError::ConvergenceFailure {
        iterations: options.max_iter,
        residual: (xblk - xcur).abs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqrt_two() {
        let r = brentq(|x| x * x - 2.0, 0.0, 2.0, BrentOptions::default()).expect("bracketed");
        assert!((r.root - std::f64::consts::SQRT_2).abs() < 1e-10);
        assert!(r.iterations > 0);
        assert!(r.function_calls >= 2);
    }

    #[test]
    fn test_reversed_bracket() {
        let r = brentq(|x| x - 1.0, 3.0, -3.0, BrentOptions::default()).expect("bracketed");
        assert!((r.root - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_root_at_endpoint() {
        let r = brentq(|x| x, 0.0, 1.0, BrentOptions::default()).expect("bracketed");
        assert!(r.root.abs() < 1e-15);
        assert_eq!(r.iterations, 0);
    }

    #[test]
    fn test_transcendental() {
        let r = brentq(|x| x.cos() - x, 0.0, 1.0, BrentOptions::default()).expect("bracketed");
        assert!((r.root.cos() - r.root).abs() < 1e-10);
    }

    #[test]
    fn test_not_bracketed() {
        let result = brentq(|x| x * x + 1.0, -1.0, 1.0, BrentOptions::default());
        assert!(matches!(result, Err(ClustalignError::InvalidInput { .. })));
    }

    #[test]
    fn test_non_finite_endpoint() {
        let result = brentq(|x| 1.0 / x, 0.0, 1.0, BrentOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_iteration_limit() {
        let options = BrentOptions::default().with_max_iter(1);
        let result = brentq(|x| x.powi(3) - 0.3, -10.0, 10.0, options);
        assert!(matches!(
            result,
            Err(ClustalignError::ConvergenceFailure { iterations: 1, .. })
        ));
    }

    #[test]
    fn test_bad_tolerance() {
        let options = BrentOptions::default().with_xtol(0.0);
        assert!(brentq(|x| x, -1.0, 1.0, options).is_err());
        let options = BrentOptions::default().with_rtol(-1.0);
        assert!(brentq(|x| x, -1.0, 1.0, options).is_err());
    }

    #[test]
    fn test_loose_tolerance_stops_early() {
        let tight = brentq(|x| x.exp() - 3.0, 0.0, 2.0, BrentOptions::default())
            .expect("bracketed");
        let loose = brentq(
            |x| x.exp() - 3.0,
            0.0,
            2.0,
            BrentOptions::default().with_xtol(1e-2),
        )
        .expect("bracketed");
        assert!(loose.iterations <= tight.iterations);
        assert!((loose.root - 3f64.ln()).abs() < 1e-2);
    }
}
