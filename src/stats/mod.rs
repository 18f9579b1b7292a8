//! Statistical estimation and hypothesis testing.
//!
//! - [`PermutationTest`]: exact or Monte-Carlo two-sample test
//! - [`cauchy_location_mle`]: maximum-likelihood location of Cauchy samples
//! - [`linear_gaussian_likelihood`]: likelihood of `y = m x + noise`

mod permutation;

pub use permutation::{binomial, PermutationTest, PermutationTestResult, DEFAULT_MAX_EXACT};

use crate::error::{ClustalignError, Result};
use crate::optimize::{brentq, BrentOptions};
use std::f64::consts::PI;

/// Score (derivative of the log-likelihood) of Cauchy samples with
/// location `alpha` and scale `beta`.
///
/// `2 Σ (x - α) / (β² + (x - α)²)`
#[must_use]
pub fn cauchy_score(samples: &[f64], alpha: f64, beta: f64) -> f64 {
    let beta_sq = beta * beta;
    2.0 * samples
        .iter()
        .map(|&x| {
            let r = x - alpha;
            r / (beta_sq + r * r)
        })
        .sum::<f64>()
}

/// Maximum-likelihood location of Cauchy samples with known scale.
///
/// Solves `cauchy_score(samples, α, beta) = 0` for `α` inside `bracket`
/// with Brent's method. This is the lighthouse problem: flashes recorded
/// along a shore at `x = α + β tan θ` for uniform angles `θ`.
///
/// # Errors
///
/// - `InvalidInput` if `samples` is empty or the score does not change
///   sign over `bracket`.
/// - `InvalidHyperparameter` if `beta` is not finite and positive.
///
/// # Examples
///
/// ```
/// use clustalign::stats::cauchy_location_mle;
///
/// let alpha = cauchy_location_mle(&[28.0, 30.0, 32.0], 5.0, (-90.0, 90.0)).unwrap();
/// assert!((alpha - 30.0).abs() < 1e-8);
/// ```
pub fn cauchy_location_mle(samples: &[f64], beta: f64, bracket: (f64, f64)) -> Result<f64> {
    if samples.is_empty() {
        return Err(ClustalignError::invalid_input("samples must be non-empty"));
    }
    if !(beta.is_finite() && beta > 0.0) {
        return Err(ClustalignError::invalid_hyperparameter(
            "beta",
            beta,
            "finite and > 0",
        ));
    }

    let result = brentq(
        |alpha| cauchy_score(samples, alpha, beta),
        bracket.0,
        bracket.1,
        BrentOptions::default(),
    )?;
    Ok(result.root)
}

/// Likelihood of `y` under `y = m x + ε`, `ε ~ N(0, d)` i.i.d.
///
/// `exp(-||y - m x||² / (2d)) / sqrt(2π d)`, with the residual taken as a
/// whole vector as in the regression exercise it comes from.
///
/// # Errors
///
/// - `InvalidInput` if `x` and `y` differ in length.
/// - `InvalidHyperparameter` if `d` is not finite and positive.
pub fn linear_gaussian_likelihood(x: &[f64], y: &[f64], m: f64, d: f64) -> Result<f64> {
    if x.len() != y.len() {
        return Err(ClustalignError::length_mismatch("x/y", x.len(), y.len()));
    }
    if !(d.is_finite() && d > 0.0) {
        return Err(ClustalignError::invalid_hyperparameter(
            "d",
            d,
            "finite and > 0",
        ));
    }

    let rss: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| (yi - m * xi).powi(2))
        .sum();
    Ok((-rss / (2.0 * d)).exp() / (2.0 * PI * d).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cauchy_symmetric_samples() {
        let alpha = cauchy_location_mle(&[25.0, 28.0, 30.0, 32.0, 35.0], 5.0, (-90.0, 90.0))
            .expect("bracketed");
        assert!((alpha - 30.0).abs() < 1e-8);
    }

    #[test]
    fn test_cauchy_root_zeroes_score() {
        let samples = [3.0, -1.5, 0.4, 12.0, 1.1, 0.9];
        let alpha = cauchy_location_mle(&samples, 1.0, (-50.0, 50.0)).expect("bracketed");
        assert!(cauchy_score(&samples, alpha, 1.0).abs() < 1e-8);
        assert!((-50.0..=50.0).contains(&alpha));
    }

    #[test]
    fn test_cauchy_rejects_bad_input() {
        assert!(cauchy_location_mle(&[], 1.0, (-1.0, 1.0)).is_err());
        assert!(cauchy_location_mle(&[0.0], 0.0, (-1.0, 1.0)).is_err());
        // Bracket entirely on one side of the only sample
        assert!(cauchy_location_mle(&[0.0], 1.0, (5.0, 10.0)).is_err());
    }

    #[test]
    fn test_likelihood_perfect_fit() {
        let x = [1.0, 2.0, 3.0];
        let y = [2.0, 4.0, 6.0];
        let p = linear_gaussian_likelihood(&x, &y, 2.0, 1.0).expect("valid input");
        assert!((p - 1.0 / (2.0 * PI).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_likelihood_peaks_at_true_slope() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [0.5, 1.1, 1.4, 2.1];
        let at = |m| linear_gaussian_likelihood(&x, &y, m, 0.5).expect("valid input");
        assert!(at(0.5) > at(0.2));
        assert!(at(0.5) > at(1.0));
    }

    #[test]
    fn test_likelihood_rejects_bad_input() {
        assert!(linear_gaussian_likelihood(&[1.0], &[], 1.0, 1.0).is_err());
        assert!(linear_gaussian_likelihood(&[1.0], &[1.0], 1.0, -1.0).is_err());
    }
}
