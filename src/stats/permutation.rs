//! Two-sample permutation test on the difference of means.
//!
//! Under the null hypothesis both samples come from the same distribution,
//! so any split of the pooled values into groups of the original sizes is
//! equally likely. The p-value is the fraction of splits whose mean
//! difference is strictly larger in magnitude than the observed one.

use crate::error::{ClustalignError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Default cap on exact enumeration (C(24, 12) = 2,704,156 is above it).
pub const DEFAULT_MAX_EXACT: usize = 1_000_000;

/// Result of a permutation test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PermutationTestResult {
    /// Observed statistic, `mean(a) - mean(b)`.
    pub statistic: f64,
    /// Fraction of resplits with `|d| > |statistic|`.
    pub pvalue: f64,
    /// Number of resplits evaluated.
    pub n_permutations: usize,
    /// Whether every split was enumerated.
    pub exact: bool,
}

/// Two-sample permutation test configuration.
///
/// Without a resample count the test enumerates every split exactly and
/// refuses when there are more than `max_exact` of them. With
/// [`Self::with_resamples`] it draws that many random splits instead.
///
/// # Examples
///
/// ```
/// use clustalign::stats::PermutationTest;
///
/// let a = [12.1, 11.8, 12.5, 12.9, 12.2];
/// let b = [10.2, 10.9, 10.1, 10.5, 10.7];
/// let result = PermutationTest::new().test(&a, &b).unwrap();
/// assert!(result.exact);
/// assert_eq!(result.n_permutations, 252);
/// assert!(result.pvalue < 0.05);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermutationTest {
    /// Largest number of splits enumerated exactly.
    max_exact: usize,
    /// Random splits to draw instead of enumerating.
    n_resamples: Option<usize>,
    /// Seed for the random splits.
    random_state: Option<u64>,
}

impl Default for PermutationTest {
    fn default() -> Self {
        Self::new()
    }
}

impl PermutationTest {
    /// Creates an exact test bounded at [`DEFAULT_MAX_EXACT`] splits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_exact: DEFAULT_MAX_EXACT,
            n_resamples: None,
            random_state: None,
        }
    }

    /// Sets the cap on exact enumeration.
    #[must_use]
    pub fn with_max_exact(mut self, max_exact: usize) -> Self {
        self.max_exact = max_exact;
        self
    }

    /// Switches to a Monte-Carlo test with `n_resamples` random splits.
    #[must_use]
    pub fn with_resamples(mut self, n_resamples: usize) -> Self {
        self.n_resamples = Some(n_resamples);
        self
    }

    /// Seeds the Monte-Carlo splits.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Runs the test on samples `a` and `b`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if either sample is empty.
    /// - `InvalidHyperparameter` if the resample count is zero.
    /// - `ComplexityLimit` if exact enumeration would exceed `max_exact`
    ///   splits.
    pub fn test(&self, a: &[f64], b: &[f64]) -> Result<PermutationTestResult> {
        if a.is_empty() || b.is_empty() {
            return Err(ClustalignError::invalid_input(format!(
                "both samples must be non-empty, got sizes {} and {}",
                a.len(),
                b.len()
            )));
        }

        let pooled: Vec<f64> = a.iter().chain(b).copied().collect();
        let total: f64 = pooled.iter().sum();
        let n = pooled.len();
        let m = a.len();
        let observed = mean_difference(a.iter().sum(), m, total, n);

        if self.n_resamples == Some(0) {
            return Err(ClustalignError::invalid_hyperparameter("n_resamples", 0, ">= 1"));
        }
        let result = match self.n_resamples {
            Some(n_resamples) => self.monte_carlo(&pooled, m, total, observed, n_resamples),
            None => {
                let n_splits = binomial(n, m)
                    .filter(|&c| c <= self.max_exact)
                    .ok_or(ClustalignError::ComplexityLimit {
                        k: binomial(n, m).unwrap_or(usize::MAX),
                        limit: self.max_exact,
                    })?;
                exact(&pooled, m, total, observed, n_splits)
            }
        };

        tracing::debug!(
            statistic = result.statistic,
            pvalue = result.pvalue,
            n_permutations = result.n_permutations,
            exact = result.exact,
            "permutation test finished"
        );
        Ok(result)
    }

    fn monte_carlo(
        &self,
        pooled: &[f64],
        m: usize,
        total: f64,
        observed: f64,
        n_resamples: usize,
    ) -> PermutationTestResult {
        let mut rng = match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut shuffled = pooled.to_vec();
        let n = pooled.len();

        let exceed = (0..n_resamples)
            .filter(|_| {
                shuffled.shuffle(&mut rng);
                let d = mean_difference(shuffled[..m].iter().sum(), m, total, n);
                d.abs() > observed.abs()
            })
            .count();

        PermutationTestResult {
            statistic: observed,
            pvalue: exceed as f64 / n_resamples as f64,
            n_permutations: n_resamples,
            exact: false,
        }
    }
}

fn exact(
    pooled: &[f64],
    m: usize,
    total: f64,
    observed: f64,
    n_splits: usize,
) -> PermutationTestResult {
    let n = pooled.len();
    let mut exceed = 0_usize;
    let mut seen = 0_usize;
    for_each_combination(n, m, |chosen| {
        let s: f64 = chosen.iter().map(|&i| pooled[i]).sum();
        if mean_difference(s, m, total, n).abs() > observed.abs() {
            exceed += 1;
        }
        seen += 1;
    });
    debug_assert_eq!(seen, n_splits);

    PermutationTestResult {
        statistic: observed,
        pvalue: exceed as f64 / seen as f64,
        n_permutations: seen,
        exact: true,
    }
}

/// `mean(group) - mean(rest)` given the group sum and the pooled total.
fn mean_difference(group_sum: f64, m: usize, total: f64, n: usize) -> f64 {
    group_sum / m as f64 - (total - group_sum) / (n - m) as f64
}

/// `C(n, k)`, or `None` on overflow.
#[must_use]
pub fn binomial(n: usize, k: usize) -> Option<usize> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    // Each partial product C(n-k+i, i) is an integer
    (1..=k).try_fold(1_usize, |acc, i| {
        acc.checked_mul(n - k + i).map(|v| v / i)
    })
}

/// Calls `visit` with every `k`-subset of `0..n`, lexicographically.
fn for_each_combination(n: usize, k: usize, mut visit: impl FnMut(&[usize])) {
    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        visit(&idx);
        // Rightmost position that can still advance
        let Some(pos) = (0..k).rev().find(|&i| idx[i] < n - k + i) else {
            return;
        };
        idx[pos] += 1;
        for j in pos + 1..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(5, 2), Some(10));
        assert_eq!(binomial(20, 10), Some(184_756));
        assert_eq!(binomial(3, 0), Some(1));
        assert_eq!(binomial(3, 4), Some(0));
        assert_eq!(binomial(200, 100), None);
    }

    #[test]
    fn test_combinations_enumerated() {
        let mut all = Vec::new();
        for_each_combination(4, 2, |c| all.push(c.to_vec()));
        assert_eq!(
            all,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
    }

    #[test]
    fn test_separated_samples_significant() {
        let a = [10.0, 11.0, 12.0, 13.0];
        let b = [0.0, 1.0, 2.0, 3.0];
        let result = PermutationTest::new().test(&a, &b).expect("valid samples");
        assert!((result.statistic - 10.0).abs() < 1e-12);
        assert_eq!(result.n_permutations, 70);
        // Only the observed split and its mirror reach |d| = 10, and
        // neither exceeds it
        assert!(result.pvalue.abs() < 1e-12);
        assert!(result.exact);
    }

    #[test]
    fn test_identical_samples_not_significant() {
        let a = [1.0, 2.0, 3.0];
        let b = [1.0, 2.0, 3.0];
        let result = PermutationTest::new().test(&a, &b).expect("valid samples");
        assert!(result.statistic.abs() < 1e-12);
        assert!(result.pvalue > 0.5);
    }

    #[test]
    fn test_pvalue_bounded() {
        let a = [0.3, -1.2, 2.5];
        let b = [0.1, 0.9, -0.4, 1.7];
        let result = PermutationTest::new().test(&a, &b).expect("valid samples");
        assert!((0.0..=1.0).contains(&result.pvalue));
    }

    #[test]
    fn test_empty_sample() {
        let result = PermutationTest::new().test(&[], &[1.0]);
        assert!(matches!(result, Err(ClustalignError::InvalidInput { .. })));
    }

    #[test]
    fn test_exact_limit() {
        let a: Vec<f64> = (0..10).map(f64::from).collect();
        let b: Vec<f64> = (10..20).map(f64::from).collect();
        let err = PermutationTest::new()
            .with_max_exact(1000)
            .test(&a, &b)
            .expect_err("C(20, 10) splits exceed the cap");
        assert_eq!(
            err,
            ClustalignError::ComplexityLimit {
                k: 184_756,
                limit: 1000
            }
        );
        assert!(err.to_string().contains("size 184756"), "{err}");
    }

    #[test]
    fn test_monte_carlo_seeded_is_reproducible() {
        let a = [1.0, 2.5, 3.1, 4.2, 2.2];
        let b = [2.0, 3.5, 4.1, 5.2, 3.9, 4.4];
        let test = PermutationTest::new()
            .with_resamples(500)
            .with_random_state(42);
        let first = test.test(&a, &b).expect("valid samples");
        let second = test.test(&a, &b).expect("valid samples");
        assert_eq!(first, second);
        assert!(!first.exact);
        assert_eq!(first.n_permutations, 500);
    }

    #[test]
    fn test_monte_carlo_tracks_exact() {
        let a = [1.0, 2.5, 3.1, 4.2, 2.2];
        let b = [2.0, 3.5, 4.1, 5.2, 3.9, 4.4];
        let exact = PermutationTest::new().test(&a, &b).expect("valid samples");
        let approx = PermutationTest::new()
            .with_resamples(20_000)
            .with_random_state(7)
            .test(&a, &b)
            .expect("valid samples");
        assert!((exact.pvalue - approx.pvalue).abs() < 0.03);
    }

    #[test]
    fn test_zero_resamples_rejected() {
        let result = PermutationTest::new().with_resamples(0).test(&[1.0], &[2.0]);
        assert!(matches!(
            result,
            Err(ClustalignError::InvalidHyperparameter { .. })
        ));
    }
}
