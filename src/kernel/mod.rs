//! Gaussian (RBF) kernels and their random-feature approximation.
//!
//! [`RandomFourierFeatures`] maps samples into a randomized cosine basis
//! whose inner products approximate [`rbf_gram`] (random kitchen sinks,
//! Rahimi & Recht 2007).

use crate::error::{ClustalignError, Result};
use crate::primitives::Matrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Condensed Euclidean distances between all row pairs.
///
/// Pairs are ordered `(0,1), (0,2), ..., (0,n-1), (1,2), ..., (n-2,n-1)`,
/// giving `n (n - 1) / 2` entries.
///
/// # Examples
///
/// ```
/// use clustalign::kernel::pairwise_distances;
/// use clustalign::primitives::Matrix;
///
/// let x = Matrix::from_vec(3, 2, vec![0.0, 0.0, 3.0, 4.0, 0.0, 1.0]).unwrap();
/// assert_eq!(pairwise_distances(&x), vec![5.0, 1.0, 18f64.sqrt()]);
/// ```
#[must_use]
pub fn pairwise_distances(x: &Matrix<f64>) -> Vec<f64> {
    let n = x.n_rows();
    let mut out = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in i + 1..n {
            out.push(squared_distance(x.row(i), x.row(j)).sqrt());
        }
    }
    out
}

/// Gram matrix of the Gaussian kernel `exp(-gamma ||x_i - x_j||²)`.
///
/// # Errors
///
/// Returns `InvalidHyperparameter` if `gamma` is not finite and positive.
pub fn rbf_gram(x: &Matrix<f64>, gamma: f64) -> Result<Matrix<f64>> {
    check_gamma(gamma)?;
    let n = x.n_rows();
    let mut gram = Matrix::zeros(n, n);
    for i in 0..n {
        gram.set(i, i, 1.0);
        for j in i + 1..n {
            let k = (-gamma * squared_distance(x.row(i), x.row(j))).exp();
            gram.set(i, j, k);
            gram.set(j, i, k);
        }
    }
    Ok(gram)
}

fn check_gamma(gamma: f64) -> Result<()> {
    if gamma.is_finite() && gamma > 0.0 {
        Ok(())
    } else {
        Err(ClustalignError::invalid_hyperparameter(
            "gamma",
            gamma,
            "finite and > 0",
        ))
    }
}

/// Random Fourier feature map approximating the Gaussian kernel.
///
/// `z(x) = sqrt(2 / D) cos(x W + b)` with `W ~ N(0, 2 gamma)` and
/// `b ~ U[0, 2π)`, so that `z(x) · z(y) ≈ exp(-gamma ||x - y||²)`.
///
/// # Examples
///
/// ```
/// use clustalign::kernel::RandomFourierFeatures;
/// use clustalign::primitives::Matrix;
///
/// let x = Matrix::from_vec(2, 3, vec![0.0, 0.1, 0.2, 1.0, 1.1, 1.2]).unwrap();
/// let mut rff = RandomFourierFeatures::new(64, 0.5).with_random_state(1);
/// let z = rff.fit_transform(&x).unwrap();
/// assert_eq!(z.shape(), (2, 64));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RandomFourierFeaturesRepr")]
pub struct RandomFourierFeatures {
    /// Number of random features D.
    n_components: usize,
    /// Kernel bandwidth parameter.
    gamma: f64,
    /// Random seed for the projection.
    random_state: Option<u64>,
    /// Projection matrix (`n_features x n_components`) after fitting.
    weights: Option<Matrix<f64>>,
    /// Phase offsets after fitting.
    offsets: Option<Vec<f64>>,
}

#[derive(Deserialize)]
struct RandomFourierFeaturesRepr {
    n_components: usize,
    gamma: f64,
    random_state: Option<u64>,
    weights: Option<Matrix<f64>>,
    offsets: Option<Vec<f64>>,
}

impl TryFrom<RandomFourierFeaturesRepr> for RandomFourierFeatures {
    type Error = ClustalignError;

    fn try_from(repr: RandomFourierFeaturesRepr) -> Result<Self> {
        check_components(repr.n_components)?;
        check_gamma(repr.gamma)?;
        let n = repr.n_components;
        let weight_cols = repr.weights.as_ref().map(Matrix::n_cols);
        let n_offsets = repr.offsets.as_ref().map(Vec::len);
        let consistent = match (weight_cols, n_offsets) {
            (None, None) => true,
            (Some(cols), Some(len)) => cols == n && len == n,
            _ => false,
        };
        if !consistent {
            return Err(ClustalignError::DimensionMismatch {
                expected: format!("no projection, or {n} weight columns and {n} offsets"),
                actual: format!("{weight_cols:?} weight columns and {n_offsets:?} offsets"),
            });
        }
        Ok(Self {
            n_components: repr.n_components,
            gamma: repr.gamma,
            random_state: repr.random_state,
            weights: repr.weights,
            offsets: repr.offsets,
        })
    }
}

fn check_components(n_components: usize) -> Result<()> {
    if n_components == 0 {
        Err(ClustalignError::invalid_hyperparameter(
            "n_components",
            0,
            ">= 1",
        ))
    } else {
        Ok(())
    }
}

impl RandomFourierFeatures {
    /// Creates an unfitted map with `n_components` features.
    #[must_use]
    pub fn new(n_components: usize, gamma: f64) -> Self {
        Self {
            n_components,
            gamma,
            random_state: None,
            weights: None,
            offsets: None,
        }
    }

    /// Sets the random seed.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Number of output features.
    #[must_use]
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Whether [`Self::fit`] has been called.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.weights.is_some()
    }

    /// Draws the projection for inputs with `n_features` columns.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` if `n_components` is zero or `gamma`
    /// is not finite and positive.
    pub fn fit(&mut self, n_features: usize) -> Result<()> {
        check_components(self.n_components)?;
        check_gamma(self.gamma)?;

        let mut rng = match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let std = (2.0 * self.gamma).sqrt();
        let weights: Vec<f64> = (0..n_features * self.n_components)
            .map(|_| std * standard_normal(&mut rng))
            .collect();
        let offsets: Vec<f64> = (0..self.n_components)
            .map(|_| rng.gen_range(0.0..2.0 * PI))
            .collect();

        self.weights = Some(Matrix::from_vec(n_features, self.n_components, weights)?);
        self.offsets = Some(offsets);
        tracing::debug!(
            n_features,
            n_components = self.n_components,
            gamma = self.gamma,
            "random Fourier projection drawn"
        );
        Ok(())
    }

    /// Maps `x` into the random feature space.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if called before [`Self::fit`].
    /// - `DimensionMismatch` if `x` has a different feature count than
    ///   the fitted projection.
    pub fn transform(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        let (Some(weights), Some(offsets)) = (&self.weights, &self.offsets) else {
            return Err(ClustalignError::invalid_input(
                "RandomFourierFeatures must be fitted before transform",
            ));
        };
        if x.n_cols() != weights.n_rows() {
            return Err(ClustalignError::DimensionMismatch {
                expected: format!("{} features", weights.n_rows()),
                actual: format!("{} features", x.n_cols()),
            });
        }

        let projected = x.matmul(weights)?;
        let scale = (2.0 / self.n_components as f64).sqrt();
        let data = projected
            .rows()
            .flat_map(|row| {
                row.iter()
                    .zip(offsets)
                    .map(move |(&p, &b)| scale * (p + b).cos())
            })
            .collect();
        Matrix::from_vec(x.n_rows(), self.n_components, data)
    }

    /// Fits on `x`'s feature count, then transforms `x`.
    ///
    /// # Errors
    ///
    /// See [`Self::fit`] and [`Self::transform`].
    pub fn fit_transform(&mut self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        self.fit(x.n_cols())?;
        self.transform(x)
    }
}

/// Samples N(0, 1) with the Box-Muller transform.
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
