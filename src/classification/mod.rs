//! Bayes decision rule for classes modelled as isotropic Gaussian mixtures.
//!
//! Each class is a mixture of equally weighted Gaussian bumps centred on a
//! set of centroids, all sharing one variance. A sample is assigned to the
//! class whose mixture density at that point is largest (equal class
//! priors).

use crate::error::{ClustalignError, Result};
use crate::primitives::Matrix;
use crate::traits::LabelPredictor;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Bayes classifier over per-class isotropic Gaussian mixtures.
///
/// # Examples
///
/// ```
/// use clustalign::prelude::*;
///
/// let class0 = Matrix::from_vec(2, 2, vec![0.0, 0.0, 0.0, 1.0]).unwrap();
/// let class1 = Matrix::from_vec(1, 2, vec![5.0, 5.0]).unwrap();
/// let model = MixtureBayes::new(vec![class0, class1], 0.2).unwrap();
///
/// let x = Matrix::from_vec(2, 2, vec![0.1, 0.4, 4.8, 5.2]).unwrap();
/// assert_eq!(model.predict(&x).unwrap(), vec![0, 1]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MixtureBayesRepr")]
pub struct MixtureBayes {
    /// Centroids of each class, one centroid per row.
    class_centroids: Vec<Matrix<f64>>,
    /// Shared isotropic variance.
    var: f64,
}

#[derive(Deserialize)]
struct MixtureBayesRepr {
    class_centroids: Vec<Matrix<f64>>,
    var: f64,
}

impl TryFrom<MixtureBayesRepr> for MixtureBayes {
    type Error = ClustalignError;

    fn try_from(repr: MixtureBayesRepr) -> Result<Self> {
        Self::new(repr.class_centroids, repr.var)
    }
}

impl MixtureBayes {
    /// Creates a classifier from per-class centroid sets.
    ///
    /// # Errors
    ///
    /// - `InvalidHyperparameter` if there are no classes, a class has no
    ///   centroids, or `var` is not finite and positive.
    /// - `DimensionMismatch` if classes disagree on the feature count.
    pub fn new(class_centroids: Vec<Matrix<f64>>, var: f64) -> Result<Self> {
        if !(var.is_finite() && var > 0.0) {
            return Err(ClustalignError::invalid_hyperparameter(
                "var",
                var,
                "finite and > 0",
            ));
        }
        if class_centroids.is_empty() {
            return Err(ClustalignError::invalid_hyperparameter(
                "class_centroids",
                "[]",
                "at least one class",
            ));
        }

        let n_features = class_centroids[0].n_cols();
        for (class, centroids) in class_centroids.iter().enumerate() {
            if centroids.n_rows() == 0 {
                return Err(ClustalignError::invalid_hyperparameter(
                    "class_centroids",
                    format!("class {class} with 0 centroids"),
                    "at least one centroid per class",
                ));
            }
            if centroids.n_cols() != n_features {
                return Err(ClustalignError::DimensionMismatch {
                    expected: format!("{n_features} features"),
                    actual: format!("{} features in class {class}", centroids.n_cols()),
                });
            }
        }

        Ok(Self {
            class_centroids,
            var,
        })
    }

    /// Shared variance.
    #[must_use]
    pub fn var(&self) -> f64 {
        self.var
    }

    /// Number of input features.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.class_centroids.first().map_or(0, Matrix::n_cols)
    }

    /// Mixture density of `class` at point `x`.
    ///
    /// `Σ_j exp(-||x - m_j||² / (2 var)) / sqrt(2π var)`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unknown class and `DimensionMismatch`
    /// if `x` has the wrong length.
    pub fn class_density(&self, x: &[f64], class: usize) -> Result<f64> {
        let centroids = self.class_centroids.get(class).ok_or_else(|| {
            ClustalignError::invalid_input(format!(
                "class {class} outside 0..{}",
                self.class_centroids.len()
            ))
        })?;
        self.check_features(x.len())?;
        Ok(mixture_density(x, centroids, self.var))
    }

    /// Per-sample, per-class densities (`n_samples x n_classes`).
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `x` has the wrong number of columns.
    pub fn predict_densities(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        self.check_features(x.n_cols())?;
        let k = self.class_centroids.len();
        let mut out = Matrix::zeros(x.n_rows(), k);
        for (i, row) in x.rows().enumerate() {
            for (c, centroids) in self.class_centroids.iter().enumerate() {
                out.set(i, c, mixture_density(row, centroids, self.var));
            }
        }
        Ok(out)
    }

    fn check_features(&self, n: usize) -> Result<()> {
        if n == self.n_features() {
            Ok(())
        } else {
            Err(ClustalignError::DimensionMismatch {
                expected: format!("{} features", self.n_features()),
                actual: format!("{n} features"),
            })
        }
    }
}

impl LabelPredictor for MixtureBayes {
    fn n_classes(&self) -> usize {
        self.class_centroids.len()
    }

    /// Picks the class with the largest density; ties go to the lower class.
    fn predict(&self, x: &Matrix<f64>) -> Result<Vec<usize>> {
        let densities = self.predict_densities(x)?;
        Ok(densities
            .rows()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |(best, best_p), (c, &p)| {
                        if p > best_p {
                            (c, p)
                        } else {
                            (best, best_p)
                        }
                    })
                    .0
            })
            .collect())
    }
}

fn mixture_density(x: &[f64], centroids: &Matrix<f64>, var: f64) -> f64 {
    let norm = (2.0 * PI * var).sqrt();
    centroids
        .rows()
        .map(|m| {
            let sq: f64 = x.iter().zip(m).map(|(a, b)| (a - b).powi(2)).sum();
            (-0.5 * sq / var).exp() / norm
        })
        .sum()
}
