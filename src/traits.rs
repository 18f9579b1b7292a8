//! Core traits shared by classifiers and the label aligner.

use crate::error::Result;
use crate::primitives::Matrix;

/// Anything that turns a feature matrix into one integer label per row.
///
/// Implemented by classifiers whose output indices may or may not coincide
/// with ground-truth label identities. [`crate::align::LabelAligner::evaluate`]
/// consumes any implementor as an opaque producer of cluster assignments.
///
/// # Examples
///
/// ```
/// use clustalign::prelude::*;
///
/// struct Threshold(f64);
///
/// impl LabelPredictor for Threshold {
///     fn n_classes(&self) -> usize {
///         2
///     }
///
///     fn predict(&self, x: &Matrix<f64>) -> clustalign::Result<Vec<usize>> {
///         Ok(x.rows().map(|r| usize::from(r[0] > self.0)).collect())
///     }
/// }
///
/// let x = Matrix::from_vec(3, 1, vec![0.1, 0.9, 0.4]).unwrap();
/// assert_eq!(Threshold(0.5).predict(&x).unwrap(), vec![0, 1, 0]);
/// ```
pub trait LabelPredictor {
    /// Number of distinct indices `predict` can emit.
    fn n_classes(&self) -> usize;

    /// Predicts one index in `0..n_classes()` per row of `x`.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` has the wrong number of features.
    fn predict(&self, x: &Matrix<f64>) -> Result<Vec<usize>>;
}
