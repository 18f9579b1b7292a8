//! Classification metrics over integer label sequences.
//!
//! Unlike a panicking metric API, every function here validates its
//! inputs and reports contract violations as [`ClustalignError::InvalidInput`].

use crate::error::{ClustalignError, Result};
use crate::primitives::Matrix;

/// Counts positions where `y_pred` and `y_true` disagree.
///
/// # Errors
///
/// Returns `InvalidInput` if the sequences differ in length.
pub fn mismatch_count(y_pred: &[usize], y_true: &[usize]) -> Result<usize> {
    if y_pred.len() != y_true.len() {
        return Err(ClustalignError::length_mismatch(
            "y_pred/y_true",
            y_pred.len(),
            y_true.len(),
        ));
    }

    Ok(y_pred
        .iter()
        .zip(y_true.iter())
        .filter(|(p, t)| p != t)
        .count())
}

/// Fraction of misclassified samples.
///
/// error = `mismatches` / `total_predictions`, defined as `0.0` for empty
/// input.
///
/// # Errors
///
/// Returns `InvalidInput` if the sequences differ in length.
///
/// # Examples
///
/// ```
/// use clustalign::metrics::error_rate;
///
/// let y_true = vec![0, 1, 2, 0, 1, 2];
/// let y_pred = vec![0, 2, 1, 0, 0, 1];
/// let err = error_rate(&y_pred, &y_true).unwrap();
/// assert!((err - 4.0 / 6.0).abs() < 1e-12);
/// ```
pub fn error_rate(y_pred: &[usize], y_true: &[usize]) -> Result<f64> {
    let mismatches = mismatch_count(y_pred, y_true)?;
    if y_true.is_empty() {
        return Ok(0.0);
    }
    Ok(mismatches as f64 / y_true.len() as f64)
}

/// Fraction of correctly classified samples, `1 - error_rate`.
///
/// # Errors
///
/// Returns `InvalidInput` if the sequences differ in length.
pub fn accuracy(y_pred: &[usize], y_true: &[usize]) -> Result<f64> {
    error_rate(y_pred, y_true).map(|e| 1.0 - e)
}

/// Confusion matrix with true labels on rows and predictions on columns.
///
/// # Errors
///
/// Returns `InvalidInput` if the sequences differ in length or any entry
/// is outside `0..n_classes`.
///
/// # Examples
///
/// ```
/// use clustalign::metrics::confusion_matrix;
///
/// let cm = confusion_matrix(&[0, 1, 1], &[0, 0, 1], 2).unwrap();
/// assert_eq!(cm.as_slice(), &[1, 1, 0, 1]);
/// ```
pub fn confusion_matrix(
    y_pred: &[usize],
    y_true: &[usize],
    n_classes: usize,
) -> Result<Matrix<usize>> {
    if y_pred.len() != y_true.len() {
        return Err(ClustalignError::length_mismatch(
            "y_pred/y_true",
            y_pred.len(),
            y_true.len(),
        ));
    }

    let mut cm = Matrix::filled(n_classes, n_classes, 0_usize);
    for (i, (&pred, &truth)) in y_pred.iter().zip(y_true.iter()).enumerate() {
        if pred >= n_classes || truth >= n_classes {
            return Err(ClustalignError::invalid_input(format!(
                "entry ({pred}, {truth}) at position {i} outside 0..{n_classes}"
            )));
        }
        cm.set(truth, pred, cm.get(truth, pred) + 1);
    }
    Ok(cm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_rate_basic() {
        let err = error_rate(&[0, 1, 1, 0], &[0, 1, 0, 0]).expect("same length");
        assert!((err - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_error_rate_perfect() {
        let y = [2, 0, 1];
        assert!(error_rate(&y, &y).expect("same length").abs() < 1e-12);
        assert!((accuracy(&y, &y).expect("same length") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_error_rate_empty() {
        assert!(error_rate(&[], &[]).expect("empty").abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            error_rate(&[0, 1, 0], &[0, 1]),
            Err(ClustalignError::InvalidInput { .. })
        ));
        assert!(mismatch_count(&[0], &[]).is_err());
    }

    #[test]
    fn test_error_rate_bounded() {
        let y_true = [0, 1, 2, 0, 1, 2];
        let y_pred = [1, 2, 0, 1, 2, 0];
        let err = error_rate(&y_pred, &y_true).expect("same length");
        assert!((0.0..=1.0).contains(&err));
        assert!((err - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_confusion_matrix_counts() {
        let y_true = [0, 0, 1, 1, 2, 2];
        let y_pred = [0, 1, 1, 1, 2, 0];
        let cm = confusion_matrix(&y_pred, &y_true, 3).expect("valid input");
        assert_eq!(cm.shape(), (3, 3));
        assert_eq!(cm.row(0), &[1, 1, 0]);
        assert_eq!(cm.row(1), &[0, 2, 0]);
        assert_eq!(cm.row(2), &[1, 0, 1]);
        let total: usize = cm.as_slice().iter().sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn test_confusion_matrix_out_of_range() {
        assert!(confusion_matrix(&[3], &[0], 3).is_err());
        assert!(confusion_matrix(&[0], &[3], 3).is_err());
    }
}
