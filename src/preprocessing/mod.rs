//! Feature construction for polynomial regression.
//!
//! # Example
//!
//! ```
//! use clustalign::preprocessing::power_features;
//!
//! let x = [1.0, 2.0, 3.0];
//! let features = power_features(&x, 2).unwrap();
//!
//! // Columns are x^0, x^1, x^2
//! assert_eq!(features.shape(), (3, 3));
//! assert_eq!(features.row(2), &[1.0, 3.0, 9.0]);
//! ```

use crate::error::{ClustalignError, Result};
use crate::primitives::Matrix;

/// Largest supported power; higher degrees are numerically meaningless.
pub const MAX_POWER: usize = 64;

/// Builds the design matrix `[x^0, x^1, ..., x^max_power]`.
///
/// Row `i` holds the powers of `x[i]`; column 0 is the constant term.
///
/// # Errors
///
/// Returns `InvalidHyperparameter` if `max_power` exceeds [`MAX_POWER`].
pub fn power_features(x: &[f64], max_power: usize) -> Result<Matrix<f64>> {
    if max_power > MAX_POWER {
        return Err(ClustalignError::invalid_hyperparameter(
            "max_power",
            max_power,
            &format!("<= {MAX_POWER}"),
        ));
    }

    let cols = max_power + 1;
    let mut data = Vec::with_capacity(x.len() * cols);
    for &xi in x {
        let mut power = 1.0;
        for _ in 0..cols {
            data.push(power);
            power *= xi;
        }
    }
    Matrix::from_vec(x.len(), cols, data)
}
