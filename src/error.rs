//! Error types for clustalign operations.
//!
//! Every fallible operation in the crate returns [`Result`], so callers can
//! match on the caller-contract violation that occurred.

use thiserror::Error;

/// Main error type for clustalign operations.
///
/// # Examples
///
/// ```
/// use clustalign::error::ClustalignError;
///
/// let err = ClustalignError::ComplexityLimit { k: 12, limit: 10 };
/// assert!(err.to_string().contains("12"));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClustalignError {
    /// Input sequences of mismatched length, or out-of-range indices.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input
        message: String,
    },

    /// Exhaustive enumeration requested beyond the configured bound.
    ///
    /// `k` is the class count for label alignment and the number of
    /// sample splits for an exact permutation test.
    #[error("Complexity limit exceeded: size {k} is above the exhaustive search limit of {limit}")]
    ComplexityLimit {
        /// Offending number of classes (or combinations)
        k: usize,
        /// Configured bound
        limit: usize,
    },

    /// Matrix/vector dimensions don't match for the operation.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Invalid hyperparameter value provided.
    #[error("Invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Iterative solver failed to converge within its iteration limit.
    #[error("Convergence failure after {iterations} iterations, residual = {residual}")]
    ConvergenceFailure {
        /// Number of iterations attempted
        iterations: usize,
        /// Final bracket width or residual
        residual: f64,
    },
}

impl ClustalignError {
    /// Shorthand for [`ClustalignError::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Shorthand for [`ClustalignError::InvalidHyperparameter`].
    pub fn invalid_hyperparameter(param: &str, value: impl ToString, constraint: &str) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }

    /// Builds a length-mismatch [`ClustalignError::InvalidInput`].
    pub(crate) fn length_mismatch(what: &str, left: usize, right: usize) -> Self {
        Self::invalid_input(format!("{what} length mismatch: {left} vs {right}"))
    }
}

/// Convenience type alias for Results with [`ClustalignError`].
pub type Result<T> = std::result::Result<T, ClustalignError>;
