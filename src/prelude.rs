//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use clustalign::prelude::*;
//! ```

pub use crate::align::{
    apply_permutation, find_best_permutation, Alignment, LabelAligner, Permutation,
};
pub use crate::classification::MixtureBayes;
pub use crate::error::ClustalignError;
pub use crate::metrics::{accuracy, confusion_matrix, error_rate};
pub use crate::primitives::Matrix;
pub use crate::traits::LabelPredictor;
