//! Clustalign: label alignment and small statistical-learning tools in pure Rust.
//!
//! The centrepiece is [`align`], which turns arbitrary cluster indices into
//! class predictions by searching the cluster-to-label permutation with the
//! lowest error. The remaining modules cover the surrounding workflow:
//! classifiers that produce the indices, metrics that score them, and the
//! estimation helpers used alongside.
//!
//! # Quick Start
//!
//! ```
//! use clustalign::prelude::*;
//!
//! // A clustering step numbered its clusters differently from the labels
//! let assignments = [2, 2, 0, 0, 1, 1];
//! let true_labels = [0, 0, 1, 1, 2, 2];
//!
//! let best = find_best_permutation(&assignments, &true_labels, 3).unwrap();
//! assert_eq!(best.permutation.as_slice(), &[1, 2, 0]);
//! assert_eq!(best.n_mismatches, 0);
//!
//! let predictions = apply_permutation(&assignments, &best.permutation).unwrap();
//! assert_eq!(error_rate(&predictions, &true_labels).unwrap(), 0.0);
//! ```
//!
//! # Modules
//!
//! - [`align`]: Cluster-to-label permutation search
//! - [`classification`]: Bayes rule over isotropic Gaussian mixtures
//! - [`metrics`]: Error rate, accuracy, confusion matrix
//! - [`stats`]: Permutation test, Cauchy location estimate, Gaussian likelihood
//! - [`optimize`]: Brent root finding
//! - [`preprocessing`]: Polynomial power features
//! - [`kernel`]: Pairwise distances, RBF Gram matrix, random Fourier features
//! - [`primitives`]: Row-major `Matrix`

pub mod align;
pub mod classification;
pub mod error;
pub mod kernel;
pub mod metrics;
pub mod optimize;
pub mod prelude;
pub mod preprocessing;
pub mod primitives;
pub mod stats;
pub mod traits;

pub use error::{ClustalignError, Result};
pub use primitives::Matrix;
pub use traits::LabelPredictor;
