//! Label alignment for clustering-based classification.
//!
//! Unsupervised methods (k-means, Gaussian mixtures, ...) emit cluster
//! indices whose numbering has no relation to the ground-truth class
//! identities. The aligner searches every bijection from cluster index to
//! label and keeps the one with the fewest disagreements.
//!
//! # Example
//!
//! ```
//! use clustalign::align::{apply_permutation, find_best_permutation};
//!
//! let assignments = [0, 0, 1, 1, 2, 2];
//! let true_labels = [1, 1, 2, 2, 0, 0];
//!
//! let best = find_best_permutation(&assignments, &true_labels, 3).unwrap();
//! assert_eq!(best.permutation.as_slice(), &[1, 2, 0]);
//! assert_eq!(best.error_rate, 0.0);
//!
//! let relabeled = apply_permutation(&assignments, &best.permutation).unwrap();
//! assert_eq!(relabeled, true_labels);
//! ```

mod permutations;

pub use permutations::{factorial, nth_permutation, Permutations};

use crate::error::{ClustalignError, Result};
use crate::primitives::Matrix;
use crate::traits::LabelPredictor;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Default bound on K for exhaustive search (10! = 3,628,800 candidates).
pub const DEFAULT_MAX_CLASSES: usize = 10;

/// Below this K the parallel search is not worth the thread-pool overhead.
const PARALLEL_MIN_CLASSES: usize = 6;

/// A bijective mapping from cluster index to class label.
///
/// Entry `i` holds the label assigned to cluster `i`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// Creates a permutation from its image table.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` unless `mapping` contains each of
    /// `0..mapping.len()` exactly once.
    pub fn new(mapping: Vec<usize>) -> Result<Self> {
        let k = mapping.len();
        let mut seen = vec![false; k];
        for &label in &mapping {
            if label >= k {
                return Err(ClustalignError::invalid_input(format!(
                    "permutation entry {label} outside 0..{k}"
                )));
            }
            if std::mem::replace(&mut seen[label], true) {
                return Err(ClustalignError::invalid_input(format!(
                    "permutation entry {label} appears more than once"
                )));
            }
        }
        Ok(Self(mapping))
    }

    /// The identity permutation over `0..k`.
    #[must_use]
    pub fn identity(k: usize) -> Self {
        Self((0..k).collect())
    }

    /// Size of the domain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the domain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Label assigned to `cluster`, or `None` outside the domain.
    #[must_use]
    pub fn get(&self, cluster: usize) -> Option<usize> {
        self.0.get(cluster).copied()
    }

    /// Image table as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Whether this is the identity mapping.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, &l)| i == l)
    }
}

impl AsRef<[usize]> for Permutation {
    fn as_ref(&self) -> &[usize] {
        &self.0
    }
}

impl TryFrom<Vec<usize>> for Permutation {
    type Error = ClustalignError;

    fn try_from(mapping: Vec<usize>) -> Result<Self> {
        Self::new(mapping)
    }
}

impl From<Permutation> for Vec<usize> {
    fn from(p: Permutation) -> Self {
        p.0
    }
}

/// Outcome of a label alignment search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    /// Best cluster-to-label mapping found.
    pub permutation: Permutation,
    /// Fraction of samples misclassified under `permutation`, in `[0, 1]`.
    pub error_rate: f64,
    /// Number of samples misclassified under `permutation`.
    pub n_mismatches: usize,
    /// Number of samples compared.
    pub n_samples: usize,
    /// Number of candidate permutations scored (always `K!`).
    pub n_candidates: usize,
}

impl Alignment {
    /// `1 - error_rate`.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        1.0 - self.error_rate
    }

    /// Relabels `assignments` with the best permutation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if an assignment is outside `0..K`.
    pub fn relabel(&self, assignments: &[usize]) -> Result<Vec<usize>> {
        apply_permutation(assignments, &self.permutation)
    }
}

/// Exhaustive cluster-to-label alignment search.
///
/// # Examples
///
/// ```
/// use clustalign::align::LabelAligner;
///
/// let aligner = LabelAligner::new().with_max_classes(6).with_parallel(true);
/// let best = aligner.align(&[1, 1, 0, 0], &[0, 0, 1, 1], 2).unwrap();
/// assert_eq!(best.permutation.as_slice(), &[1, 0]);
/// assert_eq!(best.n_candidates, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelAligner {
    /// Largest K for which exhaustive enumeration is attempted.
    max_classes: usize,
    /// Score candidates on the rayon thread pool.
    parallel: bool,
}

impl Default for LabelAligner {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelAligner {
    /// Creates a sequential aligner bounded at [`DEFAULT_MAX_CLASSES`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_classes: DEFAULT_MAX_CLASSES,
            parallel: false,
        }
    }

    /// Sets the largest K accepted for exhaustive search.
    #[must_use]
    pub fn with_max_classes(mut self, max_classes: usize) -> Self {
        self.max_classes = max_classes;
        self
    }

    /// Enables or disables parallel candidate scoring.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Largest K accepted for exhaustive search.
    #[must_use]
    pub fn max_classes(&self) -> usize {
        self.max_classes
    }

    /// Whether candidates are scored in parallel.
    #[must_use]
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Finds the permutation of cluster indices minimising the error
    /// against `true_labels`.
    ///
    /// Candidates are visited in lexicographic order starting from the
    /// identity; on equal error the earlier candidate wins, in both the
    /// sequential and the parallel search.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the sequences differ in length, `n_classes` is
    ///   zero, or any entry is outside `0..n_classes`.
    /// - `ComplexityLimit` if `n_classes` exceeds [`Self::max_classes`].
    pub fn align(
        &self,
        assignments: &[usize],
        true_labels: &[usize],
        n_classes: usize,
    ) -> Result<Alignment> {
        if assignments.len() != true_labels.len() {
            return Err(ClustalignError::length_mismatch(
                "assignments/true_labels",
                assignments.len(),
                true_labels.len(),
            ));
        }
        if n_classes == 0 {
            return Err(ClustalignError::invalid_input(
                "number of classes must be at least 1",
            ));
        }
        if n_classes > self.max_classes {
            return Err(ClustalignError::ComplexityLimit {
                k: n_classes,
                limit: self.max_classes,
            });
        }
        let n_candidates = factorial(n_classes).ok_or(ClustalignError::ComplexityLimit {
            k: n_classes,
            limit: self.max_classes,
        })?;

        let table = contingency(assignments, true_labels, n_classes)?;
        let n_samples = assignments.len();

        let (n_mismatches, rank, mapping, n_scored) =
            if self.parallel && n_classes >= PARALLEL_MIN_CLASSES {
                search_parallel(&table, n_classes, n_samples, n_candidates)?
            } else {
                if self.parallel {
                    tracing::debug!(
                        n_classes,
                        min = PARALLEL_MIN_CLASSES,
                        "too few classes for parallel search, scoring sequentially"
                    );
                }
                search_sequential(&table, n_classes, n_samples)?
            };

        let alignment = Alignment {
            permutation: Permutation(mapping),
            error_rate: rate(n_mismatches, n_samples),
            n_mismatches,
            n_samples,
            n_candidates: n_scored,
        };

        tracing::debug!(
            permutation = ?alignment.permutation.as_slice(),
            rank,
            error_rate = alignment.error_rate,
            n_candidates = alignment.n_candidates,
            "best label alignment selected"
        );

        Ok(alignment)
    }

    /// Runs `model` on `x` and aligns its output with `true_labels`.
    ///
    /// K is taken from [`LabelPredictor::n_classes`].
    ///
    /// # Errors
    ///
    /// Propagates prediction errors and every error of [`Self::align`].
    pub fn evaluate<P: LabelPredictor + ?Sized>(
        &self,
        model: &P,
        x: &Matrix<f64>,
        true_labels: &[usize],
    ) -> Result<Alignment> {
        let assignments = model.predict(x)?;
        self.align(&assignments, true_labels, model.n_classes())
    }
}

/// Finds the best cluster-to-label permutation with the default aligner.
///
/// Shorthand for `LabelAligner::new().align(assignments, true_labels, k)`.
///
/// # Errors
///
/// See [`LabelAligner::align`].
pub fn find_best_permutation(
    assignments: &[usize],
    true_labels: &[usize],
    k: usize,
) -> Result<Alignment> {
    LabelAligner::new().align(assignments, true_labels, k)
}

/// Replaces every assignment `a` with `permutation[a]`.
///
/// # Errors
///
/// Returns `InvalidInput` if an assignment is outside the permutation's
/// domain.
///
/// # Examples
///
/// ```
/// use clustalign::align::apply_permutation;
///
/// let relabeled = apply_permutation(&[0, 2, 1], [2, 0, 1]).unwrap();
/// assert_eq!(relabeled, vec![2, 1, 0]);
/// assert!(apply_permutation(&[3], [0, 1, 2]).is_err());
/// ```
pub fn apply_permutation(
    assignments: &[usize],
    permutation: impl AsRef<[usize]>,
) -> Result<Vec<usize>> {
    let mapping = permutation.as_ref();
    assignments
        .iter()
        .enumerate()
        .map(|(i, &cluster)| {
            mapping.get(cluster).copied().ok_or_else(|| {
                ClustalignError::invalid_input(format!(
                    "assignment {cluster} at position {i} outside permutation domain 0..{}",
                    mapping.len()
                ))
            })
        })
        .collect()
}

/// Counts `table[c * k + l]` = samples with cluster `c` and label `l`.
fn contingency(assignments: &[usize], true_labels: &[usize], k: usize) -> Result<Vec<usize>> {
    let mut table = vec![0_usize; k * k];
    for (i, (&cluster, &label)) in assignments.iter().zip(true_labels).enumerate() {
        if cluster >= k {
            return Err(ClustalignError::invalid_input(format!(
                "assignment {cluster} at position {i} outside 0..{k}"
            )));
        }
        if label >= k {
            return Err(ClustalignError::invalid_input(format!(
                "label {label} at position {i} outside 0..{k}"
            )));
        }
        table[cluster * k + label] += 1;
    }
    Ok(table)
}

/// Samples left misclassified when cluster `c` is relabeled `mapping[c]`.
fn mismatches(table: &[usize], mapping: &[usize], n_samples: usize) -> usize {
    let k = mapping.len();
    let agreed: usize = mapping
        .iter()
        .enumerate()
        .map(|(cluster, &label)| table[cluster * k + label])
        .sum();
    n_samples - agreed
}

fn rate(n_mismatches: usize, n_samples: usize) -> f64 {
    if n_samples == 0 {
        0.0
    } else {
        n_mismatches as f64 / n_samples as f64
    }
}

type Best = (usize, usize, Vec<usize>, usize);

fn search_sequential(table: &[usize], k: usize, n_samples: usize) -> Result<Best> {
    let (best, n_scored) = Permutations::new(k).enumerate().fold(
        (None::<(usize, usize, Vec<usize>)>, 0_usize),
        |(best, n_scored), (rank, mapping)| {
            let m = mismatches(table, &mapping, n_samples);
            tracing::trace!(
                permutation = ?mapping,
                error_rate = rate(m, n_samples),
                "candidate permutation scored"
            );
            let best = match best {
                Some(current) if current.0 <= m => Some(current),
                _ => Some((m, rank, mapping)),
            };
            (best, n_scored + 1)
        },
    );
    let (m, rank, mapping) =
        best.ok_or_else(|| ClustalignError::invalid_input("no candidate permutations"))?;
    Ok((m, rank, mapping, n_scored))
}

fn search_parallel(
    table: &[usize],
    k: usize,
    n_samples: usize,
    n_candidates: usize,
) -> Result<Best> {
    // Ties resolve on rank, never on which worker finished first
    let (m, rank) = (0..n_candidates)
        .into_par_iter()
        .filter_map(|rank| {
            let mapping = nth_permutation(k, rank)?;
            Some((mismatches(table, &mapping, n_samples), rank))
        })
        .min()
        .ok_or_else(|| ClustalignError::invalid_input("no candidate permutations"))?;
    let mapping = nth_permutation(k, rank)
        .ok_or_else(|| ClustalignError::invalid_input("candidate rank out of range"))?;
    Ok((m, rank, mapping, n_candidates))
}


#[cfg(test)]
#[path = "tests_alignment_properties.rs"]
mod tests_alignment_properties;
