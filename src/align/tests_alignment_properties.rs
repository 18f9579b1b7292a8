// =========================================================================
// Alignment search properties
//
//   - exactly K! candidates are scored
//   - error rate stays in [0, 1] and never exceeds the identity's error
//   - repeated calls (sequential or parallel) return the same alignment,
//     including for K large enough to take the rayon path
//   - relabeling with the winner reproduces the reported mismatch count
// =========================================================================

use super::*;
use proptest::prelude::*;

fn identity_mismatches(assignments: &[usize], true_labels: &[usize]) -> usize {
    assignments
        .iter()
        .zip(true_labels)
        .filter(|(a, t)| a != t)
        .count()
}

/// (k, assignments, true_labels) with entries in `0..k`.
fn labelled_samples() -> impl Strategy<Value = (usize, Vec<usize>, Vec<usize>)> {
    (1..=5usize, 0..40usize).prop_flat_map(|(k, n)| {
        (
            Just(k),
            proptest::collection::vec(0..k, n),
            proptest::collection::vec(0..k, n),
        )
    })
}

/// Samples with K in the range where `with_parallel(true)` uses rayon.
///
/// Labels are drawn from a few values so that ties between permutations
/// are common.
fn parallel_sized_samples() -> impl Strategy<Value = (usize, Vec<usize>, Vec<usize>)> {
    (PARALLEL_MIN_CLASSES..=PARALLEL_MIN_CLASSES + 1, 0..30usize).prop_flat_map(|(k, n)| {
        (
            Just(k),
            proptest::collection::vec(0..k, n),
            proptest::collection::vec(0..3usize, n),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_parallel_matches_sequential(
        (k, assignments, true_labels) in parallel_sized_samples(),
    ) {
        let sequential = LabelAligner::new()
            .align(&assignments, &true_labels, k)
            .expect("generated input is valid");
        let parallel = LabelAligner::new()
            .with_parallel(true)
            .align(&assignments, &true_labels, k)
            .expect("generated input is valid");
        prop_assert_eq!(parallel.n_candidates, factorial(k).expect("k <= 7"));
        prop_assert_eq!(sequential, parallel);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_scores_every_permutation((k, assignments, true_labels) in labelled_samples()) {
        let best = find_best_permutation(&assignments, &true_labels, k)
            .expect("generated input is valid");
        prop_assert_eq!(Some(best.n_candidates), factorial(k));
    }

    #[test]
    fn prop_error_bounded_by_identity((k, assignments, true_labels) in labelled_samples()) {
        let best = find_best_permutation(&assignments, &true_labels, k)
            .expect("generated input is valid");
        prop_assert!((0.0..=1.0).contains(&best.error_rate));
        prop_assert!(best.n_mismatches <= identity_mismatches(&assignments, &true_labels));
    }

    #[test]
    fn prop_deterministic((k, assignments, true_labels) in labelled_samples()) {
        let first = find_best_permutation(&assignments, &true_labels, k)
            .expect("generated input is valid");
        let second = find_best_permutation(&assignments, &true_labels, k)
            .expect("generated input is valid");
        let parallel = LabelAligner::new()
            .with_parallel(true)
            .align(&assignments, &true_labels, k)
            .expect("generated input is valid");
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &parallel);
    }

    #[test]
    fn prop_relabel_reproduces_error((k, assignments, true_labels) in labelled_samples()) {
        let best = find_best_permutation(&assignments, &true_labels, k)
            .expect("generated input is valid");
        let relabeled = apply_permutation(&assignments, &best.permutation)
            .expect("assignments are in range");
        prop_assert_eq!(relabeled.len(), assignments.len());
        let mismatches = identity_mismatches(&relabeled, &true_labels);
        prop_assert_eq!(mismatches, best.n_mismatches);
        if !assignments.is_empty() {
            let rate = mismatches as f64 / assignments.len() as f64;
            prop_assert!((rate - best.error_rate).abs() < 1e-12);
        }
    }

    #[test]
    fn prop_recovers_relabeled_ground_truth(
        (k, true_labels, _) in labelled_samples(),
        rank in 0..120usize,
    ) {
        // Scramble the true labels with a known bijection; the search must
        // reach zero error
        let scramble = nth_permutation(k, rank % factorial(k).expect("k <= 5"))
            .expect("rank in range");
        let assignments: Vec<usize> = true_labels.iter().map(|&l| scramble[l]).collect();
        let best = find_best_permutation(&assignments, &true_labels, k)
            .expect("generated input is valid");
        prop_assert_eq!(best.n_mismatches, 0);
    }
}
