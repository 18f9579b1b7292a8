//! Lexicographic permutation enumeration over `{0, ..., k-1}`.

/// Returns `k!`, or `None` if it overflows `usize`.
#[must_use]
pub fn factorial(k: usize) -> Option<usize> {
    (1..=k).try_fold(1_usize, usize::checked_mul)
}

/// Lazy iterator over all permutations of `0..k` in lexicographic order.
///
/// The first item is the identity and the last is the reversal, the same
/// order `itertools.permutations(range(k))` produces. For `k == 0` the
/// iterator yields the single empty permutation.
///
/// # Examples
///
/// ```
/// use clustalign::align::Permutations;
///
/// let all: Vec<Vec<usize>> = Permutations::new(3).collect();
/// assert_eq!(all.len(), 6);
/// assert_eq!(all[0], vec![0, 1, 2]);
/// assert_eq!(all[1], vec![0, 2, 1]);
/// assert_eq!(all[5], vec![2, 1, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct Permutations {
    current: Option<Vec<usize>>,
}

impl Permutations {
    /// Starts the enumeration at the identity permutation of `0..k`.
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            current: Some((0..k).collect()),
        }
    }
}

impl Iterator for Permutations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        let mut successor = current.clone();
        if next_permutation(&mut successor) {
            self.current = Some(successor);
        }
        Some(current)
    }
}

/// Advances `perm` to its lexicographic successor in place.
///
/// Returns `false` (leaving `perm` untouched) when `perm` is already the
/// last permutation.
fn next_permutation(perm: &mut [usize]) -> bool {
    let n = perm.len();
    if n < 2 {
        return false;
    }

    // Longest non-increasing suffix starts at `pivot + 1`
    let Some(pivot) = (0..n - 1).rev().find(|&i| perm[i] < perm[i + 1]) else {
        return false;
    };

    let successor = (pivot + 1..n)
        .rev()
        .find(|&j| perm[j] > perm[pivot])
        .unwrap_or(pivot + 1);
    perm.swap(pivot, successor);
    perm[pivot + 1..].reverse();
    true
}

/// Returns the permutation at position `rank` of the lexicographic order.
///
/// Decodes `rank` through the factorial number system, so
/// `nth_permutation(k, r)` equals `Permutations::new(k).nth(r)` without
/// walking the `r` predecessors. Returns `None` if `rank >= k!`.
#[must_use]
pub fn nth_permutation(k: usize, rank: usize) -> Option<Vec<usize>> {
    if rank >= factorial(k)? {
        return None;
    }

    let mut pool: Vec<usize> = (0..k).collect();
    let mut perm = Vec::with_capacity(k);
    let mut remainder = rank;
    for position in (0..k).rev() {
        // Cannot overflow: position! <= k! which was checked above
        let block = factorial(position)?;
        let digit = remainder / block;
        remainder %= block;
        perm.push(pool.remove(digit));
    }
    Some(perm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factorial_small() {
        assert_eq!(factorial(0), Some(1));
        assert_eq!(factorial(1), Some(1));
        assert_eq!(factorial(5), Some(120));
        assert_eq!(factorial(10), Some(3_628_800));
    }

    #[test]
    fn test_factorial_overflow() {
        assert_eq!(factorial(200), None);
    }

    #[test]
    fn test_permutations_count() {
        for k in 0..=6 {
            let expected = factorial(k).expect("small k");
            assert_eq!(Permutations::new(k).count(), expected, "k = {k}");
        }
    }

    #[test]
    fn test_permutations_are_distinct_bijections() {
        let all: Vec<Vec<usize>> = Permutations::new(4).collect();
        let mut sorted = all.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), all.len());
        for p in &all {
            let mut values = p.clone();
            values.sort_unstable();
            assert_eq!(values, vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn test_permutations_lexicographic() {
        let all: Vec<Vec<usize>> = Permutations::new(4).collect();
        assert!(all.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_empty_permutation() {
        let all: Vec<Vec<usize>> = Permutations::new(0).collect();
        assert_eq!(all, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_nth_matches_iterator() {
        for k in 0..=5 {
            for (rank, perm) in Permutations::new(k).enumerate() {
                assert_eq!(nth_permutation(k, rank), Some(perm), "k = {k}, rank = {rank}");
            }
        }
    }

    #[test]
    fn test_nth_out_of_range() {
        assert_eq!(nth_permutation(3, 6), None);
    }
}
