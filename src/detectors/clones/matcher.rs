//! Greedy sequence matcher over statement lists.
//!
//! Finds non-overlapping runs of pairwise-equal elements between two
//! ordered lists under a caller-supplied equality predicate. The scan is
//! leftmost-match-first and never backtracks: it is not guaranteed to find
//! the globally longest cover, and an early short run can shadow a longer
//! one starting at a different offset. That incompleteness is a deliberate
//! speed trade-off and must stay; see the shadowing test below for the
//! exact shape.

/// One maximal run of consecutive matching elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRun {
    /// Start index of the run in the first list
    pub start_a: usize,
    /// Start index of the run in the second list
    pub start_b: usize,
    /// Number of consecutive matching elements
    pub len: usize,
}

/// Scan `a` left to right; for each position, take the first match in `b`
/// and extend it as far as it goes, then resume scanning `a` past the run.
/// Runs never overlap in `a`; positions in `b` may be reused by later
/// runs. Worst case O(|a| * |b|) comparisons.
pub fn find_matching_runs<T, F>(a: &[T], b: &[T], mut eq: F) -> Vec<MatchRun>
where
    F: FnMut(&T, &T) -> bool,
{
    let mut runs = Vec::new();
    let mut i = 0;
    while i < a.len() {
        for j in 0..b.len() {
            if eq(&a[i], &b[j]) {
                let mut k = i;
                let mut l = j;
                while k < a.len() && l < b.len() && eq(&a[k], &b[l]) {
                    k += 1;
                    l += 1;
                }
                runs.push(MatchRun {
                    start_a: i,
                    start_b: j,
                    len: k - i,
                });
                // Resume past the consumed run; the loop increment below
                // lands the outer index on k.
                i = k - 1;
                break;
            }
        }
        i += 1;
    }
    runs
}
