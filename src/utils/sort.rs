use std::cmp::Ordering;

/// Select the indices of the `k` largest weights.
/// - Sorts by weight descending
/// - Equal weights keep their original (first-seen) order
/// - NaN weights are never selected
///
/// Returned indices are in ranked order.
///
/// Complexity: O(n log n) in the worst case, O(n) when `k >= nnz`
pub fn top_k_indices(weights: &[f64], k: usize) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..weights.len())
        .filter(|&i| !weights[i].is_nan())
        .collect();
    if k == 0 {
        return Vec::new();
    }
    if idx.len() > k {
        // partition first so the stable sort only touches the survivors
        let nth = k - 1;
        idx.select_nth_unstable_by(nth, |&a, &b| rank_cmp(weights, a, b));
        idx.truncate(k);
    }
    idx.sort_by(|&a, &b| rank_cmp(weights, a, b));
    idx
}

/// Descending by weight, then ascending by position.
#[inline(always)]
fn rank_cmp(weights: &[f64], a: usize, b: usize) -> Ordering {
    weights[b]
        .total_cmp(&weights[a])
        .then_with(|| a.cmp(&b))
}
