pub mod serde;

use std::fmt;

use indexmap::IndexMap;

use crate::utils::sort::top_k_indices;

/// Sparse token → weight vector.
///
/// Used for paper content vectors, user profiles and query vectors.
/// - keys are unique and keep insertion order (first-seen order)
/// - an absent key has implicit weight 0
/// - weights of exactly 0 are never stored
///
/// # Serialization
/// Serializes as a flat `{token: weight}` map so any key-value store can hold it.
/// Zero weights in the input are dropped on deserialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: IndexMap<String, f64>,
}

impl SparseVector {
    pub fn new() -> Self {
        Self { entries: IndexMap::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: IndexMap::with_capacity(capacity) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Weight of `token`, 0 when absent
    #[inline]
    pub fn get(&self, token: &str) -> f64 {
        self.entries.get(token).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    /// Set the weight of `token`.
    /// A weight of 0 removes the entry instead of storing it.
    pub fn insert(&mut self, token: impl Into<String>, weight: f64) {
        let token = token.into();
        if weight == 0.0 {
            self.entries.shift_remove(&token);
        } else {
            self.entries.insert(token, weight);
        }
    }

    pub fn remove(&mut self, token: &str) -> Option<f64> {
        self.entries.shift_remove(token)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(|k| k.as_str())
    }

    pub(crate) fn entries_mut(&mut self) -> &mut IndexMap<String, f64> {
        &mut self.entries
    }

    /// Euclidean norm over every stored entry
    pub fn norm(&self) -> f64 {
        self.entries.values().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Dot product over the shared keys.
    /// Iterates the shorter vector and looks its keys up in the longer one.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };
        small
            .entries
            .iter()
            .filter_map(|(k, v)| large.entries.get(k).map(|w| v * w))
            .sum()
    }

    /// Scale to unit length; a zero vector stays empty
    pub fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            self.entries.values_mut().for_each(|v| *v /= norm);
        }
    }

    /// Drop every entry whose weight is `< floor` or exactly 0
    pub fn prune_below(&mut self, floor: f64) {
        self.entries.retain(|_, w| *w >= floor && *w != 0.0);
    }

    /// Keep only the `k` highest weights.
    /// Ties keep the entry that was inserted first; surviving entries are
    /// reordered by descending weight.
    pub fn truncate_top_k(&mut self, k: usize) {
        if self.entries.len() <= k && k > 0 {
            return;
        }
        let weights: Vec<f64> = self.entries.values().copied().collect();
        let keep = top_k_indices(&weights, k);
        let mut kept = IndexMap::with_capacity(keep.len());
        for idx in keep {
            if let Some((token, weight)) = self.entries.get_index(idx) {
                kept.insert(token.clone(), *weight);
            }
        }
        self.entries = kept;
    }

    /// Entries sorted by descending weight (ties by insertion order)
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let weights: Vec<f64> = self.entries.values().copied().collect();
        top_k_indices(&weights, weights.len())
            .into_iter()
            .filter_map(|idx| self.entries.get_index(idx).map(|(k, v)| (k.as_str(), *v)))
            .collect()
    }
}

impl FromIterator<(String, f64)> for SparseVector {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut vec = SparseVector::new();
        for (token, weight) in iter {
            vec.insert(token, weight);
        }
        vec
    }
}

impl<'a> FromIterator<(&'a str, f64)> for SparseVector {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}

impl IntoIterator for SparseVector {
    type Item = (String, f64);
    type IntoIter = indexmap::map::IntoIter<String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Display for SparseVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            // one entry per line, heaviest first
            writeln!(f, "SparseVector [")?;
            for (token, weight) in self.ranked() {
                writeln!(f, "    {}: {:.6}", token, weight)?;
            }
            write!(f, "]")
        } else {
            f.debug_map().entries(self.entries.iter()).finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sv(pairs: &[(&str, f64)]) -> SparseVector {
        pairs.iter().copied().collect()
    }

    #[test]
    fn zero_weights_are_not_stored() {
        let mut v = sv(&[("a", 1.0), ("b", 0.0)]);
        assert_eq!(v.len(), 1);
        v.insert("a", 0.0);
        assert!(v.is_empty());
        assert_eq!(v.get("a"), 0.0);
    }

    #[test]
    fn dot_uses_shared_keys_only() {
        let a = sv(&[("x", 1.0), ("y", 2.0)]);
        let b = sv(&[("y", 3.0), ("z", 4.0)]);
        assert_eq!(a.dot(&b), 6.0);
        assert_eq!(b.dot(&a), 6.0);
    }

    #[test]
    fn prune_keeps_weight_equal_to_floor() {
        let mut v = sv(&[("a", 0.02), ("b", 0.019), ("c", 0.5)]);
        v.prune_below(0.02);
        assert_eq!(v.tokens().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn truncate_keeps_heaviest_with_first_seen_ties() {
        let mut v = sv(&[("a", 0.1), ("b", 0.5), ("c", 0.5), ("d", 0.3)]);
        v.truncate_top_k(2);
        assert_eq!(v.tokens().collect::<Vec<_>>(), vec!["b", "c"]);
    }

}
