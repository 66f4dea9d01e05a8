use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::utils::datastruct::vector::SparseVector;

/// TokenFrequency 構造体
/// Counts token occurrences within one document (or one query).
///
/// Tokens keep the order in which they were first added, which is the order
/// used for tie-breaking downstream.
///
/// # Examples
/// ```
/// use paper_rank::TokenFrequency;
/// let mut freq = TokenFrequency::new();
/// freq.add_tokens(&["graph", "neural", "graph"]);
/// assert_eq!(freq.token_count("graph"), 2);
/// assert_eq!(freq.token_sum(), 3);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TokenFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    token_count: IndexMap<String, u32>,
    total_token_count: u64,
}

/// Token add/remove
impl TokenFrequency {
    pub fn new() -> Self {
        TokenFrequency {
            token_count: IndexMap::new(),
            total_token_count: 0,
        }
    }

    /// Add one occurrence of `token`
    #[inline]
    pub fn add_token(&mut self, token: &str) -> &mut Self {
        if let Some(count) = self.token_count.get_mut(token) {
            *count += 1;
        } else {
            self.token_count.insert(token.to_string(), 1);
        }
        self.total_token_count += 1;
        self
    }

    #[inline]
    pub fn add_tokens<T>(&mut self, tokens: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for token in tokens {
            self.add_token(token.as_ref());
        }
        self
    }
}

/// Accessors
impl TokenFrequency {
    #[inline]
    pub fn token_count(&self, token: &str) -> u32 {
        self.token_count.get(token).copied().unwrap_or(0)
    }

    /// Total number of tokens added
    #[inline]
    pub fn token_sum(&self) -> u64 {
        self.total_token_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.token_count.is_empty()
    }

    /// Distinct tokens in first-seen order
    pub fn token_set_ref_str(&self) -> Vec<&str> {
        self.token_count.keys().map(|s| s.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.token_count.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Raw occurrence counts as a sparse vector (weight = count)
    pub fn to_count_vector(&self) -> SparseVector {
        self.iter().map(|(tok, count)| (tok, count as f64)).collect()
    }
}

impl<T: AsRef<str>> FromIterator<T> for TokenFrequency {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut freq = TokenFrequency::new();
        for token in iter {
            freq.add_token(token.as_ref());
        }
        freq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_keeps_first_seen_order() {
        let mut freq = TokenFrequency::new();
        freq.add_tokens(&["b", "a", "b", "c", "b"]);
        assert_eq!(freq.token_count("b"), 3);
        assert_eq!(freq.token_count("z"), 0);
        assert_eq!(freq.token_sum(), 5);
        assert_eq!(freq.token_set_ref_str(), vec!["b", "a", "c"]);
    }

    #[test]
    fn collects_from_an_iterator() {
        let freq: TokenFrequency = ["y", "z", "y"].into_iter().collect();
        assert_eq!(freq.token_count("y"), 2);
        assert_eq!(freq.token_sum(), 3);
        assert!(!freq.is_empty());
        assert!(TokenFrequency::new().is_empty());
    }

    #[test]
    fn count_vector_uses_raw_counts() {
        let freq: TokenFrequency = ["nlp", "nlp", "vision"].into_iter().collect();
        let v = freq.to_count_vector();
        assert_eq!(v.get("nlp"), 2.0);
        assert_eq!(v.get("vision"), 1.0);
    }
}
