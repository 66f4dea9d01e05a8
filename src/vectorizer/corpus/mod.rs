use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Document-frequency statistics for one batch of documents.
///
/// Each document contributes its *set* of terms once, so `token_count(t)` is
/// the number of documents that contain `t`. Terms keep the order in which the
/// corpus first saw them; that order is the vocabulary order.
///
/// A corpus only grows: a new batch starts a new corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Corpus {
    doc_num: u64,
    #[serde(with = "indexmap::map::serde_seq")]
    term_counts: IndexMap<String, u64>,
}

impl Corpus {
    pub fn new() -> Self {
        Self {
            doc_num: 0,
            term_counts: IndexMap::new(),
        }
    }

    /// Add one document's distinct terms.
    /// Duplicates in `terms` are counted once.
    pub fn add_set<T>(&mut self, terms: &[T])
    where
        T: AsRef<str>,
    {
        self.doc_num += 1;
        let mut seen = std::collections::HashSet::with_capacity(terms.len());
        for term in terms {
            let term = term.as_ref();
            if !seen.insert(term) {
                continue;
            }
            if let Some(count) = self.term_counts.get_mut(term) {
                *count += 1;
            } else {
                self.term_counts.insert(term.to_string(), 1);
            }
        }
    }

    /// Number of documents in the corpus
    #[inline]
    pub fn get_doc_num(&self) -> u64 {
        self.doc_num
    }

    /// Document frequency of `token`
    #[inline]
    pub fn get_token_count(&self, token: &str) -> u64 {
        self.term_counts.get(token).copied().unwrap_or(0)
    }

    /// Distinct terms seen so far
    #[inline]
    pub fn term_num(&self) -> usize {
        self.term_counts.len()
    }

    /// `(term, document frequency)` in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.term_counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Terms kept by a `max_df` cut-off: df <= max_df * N, first-seen order
    pub fn vocabulary(&self, max_df: f64) -> Vec<String> {
        let limit = max_df * self.get_doc_num() as f64;
        self.iter()
            .filter(|&(_, df)| df as f64 <= limit)
            .map(|(t, _)| t.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_document_once() {
        let mut corpus = Corpus::new();
        corpus.add_set(&["graph", "graph", "neural"]);
        corpus.add_set(&["graph"]);
        assert_eq!(corpus.get_doc_num(), 2);
        assert_eq!(corpus.get_token_count("graph"), 2);
        assert_eq!(corpus.get_token_count("neural"), 1);
        assert_eq!(corpus.get_token_count("vision"), 0);
        assert_eq!(corpus.term_num(), 2);
    }

    #[test]
    fn vocabulary_drops_terms_above_max_df() {
        let mut corpus = Corpus::new();
        corpus.add_set(&["pet", "cat"]);
        corpus.add_set(&["pet", "dog"]);
        corpus.add_set(&["quantum"]);
        // pet: 2/3 docs, kept at 0.9 but dropped at 0.5
        assert_eq!(corpus.vocabulary(0.9), vec!["pet", "cat", "dog", "quantum"]);
        assert_eq!(corpus.vocabulary(0.5), vec!["cat", "dog", "quantum"]);
    }
}
