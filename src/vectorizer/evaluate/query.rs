use crate::{
    utils::datastruct::vector::SparseVector,
    vectorizer::{analyzer::Analyzer, token::TokenFrequency},
};

/// Ad-hoc search query.
///
/// Weights are raw occurrence counts of the analyzed tokens, not idf-weighted,
/// so a query can be built without a fitted vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub(crate) token_freq: TokenFrequency,
}

impl Query {
    /// Analyze `text` into a query
    pub fn parse(analyzer: &Analyzer, text: &str) -> Self {
        Query {
            token_freq: analyzer.term_frequency(text),
        }
    }

    /// No token survived analysis
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.token_freq.is_empty()
    }

    pub fn tokens(&self) -> Vec<&str> {
        self.token_freq.token_set_ref_str()
    }

    /// Term-count vector used for ranking
    pub fn to_vector(&self) -> SparseVector {
        self.token_freq.to_count_vector()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_vector_uses_raw_counts() {
        let q = Query::parse(&Analyzer::new(), "graph neural networks for graphs");
        let v = q.to_vector();
        assert_eq!(v.get("graph"), 2.0);
        assert_eq!(v.get("neural"), 1.0);
        assert_eq!(v.get("network"), 1.0);
        assert_eq!(v.get("for"), 0.0);
        assert_eq!(q.tokens(), vec!["graph", "neural", "network"]);
    }

    #[test]
    fn stopword_only_query_is_empty() {
        let q = Query::parse(&Analyzer::new(), "the of and");
        assert!(q.is_empty());
        assert!(q.to_vector().is_empty());
    }
}
