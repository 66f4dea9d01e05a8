use indexmap::IndexMap;

use crate::{
    utils::datastruct::vector::SparseVector,
    vectorizer::{corpus::Corpus, token::TokenFrequency},
};

/// Weighting scheme used by the vectorizer.
///
/// The default methods assemble whole vectors from the two scalar
/// functions, so an engine only has to say what tf and idf mean.
pub trait TFIDFEngine {
    /// IDF値
    /// * `doc_num` - documents in the corpus
    /// * `doc_freq` - documents containing the term
    fn idf(doc_num: u64, doc_freq: u64) -> f64;

    /// TF値
    /// * `count` - occurrences of the term in the document
    /// * `total` - tokens in the document
    fn tf(count: u32, total: u64) -> f64;

    /// IDFベクトルを生成する
    /// Returns `term -> idf` over `vocabulary`, keeping its order.
    fn idf_vec(corpus: &Corpus, vocabulary: &[String]) -> IndexMap<String, f64> {
        let doc_num = corpus.get_doc_num();
        vocabulary
            .iter()
            .map(|term| (term.clone(), Self::idf(doc_num, corpus.get_token_count(term))))
            .collect()
    }

    /// TF-IDF vector of one document, restricted to the terms in `idf`.
    /// Entries come out in vocabulary order, not normalized.
    fn tf_idf_vec(freq: &TokenFrequency, idf: &IndexMap<String, f64>) -> SparseVector {
        let total = freq.token_sum();
        let mut hits: Vec<(usize, &str, f64)> = freq
            .iter()
            .filter_map(|(term, count)| {
                idf.get_full(term)
                    .map(|(idx, key, w)| (idx, key.as_str(), Self::tf(count, total) * *w))
            })
            .collect();
        hits.sort_unstable_by_key(|&(idx, _, _)| idx);
        hits.into_iter().map(|(_, term, w)| (term, w)).collect()
    }
}

/// デフォルトのTF-IDFエンジン
/// - tf: raw occurrence count
/// - idf: smoothed, `ln((1 + N) / (1 + df)) + 1`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultTFIDFEngine;

impl TFIDFEngine for DefaultTFIDFEngine {
    #[inline]
    fn idf(doc_num: u64, doc_freq: u64) -> f64 {
        ((1.0 + doc_num as f64) / (1.0 + doc_freq as f64)).ln() + 1.0
    }

    #[inline]
    fn tf(count: u32, _total: u64) -> f64 {
        count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn smoothed_idf_values() {
        // a term in every document still gets weight 1
        assert!(approx(DefaultTFIDFEngine::idf(3, 3), 1.0));
        assert!(approx(DefaultTFIDFEngine::idf(3, 1), (4.0f64 / 2.0).ln() + 1.0));
        // rarer terms weigh more
        assert!(DefaultTFIDFEngine::idf(10, 1) > DefaultTFIDFEngine::idf(10, 5));
    }

    #[test]
    fn tf_idf_skips_out_of_vocabulary_terms() {
        let mut corpus = Corpus::new();
        corpus.add_set(&["alpha", "beta"]);
        corpus.add_set(&["beta"]);
        let vocab = vec!["alpha".to_string(), "beta".to_string()];
        let idf = DefaultTFIDFEngine::idf_vec(&corpus, &vocab);

        let freq: TokenFrequency = ["beta", "gamma", "alpha", "beta"].into_iter().collect();
        let v = DefaultTFIDFEngine::tf_idf_vec(&freq, &idf);
        assert_eq!(v.tokens().collect::<Vec<_>>(), vec!["alpha", "beta"]);
        assert!(approx(v.get("beta"), 2.0));
        assert!(approx(v.get("alpha"), (3.0f64 / 2.0).ln() + 1.0));
        assert_eq!(v.get("gamma"), 0.0);
    }
}
