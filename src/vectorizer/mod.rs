pub mod analyzer;
pub mod corpus;
pub mod evaluate;
pub mod serde;
pub mod tfidf;
pub mod token;

use std::marker::PhantomData;

use ::serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::debug;

use crate::{
    error::VectorizeError,
    utils::datastruct::vector::SparseVector,
    vectorizer::{
        analyzer::Analyzer,
        corpus::Corpus,
        tfidf::{DefaultTFIDFEngine, TFIDFEngine},
        token::TokenFrequency,
    },
};

/// Default document-frequency ceiling
pub const DEFAULT_MAX_DF: f64 = 0.9;
/// Default number of entries kept per document vector
pub const DEFAULT_MAX_VECTOR_LEN: usize = 1000;

/// Batch TF-IDF builder.
///
/// `fit` consumes one batch of documents and returns one sparse vector per
/// document, plus a [`FittedVectorizer`] holding the vocabulary and idf
/// weights of that batch.
///
/// - terms found in more than `max_df * N` documents are dropped
/// - vectors are L2-normalized, then cut to their `max_vector_len` heaviest
///   entries (ties keep vocabulary order)
#[derive(Debug, Clone)]
pub struct TfidfVectorizer<E = DefaultTFIDFEngine>
where
    E: TFIDFEngine,
{
    pub max_df: f64,
    pub max_vector_len: usize,
    analyzer: Analyzer,
    _marker: PhantomData<E>,
}

impl Default for TfidfVectorizer<DefaultTFIDFEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl TfidfVectorizer<DefaultTFIDFEngine> {
    pub fn new() -> Self {
        Self::with_engine()
    }
}

impl<E> TfidfVectorizer<E>
where
    E: TFIDFEngine,
{
    /// Vectorizer with a custom weighting engine
    pub fn with_engine() -> Self {
        TfidfVectorizer {
            max_df: DEFAULT_MAX_DF,
            max_vector_len: DEFAULT_MAX_VECTOR_LEN,
            analyzer: Analyzer::new(),
            _marker: PhantomData,
        }
    }

    pub fn max_df(mut self, max_df: f64) -> Self {
        self.max_df = max_df;
        self
    }

    pub fn max_vector_len(mut self, len: usize) -> Self {
        self.max_vector_len = len;
        self
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Build vocabulary, idf weights and one vector per document.
    ///
    /// Output vectors are index-aligned with `documents`. A document with no
    /// surviving terms gets an empty vector.
    pub fn fit<T>(&self, documents: &[T]) -> Result<FittedCorpus<E>, VectorizeError>
    where
        T: AsRef<str> + Sync,
    {
        if documents.is_empty() {
            return Err(VectorizeError::EmptyCorpus);
        }

        let analyzer = self.analyzer;
        let freqs: Vec<TokenFrequency> = documents
            .par_iter()
            .map(|doc| analyzer.term_frequency(doc.as_ref()))
            .collect();

        let mut corpus = Corpus::new();
        for freq in &freqs {
            corpus.add_set(&freq.token_set_ref_str());
        }

        let vocabulary = corpus.vocabulary(self.max_df);
        debug!(
            docs = documents.len(),
            terms = corpus.term_num(),
            kept = vocabulary.len(),
            max_df = self.max_df,
            "built vocabulary"
        );
        if vocabulary.is_empty() {
            return Err(VectorizeError::EmptyVocabulary {
                docs: documents.len(),
                max_df: self.max_df,
            });
        }

        let fitted = FittedVectorizer {
            idf: E::idf_vec(&corpus, &vocabulary),
            doc_num: corpus.get_doc_num(),
            max_vector_len: self.max_vector_len,
            analyzer: self.analyzer,
            _engine: PhantomData,
        };
        let vectors = freqs
            .par_iter()
            .map(|freq| fitted.vectorize_freq(freq))
            .collect();

        Ok(FittedCorpus {
            vectors,
            vectorizer: fitted,
        })
    }
}

/// Result of [`TfidfVectorizer::fit`]
#[derive(Debug, Clone)]
pub struct FittedCorpus<E = DefaultTFIDFEngine> {
    /// One vector per input document, same order
    pub vectors: Vec<SparseVector>,
    pub vectorizer: FittedVectorizer<E>,
}

/// Vocabulary and idf weights of one fitted batch.
///
/// Can vectorize new text against the same vocabulary; terms outside it are
/// ignored. `E` is the weighting engine of the fit and is reused by
/// [`FittedVectorizer::transform`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FittedVectorizer<E = DefaultTFIDFEngine> {
    /// term -> idf, vocabulary order
    #[serde(with = "indexmap::map::serde_seq")]
    pub(crate) idf: IndexMap<String, f64>,
    pub(crate) doc_num: u64,
    pub(crate) max_vector_len: usize,
    #[serde(skip)]
    pub(crate) analyzer: Analyzer,
    #[serde(skip)]
    _engine: PhantomData<fn() -> E>,
}

impl<E> FittedVectorizer<E>
where
    E: TFIDFEngine,
{
    /// Analyzer used at fit time
    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Run the analyzer on `text`
    pub fn analyze(&self, text: &str) -> Vec<String> {
        self.analyzer.analyze(text)
    }

    /// TF-IDF vector of new text under this vocabulary, weighted by the
    /// engine the batch was fitted with
    pub fn transform(&self, text: &str) -> SparseVector {
        self.vectorize_freq(&self.analyzer.term_frequency(text))
    }

    pub fn vocabulary(&self) -> impl Iterator<Item = &str> + '_ {
        self.idf.keys().map(|k| k.as_str())
    }

    #[inline]
    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }

    /// Documents in the fitted batch
    #[inline]
    pub fn doc_num(&self) -> u64 {
        self.doc_num
    }

    fn vectorize_freq(&self, freq: &TokenFrequency) -> SparseVector {
        let mut vec = E::tf_idf_vec(freq, &self.idf);
        vec.l2_normalize();
        vec.truncate_top_k(self.max_vector_len);
        vec
    }
}
