/// This crate is a paper recommendation engine built on a TF-IDF vectorizer,
/// an exponential-decay profile updater and a cosine ranker.
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod pagination;
pub mod profile;
pub mod recommender;
pub mod source;
pub mod store;
pub mod utils;
pub mod vectorizer;

/// Recommendation service
/// The top-level struct of this crate.
/// It ingests document batches, keeps the vectorizer of the latest batch,
/// applies like/unlike feedback to user profiles and answers ranking requests.
///
/// Internally, it holds:
/// - The fitted vectorizer of the latest batch, swapped atomically
/// - A paper catalog
/// - A vector store for paper vectors
/// - A vector store for user profiles
///
/// # Concurrency
/// All methods take `&self`. Only one ingestion batch runs at a time;
/// profile updates use compare-and-swap with bounded retries.
pub use recommender::{RankRequest, RankedPage, Recommender, TimeWindow};

/// Engine configuration
/// Loaded from JSON with environment overrides.
pub use config::EngineConfig;

/// Error types
/// One enum per module boundary, wrapped by the crate-level `Error`.
pub use error::{Error, ProfileError, RankError, Result, SourceError, StoreError, VectorizeError};

/// TF-IDF Vectorizer
/// Fits one batch of documents and returns one L2-normalized sparse vector per
/// document, cut to its heaviest terms.
///
/// `FittedVectorizer` keeps the vocabulary and idf weights of the batch and
/// can vectorize new text against them.
///
/// # Serialization
/// `FittedVectorizer` supports serde and has CBOR helpers.
pub use vectorizer::{FittedCorpus, FittedVectorizer, TfidfVectorizer};

/// Text analyzer
/// tokenize → filter → lemmatize → lowercase → stopword removal.
/// Shared by fitting, queries and interest bootstrap.
pub use vectorizer::analyzer::Analyzer;

/// Corpus for TF-IDF Vectorizer
/// Manages document frequencies of one batch:
/// - The number of documents
/// - The number of documents in which each token appears
///
/// It is used as the base data for IDF calculation.
pub use vectorizer::corpus::Corpus;

/// Token Frequency structure
/// Token occurrence counts within one document or query.
/// Used as base data for TF calculation and for query vectors.
pub use vectorizer::token::TokenFrequency;

/// TF IDF Calculation Engine Trait
/// Defines what tf and idf mean; the vectorizer assembles vectors from them.
///
/// `DefaultTFIDFEngine` uses raw counts and smoothed idf.
pub use vectorizer::tfidf::{DefaultTFIDFEngine, TFIDFEngine};

/// Similarity and ranking
/// - `cosine`: cosine similarity, `Score::Unranked` for zero-norm input
/// - `rank`: parallel scoring followed by a stable sort on a `SortKey`
pub use vectorizer::evaluate::scoring::{cosine, rank, Hits, RankEntry, Rankable, Score, SortKey};

/// Query Structure
/// Raw term counts of analyzed free text.
pub use vectorizer::evaluate::query::Query;

/// Sparse vector
/// token → weight map used for papers, profiles and queries.
pub use utils::datastruct::vector::SparseVector;

/// Profile updates
/// `P' = alpha * P + beta * D`, then entries below `gamma` are dropped.
/// `UserProfile` pairs the vector with the set of liked papers.
pub use profile::{update_profile, Feedback, FeedbackParams, UserProfile};

/// Pagination
pub use pagination::{paginate, Page, PageInfo};

/// Persistence
pub use store::{MemoryStore, VectorStore, Versioned};

/// Document sources and ingestion
pub use ingest::{IngestReport, Paper};
pub use source::{fetch_batch, DocumentSource, PaperMeta, RawDocument, StaticSource};
