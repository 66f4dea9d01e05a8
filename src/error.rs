//! Error types shared across the crate.
//!
//! Each module boundary has its own error enum; [`Error`] wraps all of them so
//! the engine facade can return a single type.

use thiserror::Error;

/// Errors raised while fitting or persisting a vectorizer.
#[derive(Debug, Error)]
pub enum VectorizeError {
    /// `fit` was called with zero documents
    #[error("cannot fit a vectorizer on an empty corpus")]
    EmptyCorpus,

    /// Every term was removed by stopword or document-frequency pruning
    #[error("no terms remain after pruning ({docs} documents, max_df {max_df})")]
    EmptyVocabulary { docs: usize, max_df: f64 },

    /// CBOR encoding/decoding failed
    #[error("vectorizer serialization failed: {0}")]
    Serialization(#[from] serde_cbor::Error),
}

/// Caller-contract violations on ranking parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankError {
    #[error("unknown sort key: {0}")]
    UnknownSortKey(String),

    #[error("unknown time window: {0}")]
    UnknownTimeWindow(String),

    /// Page numbers start at 1
    #[error("page {page} is out of range (total pages: {total_pages})")]
    OutOfRangePage { page: usize, total_pages: usize },
}

/// Errors returned by a [`crate::store::VectorStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored record changed since it was read
    #[error("write conflict on {key}: expected version {expected:?}, found {found:?}")]
    WriteConflict {
        key: String,
        expected: Option<u64>,
        found: Option<u64>,
    },

    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_cbor::Error),

    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced by a [`crate::source::DocumentSource`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// A whole page could not be fetched
    #[error("failed to fetch page at index {start_index}: {reason}")]
    Fetch { start_index: usize, reason: String },

    /// A single item was malformed and is skipped
    #[error("invalid document {id}: {reason}")]
    InvalidDocument { id: String, reason: String },
}

/// Errors raised while building or updating a profile.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("unknown interest tag: {0}")]
    UnknownInterest(String),
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Vectorize(#[from] VectorizeError),

    #[error(transparent)]
    Rank(#[from] RankError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Another ingestion batch is already running
    #[error("an ingestion batch is already in progress")]
    IngestInProgress,

    #[error("paper not found: {0}")]
    PaperNotFound(String),

    /// Compare-and-swap kept losing against concurrent writers
    #[error("gave up updating {key} after {attempts} conflicting writes")]
    RetriesExhausted { key: String, attempts: usize },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type used by the engine facade.
pub type Result<T> = std::result::Result<T, Error>;
