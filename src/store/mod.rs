//! Persistence interface for sparse vectors.
//!
//! Paper vectors are stored as `key -> SparseVector` records and user
//! profiles as `key -> UserProfile` records. Each record carries a version
//! so profile updates can use compare-and-swap instead of locking.

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::{error::StoreError, utils::datastruct::vector::SparseVector};

pub use memory::MemoryStore;

/// A stored value together with its write version.
/// The first write of a key has version 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

impl<T> Versioned<T> {
    pub fn new(version: u64, value: T) -> Self {
        Versioned { version, value }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Versioned key-value store, by default of sparse vectors.
///
/// Implementations must make `put_vector` and `compare_and_put` atomic per
/// key. Different keys never contend.
pub trait VectorStore<V = SparseVector>: Send + Sync {
    fn get_vector(&self, key: &str) -> Result<Option<Versioned<V>>, StoreError>;

    /// Replace the record unconditionally
    fn put_vector(&self, key: &str, value: V) -> Result<Versioned<V>, StoreError>;

    /// Replace the record only if its version is still `expected`.
    /// `None` means the key must not exist yet.
    ///
    /// Fails with [`StoreError::WriteConflict`] otherwise.
    fn compare_and_put(&self, key: &str, expected: Option<u64>, value: V) -> Result<Versioned<V>, StoreError>;

    fn remove_vector(&self, key: &str) -> Result<Option<V>, StoreError>;

    /// Every stored key
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.keys()?.len())
    }
}
