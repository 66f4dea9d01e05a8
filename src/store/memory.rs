use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use crate::{
    error::StoreError,
    store::{VectorStore, Versioned},
    utils::datastruct::vector::SparseVector,
};

/// In-process [`VectorStore`] backed by a `HashMap` under a `RwLock`.
///
/// The whole map can be written to and read from CBOR, which is how it
/// survives restarts.
#[derive(Debug)]
pub struct MemoryStore<V = SparseVector> {
    records: RwLock<HashMap<String, Versioned<V>>>,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        MemoryStore {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Versioned<V>>> {
        // records are replaced whole, so a poisoned map is still consistent
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Versioned<V>>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Serialize + DeserializeOwned> MemoryStore<V> {
    /// Encode every record as CBOR into `writer`
    pub fn snapshot<W: Write>(&self, writer: W) -> Result<(), StoreError> {
        let records = self.read();
        serde_cbor::to_writer(writer, &*records)?;
        debug!(records = records.len(), "wrote store snapshot");
        Ok(())
    }

    /// Rebuild a store from a snapshot written by [`MemoryStore::snapshot`]
    pub fn restore<R: Read>(reader: R) -> Result<Self, StoreError> {
        let records: HashMap<String, Versioned<V>> = serde_cbor::from_reader(reader)?;
        debug!(records = records.len(), "restored store snapshot");
        Ok(MemoryStore {
            records: RwLock::new(records),
        })
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.snapshot(&mut writer)?;
        writer.flush()?;
        info!(path = %path.display(), "saved store");
        Ok(())
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let store = Self::restore(BufReader::new(File::open(path)?))?;
        info!(path = %path.display(), "loaded store");
        Ok(store)
    }
}

impl<V: Clone + Send + Sync> VectorStore<V> for MemoryStore<V> {
    fn get_vector(&self, key: &str) -> Result<Option<Versioned<V>>, StoreError> {
        Ok(self.read().get(key).cloned())
    }

    fn put_vector(&self, key: &str, value: V) -> Result<Versioned<V>, StoreError> {
        let mut records = self.write();
        let version = records.get(key).map_or(1, |r| r.version + 1);
        let record = Versioned::new(version, value);
        records.insert(key.to_string(), record.clone());
        Ok(record)
    }

    fn compare_and_put(&self, key: &str, expected: Option<u64>, value: V) -> Result<Versioned<V>, StoreError> {
        let mut records = self.write();
        let found = records.get(key).map(|r| r.version);
        if found != expected {
            return Err(StoreError::WriteConflict {
                key: key.to_string(),
                expected,
                found,
            });
        }
        let record = Versioned::new(found.map_or(1, |v| v + 1), value);
        records.insert(key.to_string(), record.clone());
        Ok(record)
    }

    fn remove_vector(&self, key: &str) -> Result<Option<V>, StoreError> {
        Ok(self.write().remove(key).map(Versioned::into_value))
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort_unstable();
        Ok(keys)
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::UserProfile;

    fn sv(pairs: &[(&str, f64)]) -> SparseVector {
        pairs.iter().copied().collect()
    }

    #[test]
    fn put_bumps_version() {
        let store: MemoryStore = MemoryStore::new();
        assert!(store.get_vector("u1").unwrap().is_none());
        assert_eq!(store.put_vector("u1", sv(&[("a", 1.0)])).unwrap().version, 1);
        assert_eq!(store.put_vector("u1", sv(&[("b", 1.0)])).unwrap().version, 2);
        let rec = store.get_vector("u1").unwrap().unwrap();
        assert_eq!(rec.value.get("b"), 1.0);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn compare_and_put_detects_stale_versions() {
        let store: MemoryStore = MemoryStore::new();
        let first = store.compare_and_put("u1", None, sv(&[("a", 1.0)])).unwrap();
        assert_eq!(first.version, 1);

        // a second creator loses
        let err = store.compare_and_put("u1", None, sv(&[("z", 1.0)])).unwrap_err();
        assert!(matches!(
            err,
            StoreError::WriteConflict { expected: None, found: Some(1), .. }
        ));

        let second = store.compare_and_put("u1", Some(1), sv(&[("b", 1.0)])).unwrap();
        assert_eq!(second.version, 2);
        assert!(store.compare_and_put("u1", Some(1), SparseVector::new()).is_err());
    }

    #[test]
    fn snapshot_restores_records_and_versions() {
        let store: MemoryStore = MemoryStore::new();
        store.put_vector("p1", sv(&[("graph", 0.6), ("nlp", 0.8)])).unwrap();
        store.put_vector("p2", sv(&[("robot", 1.0)])).unwrap();
        store.put_vector("p2", sv(&[("robot", 0.5)])).unwrap();

        let mut buf = Vec::new();
        store.snapshot(&mut buf).unwrap();
        let restored: MemoryStore = MemoryStore::restore(buf.as_slice()).unwrap();

        assert_eq!(restored.keys().unwrap(), vec!["p1", "p2"]);
        assert_eq!(restored.get_vector("p2").unwrap(), store.get_vector("p2").unwrap());
        assert_eq!(restored.get_vector("p2").unwrap().unwrap().version, 2);
    }

    #[test]
    fn user_records_survive_a_file_round_trip() {
        let store: MemoryStore<UserProfile> = MemoryStore::new();
        let mut user = UserProfile::from_vector(sv(&[("robot", 1.0)]));
        user.liked.insert("2405.001".to_string());
        store.put_vector("alice", user).unwrap();

        let path = std::env::temp_dir().join(format!("paper-rank-store-{}.cbor", std::process::id()));
        store.save_to(&path).unwrap();
        let loaded: MemoryStore<UserProfile> = MemoryStore::load_from(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let record = loaded.get_vector("alice").unwrap().unwrap();
        assert_eq!(record.version, 1);
        assert!(record.value.is_liked("2405.001"));
        assert_eq!(record.value.vector.get("robot"), 1.0);
    }

    #[test]
    fn remove_returns_the_vector() {
        let store: MemoryStore = MemoryStore::new();
        store.put_vector("p1", sv(&[("x", 1.0)])).unwrap();
        assert_eq!(store.remove_vector("p1").unwrap(), Some(sv(&[("x", 1.0)])));
        assert!(store.remove_vector("p1").unwrap().is_none());
    }
}
