use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::names::validate_blob_name;
use crate::traits::BlobStore;

/// In-memory, HashMap-based blob store.
///
/// Intended for tests and embedding. Blobs are held behind a `RwLock`; a
/// single `insert` is trivially all-or-nothing. Contents are lost when the
/// store is dropped.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Unavailable(format!("lock poisoned: {e}"))
}

impl InMemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.blobs.read().map_err(poisoned)?.len())
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn read(&self, name: &str) -> StoreResult<Option<Vec<u8>>> {
        validate_blob_name(name)?;
        let map = self.blobs.read().map_err(poisoned)?;
        Ok(map.get(name).cloned())
    }

    fn write(&self, name: &str, data: &[u8]) -> StoreResult<()> {
        validate_blob_name(name)?;
        let mut map = self.blobs.write().map_err(poisoned)?;
        map.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn delete(&self, name: &str) -> StoreResult<bool> {
        validate_blob_name(name)?;
        let mut map = self.blobs.write().map_err(poisoned)?;
        Ok(map.remove(name).is_some())
    }

    fn exists(&self, name: &str) -> StoreResult<bool> {
        validate_blob_name(name)?;
        let map = self.blobs.read().map_err(poisoned)?;
        Ok(map.contains_key(name))
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len().ok())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_and_read() {
        let store = InMemoryBlobStore::new();
        store.write("1.dat", b"hello").unwrap();
        assert_eq!(store.read("1.dat").unwrap().as_deref(), Some(&b"hello"[..]));
    }

    #[test]
    fn read_missing_is_none() {
        let store = InMemoryBlobStore::new();
        assert!(store.read("1.dat").unwrap().is_none());
        assert!(!store.exists("1.dat").unwrap());
    }

    #[test]
    fn overwrite_replaces() {
        let store = InMemoryBlobStore::new();
        store.write("id.txt", b"1").unwrap();
        store.write("id.txt", b"2").unwrap();
        assert_eq!(store.read("id.txt").unwrap().unwrap(), b"2");
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn delete_reports_existence() {
        let store = InMemoryBlobStore::new();
        store.write("5.dat", b"x").unwrap();
        assert!(store.delete("5.dat").unwrap());
        assert!(!store.delete("5.dat").unwrap());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn invalid_name_rejected() {
        let store = InMemoryBlobStore::new();
        assert!(matches!(
            store.write("../x", b""),
            Err(StoreError::InvalidName { .. })
        ));
    }

    #[test]
    fn poisoned_lock_reported_as_unavailable() {
        let store = std::sync::Arc::new(InMemoryBlobStore::new());
        store.write("1.dat", b"x").unwrap();
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.blobs.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(store.len(), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.is_empty(), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.read("1.dat"), Err(StoreError::Unavailable(_))));
    }
}
