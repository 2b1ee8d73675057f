use std::collections::HashMap;
use std::sync::RwLock;

use vellum_types::Ref;

use crate::error::{StoreError, StoreResult};
use crate::traits::{RefIter, Store};

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. All objects are held in memory behind a
/// `RwLock` for safe concurrent access. Objects are cloned on read/write.
pub struct InMemoryStore {
    objects: RwLock<HashMap<Ref, Vec<u8>>>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Return a sorted list of all refs in the store.
    pub fn all_refs(&self) -> Vec<Ref> {
        let map = self.objects.read().expect("lock poisoned");
        let mut ids: Vec<Ref> = map.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for InMemoryStore {
    fn exists(&self, id: &Ref) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }

    fn read(&self, id: &Ref) -> StoreResult<Vec<u8>> {
        let map = self.objects.read().expect("lock poisoned");
        map.get(id).cloned().ok_or(StoreError::NotFound(*id))
    }

    fn write(&self, data: &[u8]) -> StoreResult<Ref> {
        let id = self.hasher().hash(data);
        let mut map = self.objects.write().expect("lock poisoned");
        map.entry(id).or_insert_with(|| data.to_vec());
        Ok(id)
    }

    fn list(&self) -> StoreResult<RefIter<'_>> {
        Ok(Box::new(self.all_refs().into_iter().map(Ok::<Ref, StoreError>)))
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryStore")
            .field("object_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use vellum_crypto::Hasher;

    // -----------------------------------------------------------------------
    // Core read/write
    // -----------------------------------------------------------------------

    #[test]
    fn write_and_read_bytes() {
        let store = InMemoryStore::new();
        let id = store.write(b"hello world").unwrap();
        assert_eq!(store.read(&id).unwrap(), b"hello world");
    }

    #[test]
    fn read_missing_object_is_not_found() {
        let store = InMemoryStore::new();
        let id = Hasher::BLAKE3.hash(b"missing");
        let err = store.read(&id).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn open_streams_bytes() {
        let store = InMemoryStore::new();
        let id = store.write(b"streamed").unwrap();
        let mut buf = String::new();
        store.open(&id).unwrap().read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "streamed");
    }

    // -----------------------------------------------------------------------
    // Content-addressing correctness
    // -----------------------------------------------------------------------

    #[test]
    fn write_is_idempotent() {
        let store = InMemoryStore::new();
        let id1 = store.write(b"identical content").unwrap();
        let id2 = store.write(b"identical content").unwrap();
        assert_eq!(id1, id2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn ref_is_hash_of_bytes() {
        let store = InMemoryStore::new();
        let id = store.write(b"verify me").unwrap();
        assert_eq!(id, Hasher::BLAKE3.hash(b"verify me"));
    }

    // -----------------------------------------------------------------------
    // write_hash
    // -----------------------------------------------------------------------

    #[test]
    fn write_hash_accepts_matching_ref() {
        let store = InMemoryStore::new();
        let id = Hasher::BLAKE3.hash(b"payload");
        store.write_hash(&id, b"payload").unwrap();
        assert!(store.exists(&id).unwrap());
    }

    #[test]
    fn write_hash_rejects_mismatch_and_leaves_store_unchanged() {
        let store = InMemoryStore::new();
        let claimed = Hasher::BLAKE3.hash(b"what the client promised");
        assert!(!store.exists(&claimed).unwrap());

        let err = store.write_hash(&claimed, b"what the client sent").unwrap_err();
        assert!(matches!(err, StoreError::ContentMismatch { expected, .. } if expected == claimed));
        assert!(!store.exists(&claimed).unwrap());
        assert!(store.is_empty());
    }

    // -----------------------------------------------------------------------
    // Listing and utilities
    // -----------------------------------------------------------------------

    #[test]
    fn list_returns_every_ref() {
        let store = InMemoryStore::new();
        let a = store.write(b"aaa").unwrap();
        let b = store.write(b"bbb").unwrap();
        let listed: Vec<Ref> = store.list().unwrap().collect::<StoreResult<_>>().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.contains(&a));
        assert!(listed.contains(&b));
    }

    #[test]
    fn concurrent_writes_of_same_bytes_store_one_copy() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.write(b"shared data").unwrap())
            })
            .collect();

        let ids: Vec<Ref> = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryStore::new();
        store.write(b"x").unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryStore"));
        assert!(debug.contains("object_count"));
    }
}
