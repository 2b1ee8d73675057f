use std::io::{Cursor, Read};

use vellum_crypto::Hasher;
use vellum_types::Ref;

use crate::error::{StoreError, StoreResult};

/// Lazy sequence of refs produced by [`Store::list`].
pub type RefIter<'a> = Box<dyn Iterator<Item = StoreResult<Ref>> + Send + 'a>;

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. The same bytes always produce the
///   same ref, and writing them again is a no-op.
/// - `write_hash` verifies before it writes: on mismatch the store is left
///   unchanged.
/// - Concurrent reads and writes are always safe.
/// - The store never interprets object contents.
/// - All I/O errors are propagated, never silently ignored.
pub trait Store: Send + Sync {
    /// The hasher this store addresses objects with.
    fn hasher(&self) -> Hasher {
        Hasher::BLAKE3
    }

    /// Check whether an object exists in the store.
    fn exists(&self, id: &Ref) -> StoreResult<bool>;

    /// Read the exact bytes stored under `id`.
    ///
    /// Returns [`StoreError::NotFound`] if the object does not exist.
    fn read(&self, id: &Ref) -> StoreResult<Vec<u8>>;

    /// Write bytes and return their ref.
    ///
    /// If the object already exists, this is a no-op (idempotent).
    fn write(&self, data: &[u8]) -> StoreResult<Ref>;

    /// List every stored ref.
    ///
    /// Intended for maintenance tools; the order is unspecified.
    fn list(&self) -> StoreResult<RefIter<'_>>;

    /// Open the bytes stored under `id` as a reader.
    ///
    /// The default implementation reads the object fully into memory.
    /// Backends may override to stream from their medium.
    fn open(&self, id: &Ref) -> StoreResult<Box<dyn Read + Send + '_>> {
        Ok(Box::new(Cursor::new(self.read(id)?)))
    }

    /// Write bytes under a caller-supplied ref.
    ///
    /// Fails with [`StoreError::ContentMismatch`] when the bytes do not hash
    /// to `id`; nothing is written in that case.
    fn write_hash(&self, id: &Ref, data: &[u8]) -> StoreResult<()> {
        let actual = self.hasher().hash(data);
        if actual != *id {
            return Err(StoreError::ContentMismatch {
                expected: *id,
                actual,
            });
        }
        self.write(data)?;
        Ok(())
    }
}

impl<S: Store + ?Sized> Store for std::sync::Arc<S> {
    fn hasher(&self) -> Hasher {
        (**self).hasher()
    }

    fn exists(&self, id: &Ref) -> StoreResult<bool> {
        (**self).exists(id)
    }

    fn read(&self, id: &Ref) -> StoreResult<Vec<u8>> {
        (**self).read(id)
    }

    fn write(&self, data: &[u8]) -> StoreResult<Ref> {
        (**self).write(data)
    }

    fn list(&self) -> StoreResult<RefIter<'_>> {
        (**self).list()
    }

    fn open(&self, id: &Ref) -> StoreResult<Box<dyn Read + Send + '_>> {
        (**self).open(id)
    }

    fn write_hash(&self, id: &Ref, data: &[u8]) -> StoreResult<()> {
        (**self).write_hash(id, data)
    }
}
