use std::io::Read;

use tracing::debug;
use vellum_chunk::{ChunkerConfig, Roller};
use vellum_crypto::Checksum;
use vellum_store::Store;
use vellum_types::Ref;

use crate::error::BlobResult;
use crate::parts::{assemble, Assembled};

/// What a [`ChunkWriter`] stored for one payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkSummary {
    /// Chunk refs in payload order.
    pub refs: Vec<Ref>,
    /// Total payload size in bytes.
    pub size: u64,
    /// Hex digest of the concatenated payload bytes.
    pub checksum: String,
    /// Average chunk size the payload was split with.
    pub average_chunk_size: u64,
}

/// Drives a [`Roller`] and writes every chunk to a store.
pub struct ChunkWriter<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> ChunkWriter<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Consume `roller`, storing each chunk's raw bytes.
    ///
    /// Re-writing a chunk that already exists is a no-op in the store, so
    /// unchanged regions of a new version cost nothing. An error aborts the
    /// write; chunks stored before it stay behind as orphans.
    pub fn write_all<R: Read>(&self, roller: Roller<R>) -> BlobResult<ChunkSummary> {
        let average_chunk_size = roller.config().average_size as u64;
        let mut checksum = Checksum::new();
        let mut refs = Vec::new();

        for chunk in roller {
            let chunk = chunk?;
            refs.push(self.store.write(&chunk.bytes)?);
            checksum.update(&chunk.bytes);
        }

        debug!(chunks = refs.len(), size = checksum.len(), "wrote chunks");
        Ok(ChunkSummary {
            refs,
            size: checksum.len(),
            checksum: checksum.finalize_hex(),
            average_chunk_size,
        })
    }
}

/// Chunk, store and assemble a whole payload. Returns the assembled blob,
/// whose `written` list starts with the chunk refs.
pub fn write_blob<S, R>(store: &S, reader: R, config: ChunkerConfig) -> BlobResult<Assembled>
where
    S: Store + ?Sized,
    R: Read,
{
    let roller = Roller::new(reader, config)?;
    let summary = ChunkWriter::new(store).write_all(roller)?;
    let mut assembled = assemble(store, &summary)?;

    let mut written = summary.refs;
    written.append(&mut assembled.written);
    assembled.written = written;
    Ok(assembled)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};
    use vellum_crypto::Hasher;
    use vellum_store::{InMemoryStore, RecordStore};

    use super::*;

    fn payload(len: usize) -> Vec<u8> {
        let mut data = vec![0u8; len];
        StdRng::seed_from_u64(len as u64).fill_bytes(&mut data);
        data
    }

    #[test]
    fn summary_tracks_size_and_checksum() {
        let store = InMemoryStore::new();
        let data = payload(10_000);
        let config = ChunkerConfig::new(256, 64, 1024).unwrap();
        let roller = Roller::new(Cursor::new(data.clone()), config).unwrap();

        let summary = ChunkWriter::new(&store).write_all(roller).unwrap();
        assert_eq!(summary.size, 10_000);
        assert_eq!(summary.checksum, Hasher::BLAKE3.checksum_of(&data));
        assert_eq!(summary.average_chunk_size, 256);
        assert!(summary.refs.len() > 1);
        for id in &summary.refs {
            assert!(store.exists(id).unwrap());
        }
    }

    #[test]
    fn checksum_is_independent_of_chunking() {
        let store = InMemoryStore::new();
        let data = payload(20_000);
        let small = ChunkerConfig::new(128, 32, 512).unwrap();
        let large = ChunkerConfig::new(4096, 1024, 16384).unwrap();

        let a = ChunkWriter::new(&store)
            .write_all(Roller::new(Cursor::new(data.clone()), small).unwrap())
            .unwrap();
        let b = ChunkWriter::new(&store)
            .write_all(Roller::new(Cursor::new(data), large).unwrap())
            .unwrap();
        assert_ne!(a.refs, b.refs);
        assert_eq!(a.checksum, b.checksum);
    }

    #[test]
    fn rewriting_a_payload_stores_nothing_new() {
        let store = InMemoryStore::new();
        let data = payload(30_000);
        let config = ChunkerConfig::new(256, 64, 1024).unwrap();

        let first = write_blob(&store, Cursor::new(data.clone()), config).unwrap();
        let objects = store.len();
        let second = write_blob(&store, Cursor::new(data), config).unwrap();

        assert_eq!(first.blob_ref, second.blob_ref);
        assert_eq!(store.len(), objects);
    }

    #[test]
    fn written_lists_chunks_then_tree() {
        let store = InMemoryStore::new();
        let config = ChunkerConfig::new(256, 64, 1024).unwrap();
        let assembled = write_blob(&store, Cursor::new(payload(5_000)), config).unwrap();

        assert_eq!(assembled.written.last(), Some(&assembled.blob_ref));
        let data = store.read_data(&assembled.blob_ref).unwrap();
        assert_eq!(data.size, 5_000);
        assert!(assembled.written.starts_with(&data.parts));
    }

    #[test]
    fn empty_payload_is_an_empty_data_node() {
        let store = InMemoryStore::new();
        let assembled = write_blob(&store, Cursor::new(Vec::new()), ChunkerConfig::default()).unwrap();
        let data = store.read_data(&assembled.blob_ref).unwrap();
        assert!(data.parts.is_empty());
        assert_eq!(data.size, 0);
        assert_eq!(assembled.written, vec![assembled.blob_ref]);
    }
}
