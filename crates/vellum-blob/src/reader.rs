use std::io::{self, Cursor, Read};

use vellum_crypto::Checksum;
use vellum_store::{DataNode, RecordStore, Store};
use vellum_types::Ref;

use crate::error::{BlobError, BlobResult};
use crate::parts::collect_refs;

/// Streams a blob's payload back in order.
///
/// The chunk ref list is resolved when the reader is opened; chunk bytes
/// are fetched one chunk at a time as the caller reads.
pub struct BlobReader<'a, S: ?Sized> {
    store: &'a S,
    data: DataNode,
    refs: Vec<Ref>,
    next: usize,
    current: Cursor<Vec<u8>>,
}

impl<'a, S: Store + ?Sized> BlobReader<'a, S> {
    pub fn open(store: &'a S, blob_ref: &Ref) -> BlobResult<Self> {
        let data = store.read_data(blob_ref)?;
        let refs = collect_refs(store, blob_ref, data.clone())?;
        Ok(Self {
            store,
            data,
            refs,
            next: 0,
            current: Cursor::new(Vec::new()),
        })
    }

    /// Size recorded in the Data node.
    pub fn size(&self) -> u64 {
        self.data.size
    }

    /// Checksum recorded in the Data node.
    pub fn checksum(&self) -> &str {
        &self.data.checksum
    }

    pub fn chunk_refs(&self) -> &[Ref] {
        &self.refs
    }
}

impl<S: Store + ?Sized> Read for BlobReader<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let n = self.current.read(buf)?;
            if n > 0 {
                return Ok(n);
            }
            let Some(id) = self.refs.get(self.next) else {
                return Ok(0);
            };
            let bytes = self.store.read(id).map_err(io::Error::other)?;
            self.current = Cursor::new(bytes);
            self.next += 1;
        }
    }
}

impl<S: ?Sized> std::fmt::Debug for BlobReader<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobReader")
            .field("size", &self.data.size)
            .field("chunks", &self.refs.len())
            .field("next", &self.next)
            .finish()
    }
}

/// Re-read a whole blob and check it against its Data node.
///
/// Returns the Data node when both the size and the checksum match.
pub fn verify_blob<S: Store + ?Sized>(store: &S, blob_ref: &Ref) -> BlobResult<DataNode> {
    let mut reader = BlobReader::open(store, blob_ref)?;
    let mut checksum = Checksum::new();
    io::copy(&mut reader, &mut checksum)?;

    let data = reader.data;
    if checksum.len() != data.size {
        return Err(BlobError::SizeMismatch {
            id: *blob_ref,
            expected: data.size,
            actual: checksum.len(),
        });
    }
    let actual = checksum.finalize_hex();
    if actual != data.checksum {
        return Err(BlobError::ChecksumMismatch {
            id: *blob_ref,
            expected: data.checksum,
            actual,
        });
    }
    Ok(data)
}
