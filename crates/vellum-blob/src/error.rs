use thiserror::Error;
use vellum_chunk::ChunkError;
use vellum_store::StoreError;
use vellum_types::Ref;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("chunker error: {0}")]
    Chunk(#[from] ChunkError),

    #[error("parts page {id} holds {count} refs, more than a page allows")]
    OversizedPage { id: Ref, count: usize },

    #[error("parts chain loops back to {0}")]
    Cycle(Ref),

    #[error("blob {id} size mismatch: recorded {expected}, read {actual}")]
    SizeMismatch { id: Ref, expected: u64, actual: u64 },

    #[error("blob {id} checksum mismatch: recorded {expected}, read {actual}")]
    ChecksumMismatch {
        id: Ref,
        expected: String,
        actual: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BlobResult<T> = Result<T, BlobError>;
