use std::path::PathBuf;

use thiserror::Error;
use vellum_ledger::Content;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("no content with id {0:?}")]
    NotFound(String),

    /// The write is durable and on the chain, but the index did not take
    /// it. The content is reachable by hash and will not show up in
    /// searches or `read(id)` until it is indexed.
    #[error("content {} stored but not indexed: {source}", .content.hash)]
    IndexLag {
        content: Box<Content>,
        #[source]
        source: vellum_index::IndexError,
    },

    #[error("failed to read config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] vellum_store::StoreError),

    #[error("chunker error: {0}")]
    Chunk(#[from] vellum_chunk::ChunkError),

    #[error("blob error: {0}")]
    Blob(#[from] vellum_blob::BlobError),

    #[error("head error: {0}")]
    Head(#[from] vellum_refs::RefError),

    #[error("index error: {0}")]
    Index(#[from] vellum_index::IndexError),

    #[error("ledger error: {0}")]
    Ledger(#[from] vellum_ledger::LedgerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
