use vellum_blob::BlobError;
use vellum_index::IndexError;
use vellum_refs::RefError;
use vellum_store::StoreError;

/// Errors produced by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Nothing has been appended yet.
    #[error("the chain is empty")]
    EmptyChain,

    /// The block is the genesis block.
    #[error("block #1 has no previous block")]
    NoPreviousBlock,

    /// The version is the first of its id.
    #[error("content has no previous version")]
    NoPreviousVersion,

    #[error("integrity violation at block #{number}: {reason}")]
    IntegrityViolation { number: u64, reason: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("blob error: {0}")]
    Blob(#[from] BlobError),

    #[error("head error: {0}")]
    Head(#[from] RefError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
