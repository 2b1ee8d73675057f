use vellum_types::Ref;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(Ref),

    /// The bytes offered for a ref do not hash to that ref.
    #[error("content does not match ref {expected}: hashes to {actual}")]
    ContentMismatch { expected: Ref, actual: Ref },

    /// Stored bytes no longer hash to their ref (data corruption).
    #[error("corrupt object {id}: stored bytes hash to {actual}")]
    Corrupt { id: Ref, actual: Ref },

    /// The object decoded, but not as the record kind the caller expected.
    #[error("unexpected record at {id}: expected {expected}, found {found}")]
    UnexpectedRecord {
        id: Ref,
        expected: String,
        found: String,
    },

    /// The object is not a well-formed record.
    #[error("invalid record {id}: {reason}")]
    InvalidRecord { id: Ref, reason: String },

    /// Serialization failure while encoding a record.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` if the error means the object is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
