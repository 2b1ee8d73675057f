//! Error types for the index crate.

/// Errors from parsing a textual query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("unknown operator: {0:?}")]
    UnknownOperator(String),

    #[error("unterminated quote in query")]
    UnterminatedQuote,
}

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The caller paged against a different index instance.
    #[error("index version mismatch: requested {requested}, current {current}")]
    IndexVersionMismatch { requested: String, current: String },

    /// The requested page is empty.
    #[error("no results")]
    NoResults,

    #[error("invalid query: {0}")]
    Query(#[from] QueryError),

    /// The backing index failed.
    #[error("index backend error: {0}")]
    Backend(String),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
