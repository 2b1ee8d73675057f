//! Error types for head operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or replacing the head.
#[derive(Debug, Error)]
pub enum RefError {
    /// The persisted head failed its integrity check.
    #[error("corrupt head file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// A writer panicked while holding the head lock.
    #[error("head lock poisoned")]
    Poisoned,

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error during file-based head operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for head operations.
pub type Result<T> = std::result::Result<T, RefError>;
