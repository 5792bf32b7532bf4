//! Storage error types.

use thiserror::Error;

/// Errors from the game log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Record could not be encoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored line is not a record
    #[error("corrupt record on line {line}: {reason}")]
    Corrupt {
        /// One-based line number
        line: usize,
        /// Parser message
        reason: String,
    },

    /// I/O error (file system, disk full, etc.)
    #[error("I/O error: {0}")]
    Io(String),
}

impl StorageError {
    /// Whether retrying may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Io(_))
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}
