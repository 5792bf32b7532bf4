//! Codec errors.

use thiserror::Error;

/// Failures while decoding or encoding lane messages.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Line held only whitespace
    #[error("empty line")]
    EmptyLine,

    /// Line exceeded the size limit
    #[error("line of {len} bytes exceeds limit of {max}")]
    LineTooLong {
        /// Observed length
        len: usize,
        /// Limit
        max: usize,
    },

    /// JSON did not match any message
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
}
