//! Lane errors.

use fivepin_core::SessionError;
use fivepin_machine::HardwareError;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors returned for a lane request.
///
/// A rejected request leaves the session untouched.
#[derive(Error, Debug)]
pub enum LaneError {
    /// Scoring refused the request
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Pinsetter command failed; actuators were returned to safe levels
    #[error(transparent)]
    Hardware(#[from] HardwareError),

    /// Game log failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Request needs a game in progress
    #[error("no game in progress")]
    NoSession,

    /// Lane task has stopped
    #[error("lane runtime stopped")]
    Stopped,
}

impl LaneError {
    /// Whether the same request may succeed later.
    pub fn is_transient(&self) -> bool {
        match self {
            LaneError::Session(e) => e.is_transient(),
            LaneError::Hardware(e) => e.is_transient(),
            LaneError::Storage(e) => e.is_transient(),
            LaneError::NoSession | LaneError::Stopped => false,
        }
    }
}
