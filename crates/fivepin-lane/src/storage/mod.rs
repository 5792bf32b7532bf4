//! Game log.
//!
//! Finished games are appended as [`GameRecord`]s. The trait is synchronous;
//! a record is a few kilobytes written once per game.

mod chaotic;
mod error;
mod file;
mod memory;

pub use chaotic::ChaoticGameLog;
pub use error::StorageError;
use fivepin_core::GameRecord;
pub use file::FileGameLog;
pub use memory::MemoryGameLog;

/// Append-only store of finished games.
///
/// Must be Clone, Send + Sync and synchronous. Implementations share state
/// through `Arc` or the file system, so clones see the same log.
pub trait GameLog: Clone + Send + Sync + 'static {
    /// Appends one record.
    ///
    /// # Invariants
    ///
    /// - Post: the record is last in [`GameLog::load_all`]
    fn append(&self, record: &GameRecord) -> Result<(), StorageError>;

    /// Every record, oldest first.
    fn load_all(&self) -> Result<Vec<GameRecord>, StorageError>;
}
