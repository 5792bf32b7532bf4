//! In-memory game log.

#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::sync::{Arc, Mutex};

use fivepin_core::GameRecord;

use super::{GameLog, StorageError};

/// In-memory game log for tests, simulation and lanes without a log file.
///
/// Clones share the same records.
#[derive(Clone, Default)]
pub struct MemoryGameLog {
    records: Arc<Mutex<Vec<GameRecord>>>,
}

impl MemoryGameLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[allow(clippy::expect_used)]
    pub fn len(&self) -> usize {
        self.records.lock().expect("Mutex poisoned").len()
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GameLog for MemoryGameLog {
    #[allow(clippy::expect_used)]
    fn append(&self, record: &GameRecord) -> Result<(), StorageError> {
        self.records.lock().expect("Mutex poisoned").push(record.clone());
        Ok(())
    }

    #[allow(clippy::expect_used)]
    fn load_all(&self) -> Result<Vec<GameRecord>, StorageError> {
        Ok(self.records.lock().expect("Mutex poisoned").clone())
    }
}
