//! JSON-lines game log on disk.

use std::{
    fs::OpenOptions,
    io::{BufRead, BufReader, ErrorKind, Write},
    path::{Path, PathBuf},
};

use fivepin_core::GameRecord;
use tracing::debug;

use super::{GameLog, StorageError};

/// Appends one JSON record per line to a file.
///
/// Each append opens the file in append mode and writes the whole line in
/// one call, so records from one lane never interleave. A missing file reads
/// as an empty log.
#[derive(Debug, Clone)]
pub struct FileGameLog {
    path: PathBuf,
}

impl FileGameLog {
    /// Log at `path`; the file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GameLog for FileGameLog {
    fn append(&self, record: &GameRecord) -> Result<(), StorageError> {
        let mut line = serde_json::to_vec(record).map_err(|e| StorageError::Serialization(e.to_string()))?;
        line.push(b'\n');

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(&line)?;
        file.flush()?;

        debug!(path = %self.path.display(), game = record.game_number, "game record appended");
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<GameRecord>, StorageError> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line)
                .map_err(|e| StorageError::Corrupt { line: index + 1, reason: e.to_string() })?;
            records.push(record);
        }
        Ok(records)
    }
}
