//! Hardware errors.

use thiserror::Error;

use crate::hardware::{OutputLine, SensorId};

/// Failures reported by a [`PinHardware`](crate::PinHardware) implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HardwareError {
    /// Analog read failed
    #[error("read of {sensor:?} failed: {reason}")]
    SensorRead {
        /// Sensor that failed
        sensor: SensorId,
        /// Driver message
        reason: String,
    },

    /// Digital write failed
    #[error("write to {line:?} failed: {reason}")]
    OutputWrite {
        /// Line that failed
        line: OutputLine,
        /// Driver message
        reason: String,
    },

    /// Device is not present or not initialised
    #[error("hardware unavailable: {0}")]
    Unavailable(String),
}

impl HardwareError {
    /// Returns true if the same operation may succeed on retry.
    ///
    /// Individual reads and writes glitch; a missing device does not come
    /// back on its own.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::SensorRead { .. } | Self::OutputWrite { .. })
    }
}
