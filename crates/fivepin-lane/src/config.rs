//! Lane configuration.
//!
//! Loaded from a JSON settings file; every field is optional and falls back
//! to the defaults below. Durations are given in milliseconds.
//!
//! ```json
//! {
//!   "lane_id": 3,
//!   "game_log": "/var/lib/fivepin/lane3.jsonl",
//!   "tracker": { "window_ms": 2500 },
//!   "machine": { "ready_timeout_ms": 6000 }
//! }
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use fivepin_core::LaneId;
use fivepin_machine::{MachineConfig, TrackerConfig, tracker};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::runtime::RuntimeConfig;

/// Configuration errors. Fatal at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Settings file could not be read
    #[error("cannot read {path}: {reason}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// OS error text
        reason: String,
    },

    /// Settings file is not valid JSON for this schema
    #[error("invalid settings: {0}")]
    Parse(String),

    /// A value is out of range
    #[error("invalid setting {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Whole-lane settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    /// This lane.
    pub lane_id: LaneId,
    /// Default partner for league games.
    pub paired_lane: Option<LaneId>,
    /// JSON-lines game log; in-memory when unset.
    pub game_log: Option<PathBuf>,
    /// Pin tracker timing.
    pub tracker: TrackerSettings,
    /// Pinsetter timing.
    pub machine: MachineSettings,
    /// Runtime channel sizes and tick.
    pub runtime: RuntimeSettings,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            lane_id: 1,
            paired_lane: None,
            game_log: None,
            tracker: TrackerSettings::default(),
            machine: MachineSettings::default(),
            runtime: RuntimeSettings::default(),
        }
    }
}

/// Tracker settings as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// Observation window.
    pub window_ms: u64,
    /// Delay before and after each sweep.
    pub read_interval_ms: u64,
    /// Minimum time before an early exit.
    pub early_exit_after_ms: u64,
    /// Unchanged sweeps required for an early exit.
    pub stable_sweeps: u32,
    /// Pin-down voltage threshold.
    pub down_threshold: f32,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            window_ms: millis(tracker::DEFAULT_WINDOW),
            read_interval_ms: millis(tracker::DEFAULT_READ_INTERVAL),
            early_exit_after_ms: millis(tracker::DEFAULT_EARLY_EXIT_AFTER),
            stable_sweeps: tracker::DEFAULT_STABLE_SWEEPS,
            down_threshold: tracker::DEFAULT_DOWN_THRESHOLD,
        }
    }
}

/// Pinsetter settings as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// Reset pulse width.
    pub reset_pulse_ms: u64,
    /// Limit on the ready wait.
    pub ready_timeout_ms: u64,
    /// Ready sensor poll interval.
    pub ready_poll_ms: u64,
    /// Ready read errors tolerated.
    pub ready_max_errors: u32,
    /// Ready sensor voltage threshold.
    pub ready_threshold: f32,
    /// Knock-down pulse width.
    pub knock_pulse_ms: u64,
    /// Pin-setting cool-down before a frame's last ball.
    pub final_ball_suspension_ms: u64,
    /// Write attempts per line during an emergency all-high.
    pub emergency_attempts: u32,
}

impl Default for MachineSettings {
    fn default() -> Self {
        let defaults = MachineConfig::default();
        Self {
            reset_pulse_ms: millis(defaults.reset_pulse),
            ready_timeout_ms: millis(defaults.ready_timeout),
            ready_poll_ms: millis(defaults.ready_poll),
            ready_max_errors: defaults.ready_max_errors,
            ready_threshold: defaults.ready_threshold,
            knock_pulse_ms: millis(defaults.knock_pulse),
            final_ball_suspension_ms: millis(defaults.final_ball_suspension),
            emergency_attempts: defaults.emergency_attempts,
        }
    }
}

/// Runtime settings as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Queued requests before senders wait.
    pub request_capacity: usize,
    /// Events buffered per subscriber.
    pub event_capacity: usize,
    /// Interval for applying deferred placements; 0 disables the tick.
    pub tick_interval_ms: u64,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self { request_capacity: 64, event_capacity: 256, tick_interval_ms: 250 }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl LaneConfig {
    /// Reads and validates a settings file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io { path: path.to_path_buf(), reason: e.to_string() })?;
        Self::from_json(&text)
    }

    /// Parses and validates settings.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the lane cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.tracker;
        if t.window_ms == 0 {
            return Err(invalid("tracker.window_ms", "must be positive"));
        }
        if t.read_interval_ms == 0 {
            return Err(invalid("tracker.read_interval_ms", "must be positive"));
        }
        if t.early_exit_after_ms > t.window_ms {
            return Err(invalid("tracker.early_exit_after_ms", "exceeds the window"));
        }
        if !t.down_threshold.is_finite() || t.down_threshold <= 0.0 {
            return Err(invalid("tracker.down_threshold", "must be a positive voltage"));
        }

        let m = &self.machine;
        if m.ready_poll_ms == 0 {
            return Err(invalid("machine.ready_poll_ms", "must be positive"));
        }
        if m.ready_timeout_ms == 0 {
            return Err(invalid("machine.ready_timeout_ms", "must be positive"));
        }
        if m.emergency_attempts == 0 {
            return Err(invalid("machine.emergency_attempts", "must be at least 1"));
        }
        if !m.ready_threshold.is_finite() || m.ready_threshold <= 0.0 {
            return Err(invalid("machine.ready_threshold", "must be a positive voltage"));
        }

        if self.runtime.request_capacity == 0 || self.runtime.event_capacity == 0 {
            return Err(invalid("runtime", "channel capacities must be positive"));
        }
        if self.paired_lane == Some(self.lane_id) {
            return Err(invalid("paired_lane", "a lane cannot pair with itself"));
        }
        Ok(())
    }

    /// Tracker configuration.
    pub fn tracker_config(&self) -> TrackerConfig {
        let t = &self.tracker;
        TrackerConfig {
            window: Duration::from_millis(t.window_ms),
            read_interval: Duration::from_millis(t.read_interval_ms),
            early_exit_after: Duration::from_millis(t.early_exit_after_ms),
            stable_sweeps: t.stable_sweeps,
            down_threshold: t.down_threshold,
        }
    }

    /// Pinsetter configuration.
    pub fn machine_config(&self) -> MachineConfig {
        let m = &self.machine;
        MachineConfig {
            reset_pulse: Duration::from_millis(m.reset_pulse_ms),
            ready_timeout: Duration::from_millis(m.ready_timeout_ms),
            ready_poll: Duration::from_millis(m.ready_poll_ms),
            ready_max_errors: m.ready_max_errors,
            ready_threshold: m.ready_threshold,
            knock_pulse: Duration::from_millis(m.knock_pulse_ms),
            final_ball_suspension: Duration::from_millis(m.final_ball_suspension_ms),
            emergency_attempts: m.emergency_attempts,
        }
    }

    /// Runtime configuration.
    pub fn runtime_config(&self) -> RuntimeConfig {
        let r = &self.runtime;
        RuntimeConfig {
            request_capacity: r.request_capacity,
            event_capacity: r.event_capacity,
            tick_interval: (r.tick_interval_ms > 0).then(|| Duration::from_millis(r.tick_interval_ms)),
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.to_string() }
}
