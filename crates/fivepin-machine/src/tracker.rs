//! Pin state tracker.
//!
//! Turns noisy sensor readings into a stable pin vector after a ball. Pins
//! wobble and fall late, so the tracker watches for a fixed window and only
//! ever moves pins from up to down.
//!
//! # Check sequence
//!
//! ```text
//!   all down already? ── yes ──> wait full window ──> AllDown
//!        │ no
//!        ▼
//!   ┌─> sleep ─> sweep 5 sensors ─> all down? ── yes ──> wait rest of window ──> AllDown
//!   │                                  │ no
//!   │                                  ▼
//!   │              stable for N sweeps, past minimum time, changed? ── yes ──> Changed
//!   │                                  │ no
//!   └─── sleep <── window left? ─ yes ─┘
//!                        │ no
//!                        ▼
//!                 Changed / NoChange
//! ```

use std::time::Duration;

use fivepin_core::{Environment, Pin, PinVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::hardware::{PinHardware, SensorId};

/// Default observation window after a ball.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(3);

/// Default delay before and after each sensor sweep.
pub const DEFAULT_READ_INTERVAL: Duration = Duration::from_millis(25);

/// Default minimum time before an early exit.
pub const DEFAULT_EARLY_EXIT_AFTER: Duration = Duration::from_secs(1);

/// Default number of unchanged sweeps that count as stable.
pub const DEFAULT_STABLE_SWEEPS: u32 = 10;

/// Default voltage at or above which a pin sensor reads "down".
pub const DEFAULT_DOWN_THRESHOLD: f32 = 4.0;

/// Order in which pin sensors are read each sweep.
pub const SWEEP_ORDER: [Pin; 5] = [Pin::Center, Pin::RightTwo, Pin::RightThree, Pin::LeftThree, Pin::LeftTwo];

/// Tracker timing and threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Observation window.
    pub window: Duration,
    /// Delay before and after each sweep.
    pub read_interval: Duration,
    /// Minimum time before an early exit.
    pub early_exit_after: Duration,
    /// Unchanged sweeps required for an early exit.
    pub stable_sweeps: u32,
    /// Pin-down voltage threshold.
    pub down_threshold: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            read_interval: DEFAULT_READ_INTERVAL,
            early_exit_after: DEFAULT_EARLY_EXIT_AFTER,
            stable_sweeps: DEFAULT_STABLE_SWEEPS,
            down_threshold: DEFAULT_DOWN_THRESHOLD,
        }
    }
}

/// Result classification of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinStatus {
    /// Nothing fell.
    NoChange,
    /// Some pins fell.
    Changed,
    /// Every pin is down.
    AllDown,
}

/// Outcome of [`PinStateTracker::check_pins`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinCheck {
    /// Pins that fell during this check.
    pub delta: PinVector,
    /// Pins down at the end of the check.
    pub pins_down: PinVector,
    /// Classification.
    pub status: PinStatus,
    /// Sensor reads that failed and were skipped.
    pub failed_reads: u32,
    /// Sweeps performed.
    pub sweeps: u32,
}

/// Debounces pin sensors over an observation window.
#[derive(Clone)]
pub struct PinStateTracker<H, E> {
    hardware: H,
    env: E,
    config: TrackerConfig,
}

impl<H: PinHardware, E: Environment> PinStateTracker<H, E> {
    /// Creates a tracker reading from `hardware`.
    pub fn new(hardware: H, env: E, config: TrackerConfig) -> Self {
        Self { hardware, env, config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Watches the sensors until the pins settle or the window closes.
    ///
    /// `current` is the set of pins already known to be down; they are not
    /// read again. Read failures are logged and count as "no transition" for
    /// that sample.
    pub async fn check_pins(&self, current: PinVector) -> PinCheck {
        let start = self.env.now();

        if current.is_all_down() {
            debug!("all pins already down, waiting out window");
            self.env.sleep(self.config.window).await;
            return PinCheck {
                delta: PinVector::EMPTY,
                pins_down: PinVector::ALL,
                status: PinStatus::AllDown,
                failed_reads: 0,
                sweeps: 0,
            };
        }

        let mut down = current;
        let mut stable = 0u32;
        let mut failed_reads = 0u32;
        let mut sweeps = 0u32;

        while self.env.now() - start < self.config.window {
            let before = down;
            self.env.sleep(self.config.read_interval).await;

            for pin in SWEEP_ORDER {
                if down.is_down(pin) {
                    continue;
                }
                match self.hardware.read_voltage(SensorId::Pin(pin)) {
                    Ok(volts) if volts >= self.config.down_threshold => {
                        debug!(%pin, volts, "pin down");
                        down = down.with(pin);
                    },
                    Ok(_) => {},
                    Err(error) => {
                        failed_reads += 1;
                        warn!(%pin, %error, "pin sensor read failed");
                    },
                }
            }
            sweeps += 1;

            if down.is_all_down() {
                let elapsed = self.env.now() - start;
                self.env.sleep(self.config.window.saturating_sub(elapsed)).await;
                return PinCheck {
                    delta: down.without(current),
                    pins_down: down,
                    status: PinStatus::AllDown,
                    failed_reads,
                    sweeps,
                };
            }

            stable = if down == before { stable + 1 } else { 0 };
            let elapsed = self.env.now() - start;
            if stable >= self.config.stable_sweeps && elapsed >= self.config.early_exit_after && down != current {
                debug!(?elapsed, sweeps, "pins stable, leaving window early");
                break;
            }

            self.env.sleep(self.config.read_interval).await;
        }

        let status = if down == current { PinStatus::NoChange } else { PinStatus::Changed };
        PinCheck { delta: down.without(current), pins_down: down, status, failed_reads, sweeps }
    }
}
