//! Virtual clock environment.
//!
//! Sleeping advances the clock instead of waiting, so a three second pin
//! check or an eight second ready timeout completes immediately and the
//! sequence of reads it performs is identical on every run.

use std::{
    ops::{Add, Sub},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use fivepin_core::Environment;

/// Wall clock origin reported by a fresh [`SimEnv`]: 2024-01-01T00:00:00Z.
pub const SIM_EPOCH_SECS: u64 = 1_704_067_200;

/// Instant on the virtual clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimInstant(Duration);

impl SimInstant {
    /// Time since the clock was created.
    pub fn since_start(self) -> Duration {
        self.0
    }
}

impl Sub for SimInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.0.saturating_sub(rhs.0)
    }
}

impl Add<Duration> for SimInstant {
    type Output = SimInstant;

    fn add(self, rhs: Duration) -> SimInstant {
        SimInstant(self.0 + rhs)
    }
}

/// Deterministic environment backed by a shared virtual clock.
///
/// Clones share the clock, so a controller, its tracker and the test all
/// observe the same time.
#[derive(Debug, Clone)]
pub struct SimEnv {
    nanos: Arc<AtomicU64>,
    epoch_secs: u64,
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl SimEnv {
    /// Clock at zero, wall clock at [`SIM_EPOCH_SECS`].
    pub fn new() -> Self {
        Self::with_epoch(SIM_EPOCH_SECS)
    }

    /// Clock at zero with a chosen wall clock origin.
    pub fn with_epoch(epoch_secs: u64) -> Self {
        Self { nanos: Arc::new(AtomicU64::new(0)), epoch_secs }
    }

    /// Moves the clock forward.
    pub fn advance(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Time since the clock was created.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        SimInstant(self.elapsed())
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        self.advance(duration);
        std::future::ready(())
    }

    fn wall_clock_secs(&self) -> u64 {
        self.epoch_secs + self.elapsed().as_secs()
    }
}
