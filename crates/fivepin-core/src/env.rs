//! Environment abstraction for deterministic testing.
//!
//! Decouples lane timing from the system clock. Production uses real time and
//! tokio sleeps; simulations advance a virtual clock so a three second pin
//! check finishes instantly and identically on every run.

use std::{
    fmt::Debug,
    ops::{Add, Sub},
    time::Duration,
};

/// Time source and sleeper for the machine and lane layers.
///
/// # Invariants
///
/// - `now()` never goes backwards
/// - `sleep(d)` returns no earlier than `d` after it was called, as observed
///   through `now()`
pub trait Environment: Clone + Send + Sync + 'static {
    /// Instant type used by this environment.
    ///
    /// Production uses `std::time::Instant`; simulations use a virtual
    /// instant.
    type Instant: Copy + Ord + Debug + Send + Sync + Sub<Output = Duration> + Add<Duration, Output = Self::Instant>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Sleeps for `duration`.
    ///
    /// The only suspension point the pinsetter logic uses. Every call site is
    /// bounded by a configured window or timeout.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Wall clock time in Unix seconds, for records.
    fn wall_clock_secs(&self) -> u64;
}
