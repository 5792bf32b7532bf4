//! Chaotic game log wrapper for fault injection testing
//!
//! Fails appends and loads at a configured rate so tests can check that a
//! failing log never interrupts play.

#![allow(clippy::disallowed_types, reason = "Locking simple RNG state")]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use fivepin_core::GameRecord;

use super::{GameLog, StorageError};

/// Game log wrapper that randomly injects I/O failures.
#[derive(Clone)]
pub struct ChaoticGameLog<S: GameLog> {
    inner: S,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    rng: Arc<Mutex<ChaoticRng>>,
    injected: Arc<AtomicUsize>,
}

/// Linear congruential generator so chaos runs repeat with the same seed.
struct ChaoticRng {
    state: u64,
}

impl ChaoticRng {
    /// Next value in [0.0, 1.0)
    fn next(&mut self) -> f64 {
        // LCG constants from Numerical Recipes
        const A: u64 = 1_664_525;
        const C: u64 = 1_013_904_223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        (self.state as f64) / (M as f64)
    }
}

impl<S: GameLog> ChaoticGameLog<S> {
    /// Wraps `inner`.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn new(inner: S, failure_rate: f64, seed: u64) -> Self {
        assert!((0.0..=1.0).contains(&failure_rate), "failure_rate must be in [0.0, 1.0], got {failure_rate}");
        Self {
            inner,
            failure_rate,
            rng: Arc::new(Mutex::new(ChaoticRng { state: seed })),
            injected: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wrapped log.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Failures injected so far, across clones.
    pub fn injected_failures(&self) -> usize {
        self.injected.load(Ordering::Relaxed)
    }

    #[allow(clippy::expect_used)]
    fn should_fail(&self) -> bool {
        let fail = self.rng.lock().expect("Mutex poisoned").next() < self.failure_rate;
        if fail {
            self.injected.fetch_add(1, Ordering::Relaxed);
        }
        fail
    }
}

impl<S: GameLog> GameLog for ChaoticGameLog<S> {
    fn append(&self, record: &GameRecord) -> Result<(), StorageError> {
        if self.should_fail() {
            return Err(StorageError::Io("chaotic failure injection".to_string()));
        }
        self.inner.append(record)
    }

    fn load_all(&self) -> Result<Vec<GameRecord>, StorageError> {
        if self.should_fail() {
            return Err(StorageError::Io("chaotic failure injection".to_string()));
        }
        self.inner.load_all()
    }
}
