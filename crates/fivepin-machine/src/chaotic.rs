//! Chaotic hardware wrapper for fault injection testing
//!
//! Delegates to another [`PinHardware`] but fails reads and writes at a
//! configured rate. Used to check that the tracker and controller degrade
//! instead of aborting when sensors and actuators glitch.

#![allow(clippy::disallowed_types, reason = "Locking simple RNG state")]

use std::sync::{Arc, Mutex};

use crate::{
    error::HardwareError,
    hardware::{Level, OutputLine, PinHardware, SensorId},
};

/// Hardware wrapper that randomly injects failures.
#[derive(Clone)]
pub struct ChaoticHardware<H: PinHardware> {
    inner: H,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    rng: Arc<Mutex<ChaoticRng>>,
    injected: Arc<Mutex<usize>>,
}

/// Linear congruential generator so chaos runs repeat with the same seed.
struct ChaoticRng {
    state: u64,
}

impl ChaoticRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

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

impl<H: PinHardware> ChaoticHardware<H> {
    /// Wraps `inner` with a fixed seed.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn new(inner: H, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x5F1A_7E00_0000_0005)
    }

    /// Wraps `inner` with an explicit seed for reproducible chaos.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    #[allow(clippy::panic)]
    pub fn with_seed(inner: H, failure_rate: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );

        Self {
            inner,
            failure_rate,
            rng: Arc::new(Mutex::new(ChaoticRng::new(seed))),
            injected: Arc::new(Mutex::new(0)),
        }
    }

    /// Wrapped hardware.
    pub fn inner(&self) -> &H {
        &self.inner
    }

    /// Failures injected so far.
    pub fn injected_failures(&self) -> usize {
        #[allow(clippy::expect_used)]
        *self.injected.lock().expect("injected counter mutex poisoned")
    }

    fn should_fail(&self) -> bool {
        #[allow(clippy::expect_used)]
        let fail = self.rng.lock().expect("ChaoticRng mutex poisoned").next() < self.failure_rate;
        if fail {
            #[allow(clippy::expect_used)]
            let mut count = self.injected.lock().expect("injected counter mutex poisoned");
            *count += 1;
        }
        fail
    }
}

impl<H: PinHardware> PinHardware for ChaoticHardware<H> {
    fn read_voltage(&self, sensor: SensorId) -> Result<f32, HardwareError> {
        if self.should_fail() {
            return Err(HardwareError::SensorRead { sensor, reason: "chaotic failure injection".to_string() });
        }
        self.inner.read_voltage(sensor)
    }

    fn set_output(&self, line: OutputLine, level: Level) -> Result<(), HardwareError> {
        if self.should_fail() {
            return Err(HardwareError::OutputWrite { line, reason: "chaotic failure injection".to_string() });
        }
        self.inner.set_output(line, level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHardware;

    #[test]
    fn zero_rate_never_fails() {
        let hw = ChaoticHardware::new(MemoryHardware::new(), 0.0);
        for _ in 0..100 {
            assert!(hw.read_voltage(SensorId::Ready).is_ok());
        }
        assert_eq!(hw.injected_failures(), 0);
    }

    #[test]
    fn full_rate_always_fails() {
        let hw = ChaoticHardware::new(MemoryHardware::new(), 1.0);
        assert!(hw.set_output(OutputLine::Reset, Level::Low).is_err());
        assert_eq!(hw.inner().level(OutputLine::Reset), Level::High);
        assert_eq!(hw.injected_failures(), 1);
    }

    #[test]
    fn same_seed_same_failures() {
        let pattern = |seed| {
            let hw = ChaoticHardware::with_seed(MemoryHardware::new(), 0.5, seed);
            (0..64).map(|_| hw.read_voltage(SensorId::Ready).is_err()).collect::<Vec<_>>()
        };
        assert_eq!(pattern(7), pattern(7));
        assert!(pattern(7).iter().any(|failed| *failed));
    }
}
