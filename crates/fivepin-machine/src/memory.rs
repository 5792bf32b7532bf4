#![allow(clippy::disallowed_types, reason = "Synchronous in-memory hardware state only")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use fivepin_core::{Pin, PinVector};

use crate::{
    error::HardwareError,
    hardware::{Level, OutputLine, PinHardware, SensorId},
};

/// Voltage a sensor reports for a fallen pin or an asserted ready signal.
pub const ACTIVE_VOLTS: f32 = 4.8;

/// Voltage a sensor reports for a standing pin or an idle ready signal.
pub const IDLE_VOLTS: f32 = 0.2;

/// Simulated lane hardware for tests and the bundled binary.
///
/// Models just enough pinsetter mechanics to drive the controller end to
/// end:
///
/// - a completed reset pulse (low then high) stands every pin and drops the
///   ready signal for a configurable number of reads
/// - driving a pin actuator low knocks that pin down
/// - pin sensors report [`ACTIVE_VOLTS`] for fallen pins
///
/// Tests can knock pins down directly, force voltages and inject a fixed
/// number of failures per sensor or line. State sits behind `Arc<Mutex<_>>`,
/// so clones share one simulated lane.
#[derive(Clone)]
pub struct MemoryHardware {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    down: PinVector,
    levels: HashMap<OutputLine, Level>,
    output_log: Vec<(OutputLine, Level)>,
    ready_after_reads: u32,
    ready_countdown: Option<u32>,
    ready_stuck: bool,
    forced: HashMap<SensorId, f32>,
    sensor_failures: HashMap<SensorId, u32>,
    output_failures: HashMap<OutputLine, u32>,
    reads: u64,
    reset_pulses: u32,
}

impl MemoryHardware {
    /// Lane with every pin standing and the ready signal asserted.
    pub fn new() -> Self {
        let mut levels = HashMap::new();
        levels.insert(OutputLine::Reset, Level::High);
        for pin in Pin::ALL {
            levels.insert(OutputLine::Pin(pin), Level::High);
        }

        Self {
            inner: Arc::new(Mutex::new(Inner {
                down: PinVector::EMPTY,
                levels,
                output_log: Vec::new(),
                ready_after_reads: 3,
                ready_countdown: None,
                ready_stuck: false,
                forced: HashMap::new(),
                sensor_failures: HashMap::new(),
                output_failures: HashMap::new(),
                reads: 0,
                reset_pulses: 0,
            })),
        }
    }

    #[allow(clippy::expect_used)]
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("MemoryHardware mutex poisoned")
    }

    /// Knocks `pins` down, as a ball would.
    pub fn knock_down(&self, pins: PinVector) {
        let mut inner = self.lock();
        inner.down = inner.down.union(pins);
    }

    /// Pins physically down.
    pub fn pins_down(&self) -> PinVector {
        self.lock().down
    }

    /// Ready reads that stay low after each reset pulse.
    pub fn set_ready_after_reads(&self, reads: u32) {
        self.lock().ready_after_reads = reads;
    }

    /// Keeps the ready signal low regardless of resets.
    pub fn set_ready_stuck(&self, stuck: bool) {
        self.lock().ready_stuck = stuck;
    }

    /// Forces `sensor` to report `volts`, or clears the override.
    pub fn force_voltage(&self, sensor: SensorId, volts: Option<f32>) {
        let mut inner = self.lock();
        match volts {
            Some(v) => inner.forced.insert(sensor, v),
            None => inner.forced.remove(&sensor),
        };
    }

    /// Fails the next `count` reads of `sensor`.
    pub fn fail_reads(&self, sensor: SensorId, count: u32) {
        self.lock().sensor_failures.insert(sensor, count);
    }

    /// Fails the next `count` writes to `line`.
    pub fn fail_writes(&self, line: OutputLine, count: u32) {
        self.lock().output_failures.insert(line, count);
    }

    /// Current level of `line`.
    pub fn level(&self, line: OutputLine) -> Level {
        self.lock().levels.get(&line).copied().unwrap_or(Level::High)
    }

    /// Whether every line rests high.
    pub fn all_lines_high(&self) -> bool {
        self.lock().levels.values().all(|l| *l == Level::High)
    }

    /// Every successful write, in order.
    pub fn output_log(&self) -> Vec<(OutputLine, Level)> {
        self.lock().output_log.clone()
    }

    /// Completed reset pulses.
    pub fn reset_pulses(&self) -> u32 {
        self.lock().reset_pulses
    }

    /// Total sensor reads attempted.
    pub fn reads(&self) -> u64 {
        self.lock().reads
    }
}

impl Default for MemoryHardware {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumes one injected failure, returning whether this call fails.
fn take_failure<K: Eq + std::hash::Hash>(failures: &mut HashMap<K, u32>, key: &K) -> bool {
    match failures.get_mut(key) {
        Some(remaining) if *remaining > 0 => {
            *remaining -= 1;
            true
        },
        _ => false,
    }
}

impl PinHardware for MemoryHardware {
    fn read_voltage(&self, sensor: SensorId) -> Result<f32, HardwareError> {
        let mut inner = self.lock();
        inner.reads += 1;

        if take_failure(&mut inner.sensor_failures, &sensor) {
            return Err(HardwareError::SensorRead { sensor, reason: "injected failure".to_string() });
        }
        if let Some(volts) = inner.forced.get(&sensor) {
            return Ok(*volts);
        }

        let active = match sensor {
            SensorId::Pin(pin) => inner.down.is_down(pin),
            SensorId::Ready if inner.ready_stuck => false,
            SensorId::Ready => match inner.ready_countdown {
                Some(0) | None => true,
                Some(n) => {
                    inner.ready_countdown = Some(n - 1);
                    false
                },
            },
        };
        Ok(if active { ACTIVE_VOLTS } else { IDLE_VOLTS })
    }

    fn set_output(&self, line: OutputLine, level: Level) -> Result<(), HardwareError> {
        let mut inner = self.lock();

        if take_failure(&mut inner.output_failures, &line) {
            return Err(HardwareError::OutputWrite { line, reason: "injected failure".to_string() });
        }

        let previous = inner.levels.insert(line, level).unwrap_or(Level::High);
        inner.output_log.push((line, level));

        match (line, previous, level) {
            (OutputLine::Reset, Level::Low, Level::High) => {
                inner.down = PinVector::EMPTY;
                inner.ready_countdown = Some(inner.ready_after_reads);
                inner.reset_pulses += 1;
            },
            (OutputLine::Pin(pin), _, Level::Low) => inner.down = inner.down.with(pin),
            _ => {},
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallen_pins_read_active() {
        let hw = MemoryHardware::new();
        hw.knock_down(PinVector::from(Pin::Center));

        assert_eq!(hw.read_voltage(SensorId::Pin(Pin::Center)).unwrap(), ACTIVE_VOLTS);
        assert_eq!(hw.read_voltage(SensorId::Pin(Pin::LeftTwo)).unwrap(), IDLE_VOLTS);
    }

    #[test]
    fn reset_pulse_stands_pins_and_drops_ready() {
        let hw = MemoryHardware::new();
        hw.set_ready_after_reads(2);
        hw.knock_down(PinVector::ALL);

        hw.set_output(OutputLine::Reset, Level::Low).unwrap();
        hw.set_output(OutputLine::Reset, Level::High).unwrap();

        assert_eq!(hw.pins_down(), PinVector::EMPTY);
        assert_eq!(hw.reset_pulses(), 1);
        assert_eq!(hw.read_voltage(SensorId::Ready).unwrap(), IDLE_VOLTS);
        assert_eq!(hw.read_voltage(SensorId::Ready).unwrap(), IDLE_VOLTS);
        assert_eq!(hw.read_voltage(SensorId::Ready).unwrap(), ACTIVE_VOLTS);
    }

    #[test]
    fn actuator_low_knocks_pin_down() {
        let hw = MemoryHardware::new();
        hw.set_output(OutputLine::Pin(Pin::RightThree), Level::Low).unwrap();
        assert!(hw.pins_down().is_down(Pin::RightThree));
        assert!(!hw.all_lines_high());
        hw.set_output(OutputLine::Pin(Pin::RightThree), Level::High).unwrap();
        assert!(hw.all_lines_high());
    }

    #[test]
    fn injected_failures_are_consumed() {
        let hw = MemoryHardware::new();
        hw.fail_reads(SensorId::Ready, 1);
        hw.fail_writes(OutputLine::Reset, 1);

        assert!(hw.read_voltage(SensorId::Ready).is_err());
        assert!(hw.read_voltage(SensorId::Ready).is_ok());
        assert!(hw.set_output(OutputLine::Reset, Level::Low).is_err());
        assert!(hw.set_output(OutputLine::Reset, Level::Low).is_ok());
    }
}
