//! Pin sensor gateway.
//!
//! Raw hardware capability with no policy: analog reads from the five pin
//! sensors and the mechanism-ready sensor, digital writes to the five pin
//! actuators and the reset line. Callers decide what a failed read means.
//!
//! The trait is synchronous. GPIO and ADC access is a register poke or a
//! short bus transaction; all waiting happens in the tracker and controller
//! through [`Environment::sleep`](fivepin_core::Environment::sleep).

use fivepin_core::Pin;
use serde::{Deserialize, Serialize};

use crate::error::HardwareError;

/// Analog input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorId {
    /// Pin-down sensor for one position.
    Pin(Pin),
    /// Pinsetter cycle-complete signal.
    Ready,
}

/// Digital output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLine {
    /// Actuator for one pin position. Low knocks the pin down.
    Pin(Pin),
    /// Pinsetter reset line. A low pulse starts a cycle.
    Reset,
}

/// Digital output level. High is the safe resting level for every line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Active.
    Low,
    /// Resting.
    High,
}

/// Hardware access for one lane.
///
/// Must be Clone (the tracker and controller share it) and Send + Sync.
/// Implementations typically share device handles through `Arc`, so clones
/// drive the same hardware.
pub trait PinHardware: Clone + Send + Sync + 'static {
    /// Voltage currently seen on `sensor`.
    fn read_voltage(&self, sensor: SensorId) -> Result<f32, HardwareError>;

    /// Drives `line` to `level`.
    fn set_output(&self, line: OutputLine, level: Level) -> Result<(), HardwareError>;
}
