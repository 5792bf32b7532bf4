//! Pin sensing and pinsetter control for a 5-pin lane.
//!
//! Layers, leaf first:
//!
//! - [`PinHardware`]: raw sensor reads and actuator writes
//! - [`PinStateTracker`]: debounces sensors into a stable pin vector
//! - [`MachineController`]: reset pulses, ready wait, pin placement
//!
//! All waiting goes through [`Environment`](fivepin_core::Environment), so
//! the same code runs against the system clock or a simulated one.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod chaotic;
pub mod controller;
pub mod error;
pub mod hardware;
mod memory;
pub mod tracker;

pub use chaotic::ChaoticHardware;
pub use controller::{
    CycleReport, CycleState, MachineConfig, MachineController, MachineState, MachineSummary, Placement,
    ReadyOutcome,
};
pub use error::HardwareError;
pub use hardware::{Level, OutputLine, PinHardware, SensorId};
pub use memory::{ACTIVE_VOLTS, IDLE_VOLTS, MemoryHardware};
pub use tracker::{PinCheck, PinStateTracker, PinStatus, TrackerConfig};
