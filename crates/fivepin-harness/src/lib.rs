//! Deterministic simulation harness for 5-pin lanes.
//!
//! A virtual-clock [`SimEnv`] makes pin checks and ready waits instant and
//! reproducible. Paired with `MemoryHardware` from `fivepin-machine` it runs
//! the full machine cycle without a pinsetter; [`SimLane`] wires both to a
//! session so whole games can be bowled ball by ball.
//!
//! # Model-Based Testing
//!
//! The `model` module defines the operations a lane applies to a session.
//! Property tests and fuzzers generate sequences of them and check the
//! session against the invariants after every step.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks WHAT must be true of any game state, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for every
//! scoring and actuator invariant.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod model;
pub mod sim_env;
pub mod sim_lane;
pub mod throws;

pub use invariants::{
    BallsPerFrame, CumulativeMonotonic, CurrentBowlerValid, Invariant, InvariantRegistry, InvariantResult,
    LaneSnapshot, RecalculationStable, SafeActuatorLevels, ScoreHistory, SpareBonus, StrikeFrames, SystemSnapshot,
    TenthFrameNoBonus, TotalsMonotonic, Violation,
};
pub use model::{Operation, OperationOutcome, apply, rack_down};
pub use sim_env::{SIM_EPOCH_SECS, SimEnv, SimInstant};
pub use sim_lane::{BowlError, SimLane, SimLaneBuilder};
pub use throws::ThrowGenerator;
