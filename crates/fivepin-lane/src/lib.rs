//! Lane service for 5-pin bowling.
//!
//! Wraps [`fivepin_core`]'s session logic and [`fivepin_machine`]'s pinsetter
//! controller with a game log, an async task and a message bridge.
//!
//! # Architecture
//!
//! The session returns actions and never performs I/O. [`Lane`] owns the
//! session, the controller and the log, and carries the actions out one
//! request at a time. [`runtime::spawn`] moves a lane into a tokio task and
//! hands back a [`LaneHandle`] for requests and event subscriptions.
//!
//! # Components
//!
//! - [`Lane`]: request handling and action execution
//! - [`LaneHandle`]: async access to a spawned lane
//! - [`LaneBridge`]: wire messages to requests and events to wire messages
//! - [`GameLog`]: finished-game storage ([`FileGameLog`], [`MemoryGameLog`])
//! - [`SystemEnv`]: production clock

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod bridge;
pub mod config;
mod error;
pub mod event;
mod lane;
pub mod runtime;
pub mod storage;
mod system_env;

pub use bridge::{Inbound, LaneBridge};
pub use config::{ConfigError, LaneConfig};
pub use error::LaneError;
pub use event::{LaneEvent, LaneRequest};
pub use lane::Lane;
pub use runtime::{LaneHandle, RuntimeConfig, spawn};
pub use storage::{ChaoticGameLog, FileGameLog, GameLog, MemoryGameLog, StorageError};
pub use system_env::SystemEnv;
