//! Scoring core for Canadian 5-pin lanes.
//!
//! Pure logic with no I/O: pin vectors, ball evaluation, frame scoring, turn
//! rotation and the per-lane [`GameSession`]. Hardware timing lives in
//! `fivepin-machine`; this crate only decides *what* the pinsetter should do
//! and returns it as [`SessionAction`]s.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod action;
pub mod ball;
pub mod bowler;
pub mod env;
pub mod error;
pub mod frame;
pub mod game;
pub mod pins;
pub mod record;
pub mod scoring;
pub mod session;
pub mod snapshot;
pub mod turn;

pub use action::{ResetDecision, SessionAction};
pub use ball::{Ball, SymbolTable, evaluate};
pub use bowler::Bowler;
pub use env::Environment;
pub use error::{CorrectionError, ParsePinsError, SessionError};
pub use frame::{BonusRef, FRAMES_PER_GAME, Frame, FrameState};
pub use game::{BowlerEntry, GameKind, GameLimit, GameSettings, GameSetup, LaneId};
pub use pins::{Pin, PinVector};
pub use record::{GameRecord, TeamTransfer};
pub use session::GameSession;
pub use snapshot::{BowlerSnapshot, FrameSnapshot, SessionSnapshot};
pub use turn::TurnState;
