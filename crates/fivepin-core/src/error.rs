//! Error types for the scoring core.
//!
//! Session operations either succeed completely or fail without touching
//! state. Every rejection names the reason so the lane can report it to the
//! requester.

use thiserror::Error;

use crate::{game::LaneId, turn::TurnState};

/// Failure to parse a [`PinVector`](crate::PinVector) key.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePinsError {
    /// Key is not exactly five characters
    #[error("pin key must be 5 characters, got {0}")]
    Length(usize),

    /// Key contains something other than `0` or `1`
    #[error("invalid pin key character {0:?}")]
    Character(char),
}

/// Errors raised by [`GameSession`](crate::GameSession) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A session needs at least one bowler
    #[error("a game needs at least one bowler")]
    NoBowlers,

    /// `frames_per_turn` must be at least one
    #[error("frames per turn must be at least 1")]
    InvalidFramesPerTurn,

    /// Balls are not accepted while the game is on hold
    #[error("game is on hold")]
    OnHold,

    /// No bowler is up
    #[error("no bowler is up (turn state {state:?})")]
    NotBowling {
        /// Turn state when the ball arrived
        state: TurnState,
    },

    /// Bowler index out of range
    #[error("unknown bowler {0}")]
    UnknownBowler(usize),

    /// Frame index out of range or not yet reached
    #[error("frame {frame} is not available for bowler {bowler}")]
    InvalidFrame {
        /// Bowler index
        bowler: usize,
        /// Requested frame index
        frame: usize,
    },

    /// Score correction failed validation
    #[error("invalid correction: {0}")]
    Correction(#[from] CorrectionError),

    /// Team payload failed validation
    #[error("team rejected: {0}")]
    InvalidTeam(String),

    /// Team payload addressed to another lane
    #[error("team addressed to lane {to_lane}, this is lane {lane}")]
    WrongLane {
        /// Lane the payload was sent to
        to_lane: LaneId,
        /// This lane
        lane: LaneId,
    },
}

/// Reasons a score correction is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorrectionError {
    /// More balls than a frame can hold
    #[error("{0} balls given, a frame holds at most 3")]
    TooManyBalls(usize),

    /// A ball claims pins that were already down on the same rack
    #[error("ball {ball} knocks pins that are already down")]
    PinsAlreadyDown {
        /// Offending ball index
        ball: usize,
    },

    /// A ball follows a ball that already completed the frame
    #[error("ball {ball} follows a completed frame")]
    BallAfterCompletion {
        /// Offending ball index
        ball: usize,
    },

    /// Correction would complete an open frame or reopen a completed one
    #[error("correction changes frame completion (was {was_complete}, now {now_complete})")]
    CompletionChanged {
        /// Completion before the correction
        was_complete: bool,
        /// Completion after the correction
        now_complete: bool,
    },
}

impl SessionError {
    /// Returns true if retrying the same request later may succeed.
    ///
    /// Hold and turn-state rejections clear on their own. Validation failures
    /// never do.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::OnHold | Self::NotBowling { .. })
    }
}
