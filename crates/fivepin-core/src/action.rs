//! Actions returned by the session.
//!
//! The session never touches hardware or observers. It returns what happened
//! and what the pinsetter should do, and the lane driver carries it out.

use serde::{Deserialize, Serialize};

use crate::{ball::Ball, pins::PinVector, record::TeamTransfer};

/// What the pinsetter should do after a ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ResetDecision {
    /// Set a full rack.
    Full,
    /// Cycle and keep the knocked pins down.
    KeepDown {
        /// Pins to leave down.
        down: PinVector,
        /// Next ball is the frame's last possible ball.
        final_ball_next: bool,
    },
}

/// Output of a session operation, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// A ball was added to a frame.
    BallRecorded {
        /// Bowler index.
        bowler: usize,
        /// Frame index.
        frame: usize,
        /// The ball.
        ball: Ball,
    },

    /// A frame accepts no more balls.
    FrameCompleted {
        /// Bowler index.
        bowler: usize,
        /// Frame index.
        frame: usize,
        /// Frame score so far (bonus may still be pending).
        score: u16,
        /// Running total through this frame.
        cumulative_total: u32,
    },

    /// Pinsetter instruction.
    Reset(ResetDecision),

    /// A different bowler is up.
    BowlerUp {
        /// Bowler index.
        bowler: usize,
        /// Bowler name.
        name: String,
    },

    /// The team must be sent to the paired lane.
    ExportTeam(TeamTransfer),

    /// A team from the paired lane took over this lane.
    TeamImported {
        /// Lane the team came from.
        from_lane: crate::game::LaneId,
    },

    /// A frame was rewritten by a correction.
    CorrectionApplied {
        /// Bowler index.
        bowler: usize,
        /// Frame index.
        frame: usize,
        /// Bowler total after recalculation.
        total_score: u32,
    },

    /// Every bowler finished the game.
    GameFinished {
        /// Game number within the session, from 1.
        game_number: u32,
    },

    /// A new game began.
    GameStarted {
        /// Game number within the session, from 1.
        game_number: u32,
    },
}
