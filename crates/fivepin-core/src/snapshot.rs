//! Read-only views for display.
//!
//! Observers get owned snapshots instead of references into the session, so
//! a display can render at its own pace without holding any lock.

use serde::{Deserialize, Serialize};

use crate::{
    bowler::Bowler,
    frame::{FrameState, MAX_BALLS},
    game::LaneId,
    turn::TurnState,
};

/// Whole-session view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Lane id.
    pub lane_id: LaneId,
    /// Variant label.
    pub kind: String,
    /// Game number within the session, from 1.
    pub game_number: u32,
    /// Paired lane, if any.
    pub paired_lane: Option<LaneId>,
    /// Index of the bowler who is up.
    pub current_bowler: usize,
    /// Rotation state.
    pub turn_state: TurnState,
    /// Hold flag.
    pub hold_active: bool,
    /// Bowlers in rotation order.
    pub bowlers: Vec<BowlerSnapshot>,
}

impl SessionSnapshot {
    /// Bowler who is up, if the lane is bowling.
    pub fn bowler_up(&self) -> Option<&BowlerSnapshot> {
        match self.turn_state {
            TurnState::Bowling => self.bowlers.get(self.current_bowler),
            TurnState::WaitingForTeam | TurnState::Finished => None,
        }
    }
}

/// One bowler's scoreboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BowlerSnapshot {
    /// Display name.
    pub name: String,
    /// Frame being bowled (10 when done).
    pub current_frame: usize,
    /// Running total.
    pub total_score: u32,
    /// Handicap.
    pub handicap: u32,
    /// Finished all ten frames.
    pub completed: bool,
    /// Ten frame cells.
    pub frames: Vec<FrameSnapshot>,
}

/// One scoreboard cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Symbols per ball, at most three.
    pub symbols: Vec<String>,
    /// Frame state.
    pub state: FrameState,
    /// Running total once the frame is settled.
    pub cumulative_total: Option<u32>,
    /// Strike frame.
    pub is_strike: bool,
    /// Spare frame.
    pub is_spare: bool,
}

impl From<&Bowler> for BowlerSnapshot {
    fn from(bowler: &Bowler) -> Self {
        let frames = bowler
            .frames
            .iter()
            .enumerate()
            .map(|(index, frame)| FrameSnapshot {
                symbols: frame.balls.iter().take(MAX_BALLS).map(|b| b.symbol.clone()).collect(),
                state: frame.state(index),
                cumulative_total: frame.is_settled(index).then_some(frame.cumulative_total),
                is_strike: frame.is_strike,
                is_spare: frame.is_spare,
            })
            .collect();

        Self {
            name: bowler.name.clone(),
            current_frame: bowler.current_frame,
            total_score: bowler.total_score,
            handicap: bowler.handicap,
            completed: bowler.completed,
            frames,
        }
    }
}
