//! Persisted and transferred game data.

use serde::{Deserialize, Serialize};

use crate::{
    ball::Ball,
    bowler::Bowler,
    frame::{BonusRef, Frame},
    game::LaneId,
};

/// Whole-team state handed between paired lanes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTransfer {
    /// Sending lane.
    pub from_lane: LaneId,
    /// Receiving lane.
    pub to_lane: LaneId,
    /// Game number within the series.
    pub game_number: u32,
    /// Bowlers with every frame bowled so far.
    pub bowlers: Vec<Bowler>,
}

/// One completed game, as written to the game log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Lane the game finished on.
    pub lane_id: LaneId,
    /// Game number within the session.
    pub game_number: u32,
    /// Variant label.
    pub kind: String,
    /// Unix seconds when the game finished.
    pub finished_at_secs: u64,
    /// Final bowler state.
    pub bowlers: Vec<BowlerRecord>,
}

/// A bowler's finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BowlerRecord {
    /// Display name.
    pub name: String,
    /// Handicap.
    pub handicap: u32,
    /// Score without handicap.
    pub final_score: u32,
    /// Score with handicap added.
    pub handicap_score: u32,
    /// Frames in order.
    pub frames: Vec<FrameRecord>,
}

/// A frame as recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Balls with pins, value and symbol.
    pub balls: Vec<Ball>,
    /// Balls borrowed as bonus.
    pub bonus_balls: Vec<BonusRef>,
    /// Frame score with bonus.
    pub total: u16,
    /// Running total.
    pub cumulative: u32,
    /// Strike frame.
    pub is_strike: bool,
    /// Spare frame.
    pub is_spare: bool,
}

impl From<&Frame> for FrameRecord {
    fn from(frame: &Frame) -> Self {
        Self {
            balls: frame.balls.clone(),
            bonus_balls: frame.bonus_balls.clone(),
            total: frame.score,
            cumulative: frame.cumulative_total,
            is_strike: frame.is_strike,
            is_spare: frame.is_spare,
        }
    }
}

impl From<&Bowler> for BowlerRecord {
    fn from(bowler: &Bowler) -> Self {
        Self {
            name: bowler.name.clone(),
            handicap: bowler.handicap,
            final_score: bowler.total_score,
            handicap_score: bowler.total_with_handicap(),
            frames: bowler.frames.iter().map(FrameRecord::from).collect(),
        }
    }
}
