//! Frames and frame completion rules.
//!
//! ```text
//!   Empty ──ball──> InProgress ──completing ball──> Complete
//! ```
//!
//! Frames 0-8 complete on a strike, on a spare, or after the third ball.
//! The 10th frame (index 9) never completes early on a strike or spare; it
//! completes after two open balls or after three balls.

use serde::{Deserialize, Serialize};

use crate::{
    ball::{Ball, Rack},
    pins::RACK_VALUE,
};

/// Frames per game.
pub const FRAMES_PER_GAME: usize = 10;

/// Index of the 10th frame.
pub const LAST_FRAME: usize = FRAMES_PER_GAME - 1;

/// Balls a frame can hold.
pub const MAX_BALLS: usize = 3;

/// Location of a ball borrowed as a bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusRef {
    /// Bowler index the ball belongs to.
    pub bowler: usize,
    /// Frame index of the ball.
    pub frame: usize,
    /// Ball index within that frame.
    pub ball: usize,
}

/// Lifecycle of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameState {
    /// No ball thrown.
    Empty,
    /// At least one ball thrown, more expected.
    InProgress,
    /// No further balls accepted.
    Complete,
}

/// One frame of a bowler's game.
///
/// `score`, `cumulative_total`, flags and bonus fields are derived and
/// overwritten by [`recalculate`](crate::scoring::recalculate); only `balls`
/// is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Frame {
    /// Balls thrown, at most [`MAX_BALLS`].
    pub balls: Vec<Ball>,
    /// Pin total plus bonus.
    pub score: u16,
    /// Running total through this frame.
    pub cumulative_total: u32,
    /// First ball was a full rack.
    pub is_strike: bool,
    /// First two balls cleared the rack without a strike.
    pub is_spare: bool,
    /// Balls whose values were added as bonus.
    pub bonus_balls: Vec<BonusRef>,
    /// Bonus balls owed but not thrown yet.
    pub pending_bonus: u8,
}

impl Frame {
    /// Sum of the frame's own ball values.
    pub fn pin_total(&self) -> u16 {
        self.balls.iter().map(|b| u16::from(b.value)).sum()
    }

    /// Completion state for a frame at `index`.
    pub fn state(&self, index: usize) -> FrameState {
        if self.balls.is_empty() {
            FrameState::Empty
        } else if is_complete(index, &self.balls) {
            FrameState::Complete
        } else {
            FrameState::InProgress
        }
    }

    /// Whether the frame at `index` accepts no more balls.
    pub fn is_complete(&self, index: usize) -> bool {
        is_complete(index, &self.balls)
    }

    /// Pins down on the rack currently standing in this frame.
    pub fn rack(&self) -> Rack {
        Rack::after(&self.balls)
    }

    /// Whether the score is final (complete and owed no bonus).
    pub fn is_settled(&self, index: usize) -> bool {
        self.is_complete(index) && self.pending_bonus == 0
    }

    /// Resets and reassigns strike and spare flags from the balls.
    pub(crate) fn classify(&mut self) {
        let (first, second) = first_two(&self.balls);
        self.is_strike = first == Some(RACK_VALUE);
        self.is_spare = !self.is_strike
            && matches!((first, second), (Some(a), Some(b)) if u16::from(a) + u16::from(b) == u16::from(RACK_VALUE));
    }

    /// Bonus balls owed by the frame at `index`.
    pub(crate) fn bonus_needed(&self, index: usize) -> usize {
        if index >= LAST_FRAME {
            0
        } else if self.is_strike {
            2
        } else if self.is_spare {
            1
        } else {
            0
        }
    }
}

/// Whether `balls` complete the frame at `index`.
pub fn is_complete(index: usize, balls: &[Ball]) -> bool {
    let (first, second) = first_two(balls);
    let open_pair = matches!(
        (first, second),
        (Some(a), Some(b)) if a < RACK_VALUE && u16::from(a) + u16::from(b) < u16::from(RACK_VALUE)
    );

    if index >= LAST_FRAME {
        return balls.len() >= MAX_BALLS || (balls.len() == 2 && open_pair);
    }

    match balls.len() {
        0 => false,
        1 => first == Some(RACK_VALUE),
        2 => !open_pair,
        _ => true,
    }
}

/// Whether the next ball in the frame at `index` is its last possible ball.
pub fn final_ball_next(index: usize, balls: &[Ball]) -> bool {
    balls.len() == MAX_BALLS - 1 && !is_complete(index, balls)
}

fn first_two(balls: &[Ball]) -> (Option<u8>, Option<u8>) {
    (balls.first().map(|b| b.value), balls.get(1).map(|b| b.value))
}
