//! Bowlers.

use serde::{Deserialize, Serialize};

use crate::frame::{FRAMES_PER_GAME, Frame};

/// A bowler and their ten frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bowler {
    /// Display name.
    pub name: String,
    /// Exactly [`FRAMES_PER_GAME`] frames.
    pub frames: Vec<Frame>,
    /// Frame being bowled; [`FRAMES_PER_GAME`] once the game is done.
    pub current_frame: usize,
    /// Running total through the last frame with balls.
    pub total_score: u32,
    /// Handicap added to the final score.
    #[serde(default)]
    pub handicap: u32,
    /// All ten frames are complete.
    #[serde(default)]
    pub completed: bool,
}

impl Bowler {
    /// New bowler with empty frames.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: vec![Frame::default(); FRAMES_PER_GAME],
            current_frame: 0,
            total_score: 0,
            handicap: 0,
            completed: false,
        }
    }

    /// Sets the handicap.
    #[must_use]
    pub fn with_handicap(mut self, handicap: u32) -> Self {
        self.handicap = handicap;
        self
    }

    /// Whether all ten frames are done.
    pub fn is_finished(&self) -> bool {
        self.current_frame >= FRAMES_PER_GAME
    }

    /// Frame currently being bowled, if any.
    pub fn current(&self) -> Option<&Frame> {
        self.frames.get(self.current_frame)
    }

    /// Score including handicap.
    pub fn total_with_handicap(&self) -> u32 {
        self.total_score + self.handicap
    }

    /// Clears all frames for a new game, keeping name and handicap.
    pub fn reset_frames(&mut self) {
        self.frames = vec![Frame::default(); FRAMES_PER_GAME];
        self.current_frame = 0;
        self.total_score = 0;
        self.completed = false;
    }
}
