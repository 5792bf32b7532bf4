//! Turn rotation.
//!
//! A bowler keeps the lane for `frames_per_turn` consecutive frames, then
//! the next unfinished bowler is up. On a paired lane the whole team leaves
//! once every bowler has bowled their block, and the lane waits for the
//! other team to arrive.
//!
//! ```text
//!                 frame done, block not done
//!               ┌───────────┐
//!               ▼           │
//!   start ──> Bowling ──────┴── block done ──> next bowler ──┐
//!               ▲   │                                        │
//!               │   ├── team block done (paired) ──> WaitingForTeam
//!               │   │                                        │
//!               │   └── nobody left ──> Finished      team imported
//!               └────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::{bowler::Bowler, frame::FRAMES_PER_GAME};

/// Where the lane is in the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    /// A bowler is up.
    Bowling,
    /// The team was handed to the paired lane.
    WaitingForTeam,
    /// Every bowler finished the game.
    Finished,
}

/// Outcome of a completed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnChange {
    /// Same bowler bowls the next frame.
    Continue,
    /// Another bowler is up.
    NextBowler(usize),
    /// The team must be exported to the paired lane.
    ExportTeam,
    /// Nobody has frames left.
    GameFinished,
}

/// Rotation state for one lane.
#[derive(Debug, Clone)]
pub struct TurnManager {
    frames_per_turn: usize,
    paired: bool,
    current: usize,
    turn_target: usize,
    state: TurnState,
}

impl TurnManager {
    /// New manager; call [`start`](Self::start) before bowling.
    pub fn new(frames_per_turn: usize, paired: bool) -> Self {
        Self {
            frames_per_turn: frames_per_turn.max(1),
            paired,
            current: 0,
            turn_target: frames_per_turn.clamp(1, FRAMES_PER_GAME),
            state: TurnState::Bowling,
        }
    }

    /// Index of the bowler who is up.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Rotation state.
    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Consecutive frames per turn.
    pub fn frames_per_turn(&self) -> usize {
        self.frames_per_turn
    }

    /// Frame count every bowler must reach before a paired hand-off.
    pub fn turn_target(&self) -> usize {
        self.turn_target
    }

    /// Selects the first unfinished bowler and sets the next turn target.
    ///
    /// Used at game start and when a team arrives from the paired lane.
    pub fn start(&mut self, bowlers: &[Bowler]) -> TurnChange {
        let lowest = bowlers.iter().filter(|b| !b.is_finished()).map(|b| b.current_frame).min();
        match (lowest, bowlers.iter().position(|b| !b.is_finished())) {
            (Some(lowest), Some(first)) => {
                self.turn_target = (lowest + self.frames_per_turn).min(FRAMES_PER_GAME);
                self.current = first;
                self.state = TurnState::Bowling;
                TurnChange::NextBowler(first)
            },
            _ => {
                self.state = TurnState::Finished;
                TurnChange::GameFinished
            },
        }
    }

    /// Advances the current bowler past a completed frame and rotates.
    pub fn frame_completed(&mut self, bowlers: &mut [Bowler]) -> TurnChange {
        let Some(bowler) = bowlers.get_mut(self.current) else {
            self.state = TurnState::Finished;
            return TurnChange::GameFinished;
        };

        bowler.current_frame = (bowler.current_frame + 1).min(FRAMES_PER_GAME);
        bowler.completed = bowler.is_finished();
        let done = bowler.current_frame;
        let finished = bowler.completed;

        if !finished && done % self.frames_per_turn != 0 {
            return TurnChange::Continue;
        }

        if bowlers.iter().all(Bowler::is_finished) {
            self.state = TurnState::Finished;
            return TurnChange::GameFinished;
        }

        if self.paired && bowlers.iter().all(|b| b.current_frame >= self.turn_target) {
            self.state = TurnState::WaitingForTeam;
            return TurnChange::ExportTeam;
        }

        match next_unfinished(bowlers, self.current) {
            Some(next) if next == self.current => TurnChange::Continue,
            Some(next) => {
                self.current = next;
                TurnChange::NextBowler(next)
            },
            None => {
                self.state = TurnState::Finished;
                TurnChange::GameFinished
            },
        }
    }
}

/// Next bowler after `from` with frames left, wrapping around.
fn next_unfinished(bowlers: &[Bowler], from: usize) -> Option<usize> {
    (1..=bowlers.len()).map(|step| (from + step) % bowlers.len()).find(|&i| !bowlers[i].is_finished())
}
