//! Observable state snapshots for invariant checking.
//!
//! Invariants run on copies of lane state rather than live sessions, so a
//! check sees one consistent moment.

use fivepin_core::{Bowler, GameSession, LaneId};
use fivepin_machine::MachineSummary;

/// Snapshot of every simulated lane.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-lane snapshots.
    pub lanes: Vec<LaneSnapshot>,
}

impl SystemSnapshot {
    /// No lanes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// One lane.
    pub fn single(lane: LaneSnapshot) -> Self {
        Self { lanes: vec![lane] }
    }

    /// Several lanes.
    pub fn from_lanes(lanes: Vec<LaneSnapshot>) -> Self {
        Self { lanes }
    }
}

/// Observable state of one lane.
#[derive(Debug, Clone, Default)]
pub struct LaneSnapshot {
    /// Lane identifier.
    pub lane_id: LaneId,
    /// Game number of the session.
    pub game_number: u32,
    /// Bowler who is up.
    pub current_bowler: usize,
    /// Bowlers with derived scoring fields as the session holds them.
    pub bowlers: Vec<Bowler>,
    /// Totals observed per bowler over the current game.
    pub total_history: Vec<Vec<u32>>,
    /// Pinsetter status, when a controller is attached.
    pub machine: Option<MachineSummary>,
    /// Whether every actuator line rests high, when hardware is simulated.
    pub lines_high: Option<bool>,
}

impl LaneSnapshot {
    /// Captures a session.
    pub fn from_session(session: &GameSession) -> Self {
        Self {
            lane_id: session.lane_id(),
            game_number: session.game_number(),
            current_bowler: session.current_bowler(),
            bowlers: session.bowlers().to_vec(),
            ..Self::default()
        }
    }

    /// Attach observed totals.
    pub fn with_history(mut self, history: &ScoreHistory) -> Self {
        self.total_history = history.totals.clone();
        self
    }

    /// Attach pinsetter status.
    pub fn with_machine(mut self, machine: MachineSummary) -> Self {
        self.machine = Some(machine);
        self
    }

    /// Attach actuator line state.
    pub fn with_lines_high(mut self, high: bool) -> Self {
        self.lines_high = Some(high);
        self
    }
}

/// Records bowler totals across observations of one session.
///
/// History restarts when the game number changes. Corrections may lower a
/// total; call [`ScoreHistory::clear`] after applying one.
#[derive(Debug, Clone, Default)]
pub struct ScoreHistory {
    game_number: u32,
    totals: Vec<Vec<u32>>,
}

impl ScoreHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends each bowler's current total.
    pub fn observe(&mut self, session: &GameSession) {
        if session.game_number() != self.game_number || self.totals.len() != session.bowlers().len() {
            self.game_number = session.game_number();
            self.totals = vec![Vec::new(); session.bowlers().len()];
        }
        for (history, bowler) in self.totals.iter_mut().zip(session.bowlers()) {
            history.push(bowler.total_score);
        }
    }

    /// Forgets all observations.
    pub fn clear(&mut self) {
        self.totals.clear();
    }

    /// Totals per bowler.
    pub fn totals(&self) -> &[Vec<u32>] {
        &self.totals
    }
}
