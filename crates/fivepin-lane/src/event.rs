//! Lane requests and events.
//!
//! Requests come in from a UI or a network bridge; events go out to every
//! subscriber. Events are JSON objects tagged by `event`.

use fivepin_core::{Ball, GameRecord, GameSetup, LaneId, PinVector, TeamTransfer};
use fivepin_machine::{PinStatus, Placement, ReadyOutcome};
use serde::{Deserialize, Serialize};

/// Requests a lane accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaneRequest {
    /// Start a session, replacing any current one.
    StartGame(GameSetup),
    /// A ball was thrown; read the sensors.
    BallDetected,
    /// A ball was thrown; the reading comes from an external detector.
    SubmitBall(PinVector),
    /// Full reset now or at the next cycle.
    ManualReset {
        /// Reset now instead of at the next cycle.
        immediate: bool,
    },
    /// Cycle the pinsetter to this layout.
    PinRestore(PinVector),
    /// Place this layout directly.
    PinSet(PinVector),
    /// Drive every actuator to its safe level.
    EmergencyReset,
    /// Rewrite a frame from per-ball knocked pins.
    ScoreCorrection {
        /// Bowler index.
        bowler: usize,
        /// Frame index.
        frame: usize,
        /// Pins knocked per ball.
        balls: Vec<PinVector>,
    },
    /// Flip the hold flag.
    ToggleHold,
    /// End the session.
    EndGame {
        /// Why the session ended.
        reason: String,
    },
    /// Take over the paired lane's team.
    ImportTeam(TeamTransfer),
    /// Apply deferred placements whose cool-down has ended.
    Tick,
}

impl LaneRequest {
    /// Short name for logs and rejection events.
    pub fn name(&self) -> &'static str {
        match self {
            LaneRequest::StartGame(_) => "start_game",
            LaneRequest::BallDetected => "ball_detected",
            LaneRequest::SubmitBall(_) => "submit_ball",
            LaneRequest::ManualReset { .. } => "manual_reset",
            LaneRequest::PinRestore(_) => "pin_restore",
            LaneRequest::PinSet(_) => "pin_set",
            LaneRequest::EmergencyReset => "emergency_reset",
            LaneRequest::ScoreCorrection { .. } => "score_correction",
            LaneRequest::ToggleHold => "toggle_hold",
            LaneRequest::EndGame { .. } => "end_game",
            LaneRequest::ImportTeam(_) => "import_team",
            LaneRequest::Tick => "tick",
        }
    }
}

/// State changes published by a lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LaneEvent {
    /// A game began.
    GameStarted {
        /// Game number within the session.
        game_number: u32,
        /// Variant label.
        kind: String,
    },
    /// Sensors settled after a ball.
    PinsChecked {
        /// Pins that fell during the check.
        delta: PinVector,
        /// Pins down at the end of the check.
        pins_down: PinVector,
        /// Classification.
        status: PinStatus,
    },
    /// A ball was scored.
    BallRecorded {
        /// Bowler index.
        bowler: usize,
        /// Frame index.
        frame: usize,
        /// The scored ball.
        ball: Ball,
    },
    /// A frame took its last ball.
    FrameCompleted {
        /// Bowler index.
        bowler: usize,
        /// Frame index.
        frame: usize,
        /// Frame score so far.
        score: u16,
        /// Running total through the frame.
        cumulative_total: u32,
    },
    /// A different bowler is up.
    BowlerUp {
        /// Bowler index.
        bowler: usize,
        /// Display name.
        name: String,
    },
    /// The pinsetter stood a full rack.
    PinsReset,
    /// A full reset will run at the next cycle.
    ResetScheduled,
    /// The pinsetter cycled to a layout.
    PinsRestored {
        /// Whether the layout was placed or deferred.
        placement: Placement,
    },
    /// Pins were placed outside a cycle.
    PinsPlaced {
        /// Placement outcome.
        placement: Placement,
    },
    /// The ready signal did not come; the layout was applied anyway.
    ReadyFallback {
        /// How the wait ended.
        outcome: ReadyOutcome,
    },
    /// Actuators were driven to safe levels.
    EmergencyReset,
    /// A pinsetter command failed after scoring; lines are safe.
    MachineFault {
        /// Failure text.
        error: String,
    },
    /// The game log refused a record.
    StorageFault {
        /// Failure text.
        error: String,
    },
    /// The team left for the paired lane.
    TeamExported {
        /// Payload to deliver.
        team: TeamTransfer,
    },
    /// The paired lane's team arrived.
    TeamImported {
        /// Sending lane.
        from_lane: LaneId,
    },
    /// A game ended.
    GameFinished {
        /// Final scores.
        record: GameRecord,
    },
    /// The session ended; the lane is idle.
    SessionFinished {
        /// Why it ended.
        reason: String,
    },
    /// Hold was switched.
    HoldChanged {
        /// New hold state.
        hold: bool,
    },
    /// A frame was rewritten.
    CorrectionApplied {
        /// Bowler index.
        bowler: usize,
        /// Frame index.
        frame: usize,
        /// Bowler total after rescoring.
        total_score: u32,
    },
    /// A request was refused.
    Rejected {
        /// Request name.
        request: String,
        /// Why.
        reason: String,
    },
}
