//! Lane messages.
//!
//! One enum covers everything a lane accepts from a front desk, a display or
//! its paired lane, plus the signals it sends back. Messages are JSON objects
//! tagged by `type`:
//!
//! ```json
//! {"type":"schedule_reset","immediate":true}
//! {"type":"lane_command","lane_id":3,"command":{"type":"toggle_hold"}}
//! ```

use fivepin_core::{BowlerEntry, GameKind, GameLimit, GameSettings, GameSetup, LaneId, PinVector, TeamTransfer};
use serde::{Deserialize, Serialize};

/// Every message a lane sends or receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LaneMessage {
    /// Start open play.
    QuickGame {
        /// Bowlers in rotation order.
        bowlers: Vec<BowlerEntry>,
        /// Session length.
        limit: GameLimit,
        /// Scoring settings.
        #[serde(default)]
        settings: GameSettings,
    },

    /// Start a league series.
    LeagueGame {
        /// Bowlers in rotation order.
        bowlers: Vec<BowlerEntry>,
        /// Lane the team alternates with.
        #[serde(default)]
        paired_lane: Option<LaneId>,
        /// Games in the series.
        games: u32,
        /// Scoring settings.
        #[serde(default)]
        settings: GameSettings,
    },

    /// Start a practice block.
    PracticeGame {
        /// Block length in minutes.
        minutes: u32,
    },

    /// A ball was thrown. Without `pins` the lane reads its sensors.
    Throw {
        /// Raw reading, when supplied by an external detector.
        #[serde(default)]
        pins: Option<PinVector>,
    },

    /// Whole team handed over by the paired lane.
    TeamTransfer(TeamTransfer),

    /// Lane is up and accepting games.
    Ready {
        /// Sending lane.
        lane_id: LaneId,
    },

    /// A game finished on the sending lane.
    GameComplete {
        /// Sending lane.
        lane_id: LaneId,
        /// Game number within the series.
        game_number: u32,
    },

    /// Full reset now or at the next cycle.
    ScheduleReset {
        /// Reset now instead of at the next cycle.
        #[serde(default)]
        immediate: bool,
    },

    /// Cycle the pinsetter to this layout.
    PinRestore {
        /// Pins to leave down.
        pins: PinVector,
    },

    /// Place this layout directly, bypassing the cycle.
    PinSet {
        /// Pins to knock down.
        pins: PinVector,
    },

    /// Drive every actuator to its safe level.
    EmergencyReset,

    /// Rewrite a frame.
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
    EndGameRequest {
        /// Why the session ended.
        #[serde(default)]
        reason: String,
    },

    /// Ask for a [`LaneMessage::MachineStatus`] reply.
    RequestMachineStatus,

    /// Pinsetter status.
    MachineStatus {
        /// Reporting lane.
        lane_id: LaneId,
        /// Pins the controller believes are down.
        pins_down: PinVector,
        /// Next cycle is a full reset.
        pending_full_reset: bool,
        /// Pin setting is in its cool-down.
        pin_setting_suspended: bool,
    },

    /// Liveness signal.
    Heartbeat {
        /// Sending lane.
        lane_id: LaneId,
        /// Unix seconds.
        timestamp: u64,
    },

    /// Liveness probe.
    Ping,

    /// Liveness reply.
    Pong,

    /// A command addressed to one lane.
    LaneCommand {
        /// Target lane.
        lane_id: LaneId,
        /// Wrapped command.
        command: Box<LaneMessage>,
    },
}

impl LaneMessage {
    /// Game setup carried by a game-start message.
    pub fn game_setup(&self) -> Option<GameSetup> {
        match self {
            LaneMessage::QuickGame { bowlers, limit, settings } => Some(GameSetup {
                kind: GameKind::Quick { limit: *limit },
                bowlers: bowlers.clone(),
                settings: settings.clone(),
            }),
            LaneMessage::LeagueGame { bowlers, paired_lane, games, settings } => Some(GameSetup {
                kind: GameKind::League { paired_lane: *paired_lane, games: *games },
                bowlers: bowlers.clone(),
                settings: settings.clone(),
            }),
            LaneMessage::PracticeGame { minutes } => Some(GameSetup::practice(*minutes)),
            _ => None,
        }
    }

    /// Unwraps a [`LaneMessage::LaneCommand`] addressed to `lane`.
    ///
    /// Other messages pass through unchanged; commands for other lanes yield
    /// `None`.
    pub fn for_lane(self, lane: LaneId) -> Option<LaneMessage> {
        match self {
            LaneMessage::LaneCommand { lane_id, command } if lane_id == lane => command.for_lane(lane),
            LaneMessage::LaneCommand { .. } => None,
            other => Some(other),
        }
    }

    /// Message name as it appears in the `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            LaneMessage::QuickGame { .. } => "quick_game",
            LaneMessage::LeagueGame { .. } => "league_game",
            LaneMessage::PracticeGame { .. } => "practice_game",
            LaneMessage::Throw { .. } => "throw",
            LaneMessage::TeamTransfer(_) => "team_transfer",
            LaneMessage::Ready { .. } => "ready",
            LaneMessage::GameComplete { .. } => "game_complete",
            LaneMessage::ScheduleReset { .. } => "schedule_reset",
            LaneMessage::PinRestore { .. } => "pin_restore",
            LaneMessage::PinSet { .. } => "pin_set",
            LaneMessage::EmergencyReset => "emergency_reset",
            LaneMessage::ScoreCorrection { .. } => "score_correction",
            LaneMessage::ToggleHold => "toggle_hold",
            LaneMessage::EndGameRequest { .. } => "end_game_request",
            LaneMessage::RequestMachineStatus => "request_machine_status",
            LaneMessage::MachineStatus { .. } => "machine_status",
            LaneMessage::Heartbeat { .. } => "heartbeat",
            LaneMessage::Ping => "ping",
            LaneMessage::Pong => "pong",
            LaneMessage::LaneCommand { .. } => "lane_command",
        }
    }
}
