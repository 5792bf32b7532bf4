//! Bridge between wire messages and the lane.
//!
//! Translates [`LaneMessage`]s into [`LaneRequest`]s and lane events back
//! into the messages other parties care about, keeping the lane itself
//! unaware of the wire format.

use fivepin_core::LaneId;
use fivepin_machine::MachineSummary;
use fivepin_proto::LaneMessage;
use tracing::debug;

use crate::event::{LaneEvent, LaneRequest};

/// What to do with an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Hand to the lane.
    Request(LaneRequest),
    /// Reply with [`LaneBridge::machine_status`].
    MachineStatus,
    /// Reply with [`LaneMessage::Pong`].
    Ping,
    /// Not for this lane, or informational only.
    Ignored,
}

/// Message translation for one lane.
#[derive(Debug, Clone, Copy)]
pub struct LaneBridge {
    lane_id: LaneId,
}

impl LaneBridge {
    /// Bridge for `lane_id`.
    pub fn new(lane_id: LaneId) -> Self {
        Self { lane_id }
    }

    /// Translates an inbound message.
    pub fn inbound(&self, message: LaneMessage) -> Inbound {
        let name = message.name();
        let Some(message) = message.for_lane(self.lane_id) else {
            debug!(lane = self.lane_id, message = name, "command for another lane");
            return Inbound::Ignored;
        };
        if let Some(setup) = message.game_setup() {
            return Inbound::Request(LaneRequest::StartGame(setup));
        }

        let request = match message {
            LaneMessage::Throw { pins: Some(raw) } => LaneRequest::SubmitBall(raw),
            LaneMessage::Throw { pins: None } => LaneRequest::BallDetected,
            LaneMessage::TeamTransfer(team) => LaneRequest::ImportTeam(team),
            LaneMessage::ScheduleReset { immediate } => LaneRequest::ManualReset { immediate },
            LaneMessage::PinRestore { pins } => LaneRequest::PinRestore(pins),
            LaneMessage::PinSet { pins } => LaneRequest::PinSet(pins),
            LaneMessage::EmergencyReset => LaneRequest::EmergencyReset,
            LaneMessage::ScoreCorrection { bowler, frame, balls } => {
                LaneRequest::ScoreCorrection { bowler, frame, balls }
            },
            LaneMessage::ToggleHold => LaneRequest::ToggleHold,
            LaneMessage::EndGameRequest { reason } => {
                let reason = if reason.is_empty() { "ended by request".to_string() } else { reason };
                LaneRequest::EndGame { reason }
            },
            LaneMessage::RequestMachineStatus => return Inbound::MachineStatus,
            LaneMessage::Ping => return Inbound::Ping,
            other => {
                debug!(lane = self.lane_id, message = other.name(), "ignoring message");
                return Inbound::Ignored;
            },
        };
        Inbound::Request(request)
    }

    /// Message to send for a lane event, if any.
    pub fn outbound(&self, event: &LaneEvent) -> Option<LaneMessage> {
        match event {
            LaneEvent::TeamExported { team } => Some(LaneMessage::TeamTransfer(team.clone())),
            LaneEvent::GameFinished { record } => {
                Some(LaneMessage::GameComplete { lane_id: self.lane_id, game_number: record.game_number })
            },
            _ => None,
        }
    }

    /// Status reply.
    pub fn machine_status(&self, summary: MachineSummary) -> LaneMessage {
        LaneMessage::MachineStatus {
            lane_id: self.lane_id,
            pins_down: summary.pins_down,
            pending_full_reset: summary.pending_full_reset,
            pin_setting_suspended: summary.pin_setting_suspended,
        }
    }

    /// Announcement sent once at startup.
    pub fn ready(&self) -> LaneMessage {
        LaneMessage::Ready { lane_id: self.lane_id }
    }

    /// Liveness signal.
    pub fn heartbeat(&self, timestamp: u64) -> LaneMessage {
        LaneMessage::Heartbeat { lane_id: self.lane_id, timestamp }
    }
}

#[cfg(test)]
mod tests {
    use fivepin_core::{GameKind, GameLimit};
    use fivepin_proto::decode_line;

    use super::*;

    fn inbound(line: &str) -> Inbound {
        LaneBridge::new(3).inbound(decode_line(line.as_bytes()).unwrap())
    }

    #[test]
    fn throw_with_reading_is_submitted() {
        assert_eq!(
            inbound(r#"{"type":"throw","pins":"10100"}"#),
            Inbound::Request(LaneRequest::SubmitBall("10100".parse().unwrap()))
        );
        assert_eq!(inbound(r#"{"type":"throw"}"#), Inbound::Request(LaneRequest::BallDetected));
    }

    #[test]
    fn lane_command_is_unwrapped_for_own_lane_only() {
        assert_eq!(
            inbound(r#"{"type":"lane_command","lane_id":3,"command":{"type":"toggle_hold"}}"#),
            Inbound::Request(LaneRequest::ToggleHold)
        );
        assert_eq!(
            inbound(r#"{"type":"lane_command","lane_id":4,"command":{"type":"toggle_hold"}}"#),
            Inbound::Ignored
        );
    }

    #[test]
    fn quick_game_starts_session() {
        let Inbound::Request(LaneRequest::StartGame(setup)) =
            inbound(r#"{"type":"quick_game","bowlers":[{"name":"Ann"}],"limit":{"games":2}}"#)
        else {
            panic!("expected start");
        };
        assert_eq!(setup.kind, GameKind::Quick { limit: GameLimit::Games(2) });
    }

    #[test]
    fn status_and_ping_are_answered_by_caller() {
        assert_eq!(inbound(r#"{"type":"request_machine_status"}"#), Inbound::MachineStatus);
        assert_eq!(inbound(r#"{"type":"ping"}"#), Inbound::Ping);
        assert_eq!(inbound(r#"{"type":"heartbeat","lane_id":4,"timestamp":1}"#), Inbound::Ignored);
    }

    #[test]
    fn blank_end_reason_gets_default() {
        assert_eq!(
            inbound(r#"{"type":"end_game_request"}"#),
            Inbound::Request(LaneRequest::EndGame { reason: "ended by request".to_string() })
        );
    }
}
