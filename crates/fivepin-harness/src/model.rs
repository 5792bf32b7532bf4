//! Operations for model-based testing.
//!
//! Operations are everything a lane can do to a session. They are generated
//! by proptest or by the fuzzers (via [`Arbitrary`]) and applied to a live
//! [`GameSession`]. Indices are reduced modulo the session's size so most
//! generated operations land on real bowlers and frames.

use arbitrary::Arbitrary;
use fivepin_core::{FRAMES_PER_GAME, GameSession, PinVector, ResetDecision, SessionAction, SessionError};

/// Operations applied to a session.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Ball knocking `knocked` (a pin mask) off the current rack.
    Throw {
        /// Pins the ball knocks; pins already down are ignored.
        knocked: u8,
    },

    /// Ball clearing the current rack.
    Strike,

    /// Desk correction of a frame.
    Correct {
        /// Bowler index, reduced modulo the team size.
        bowler: u8,
        /// Frame index, reduced modulo ten.
        frame: u8,
        /// Per-ball knocked pin masks.
        balls: Vec<u8>,
    },

    /// Hold toggled at the desk.
    ToggleHold,
}

/// What applying an operation did.
#[derive(Debug)]
pub enum OperationOutcome {
    /// The session accepted it.
    Applied(Vec<SessionAction>),
    /// The session refused it.
    Rejected(SessionError),
}

impl OperationOutcome {
    /// Whether the session accepted the operation.
    pub fn is_applied(&self) -> bool {
        matches!(self, OperationOutcome::Applied(_))
    }
}

/// Pins down on the rack the current bowler faces.
pub fn rack_down(session: &GameSession) -> PinVector {
    match session.current_rack() {
        Some(ResetDecision::KeepDown { down, .. }) => down,
        Some(ResetDecision::Full) | None => PinVector::EMPTY,
    }
}

/// Applies `operation` to `session`.
pub fn apply(session: &mut GameSession, operation: &Operation) -> OperationOutcome {
    let result = match operation {
        Operation::Throw { knocked } => {
            let reading = rack_down(session).union(PinVector::from_mask(*knocked));
            session.process_ball(reading)
        },
        Operation::Strike => session.process_ball(PinVector::ALL),
        Operation::Correct { bowler, frame, balls } => {
            let bowler = usize::from(*bowler) % session.bowlers().len().max(1);
            let frame = usize::from(*frame) % FRAMES_PER_GAME;
            let pins: Vec<PinVector> = balls.iter().take(4).map(|m| PinVector::from_mask(*m)).collect();
            session.apply_correction(bowler, frame, &pins)
        },
        Operation::ToggleHold => {
            session.toggle_hold();
            Ok(Vec::new())
        },
    };

    match result {
        Ok(actions) => OperationOutcome::Applied(actions),
        Err(e) => OperationOutcome::Rejected(e),
    }
}
