//! Fuzz target for the scoring pipeline
//!
//! Drives a session with arbitrary throws, strikes, corrections and holds
//! and checks the standard invariants after every step.
//!
//! # Strategy
//!
//! - Team shape: 1 to 6 bowlers, 1 to 5 frames per turn, quick or league
//! - Operations: arbitrary pin masks, including pins already down
//! - Corrections: arbitrary bowler and frame indices and ball lists
//!
//! # Invariants
//!
//! - Every standard invariant holds after every operation
//! - A rejected operation changes no frame
//! - NEVER panic on any operation sequence

#![no_main]

use arbitrary::Arbitrary;
use fivepin_core::{GameSession, GameSetup};
use fivepin_harness::{InvariantRegistry, LaneSnapshot, Operation, OperationOutcome, ScoreHistory, SystemSnapshot, apply};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    bowlers: u8,
    frames_per_turn: u8,
    league: bool,
    ops: Vec<Operation>,
}

fuzz_target!(|input: Input| {
    let bowlers = usize::from(input.bowlers % 6) + 1;
    let frames_per_turn = usize::from(input.frames_per_turn % 5) + 1;
    let names: Vec<String> = (0..bowlers).map(|i| format!("B{i}")).collect();
    let setup = if input.league { GameSetup::league(names, None, 1) } else { GameSetup::quick(names, 1) };

    let Ok(mut session) = GameSession::new(1, setup.frames_per_turn(frames_per_turn)) else {
        panic!("valid setup rejected");
    };
    let registry = InvariantRegistry::standard();
    let mut history = ScoreHistory::new();

    for (step, op) in input.ops.iter().take(400).enumerate() {
        let before = session.bowlers().to_vec();
        match apply(&mut session, op) {
            OperationOutcome::Applied(_) => {
                if matches!(op, Operation::Correct { .. }) {
                    history.clear();
                }
            },
            OperationOutcome::Rejected(e) => {
                assert_eq!(session.bowlers(), before.as_slice(), "rejected {op:?} ({e}) changed frames");
            },
        }
        history.observe(&session);

        let lane = LaneSnapshot::from_session(&session).with_history(&history);
        registry.assert_all(&SystemSnapshot::single(lane), &format!("step {step} ({op:?})"));
    }
});
