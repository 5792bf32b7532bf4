//! Model-based property tests.
//!
//! Random operation sequences are applied to a live session and the standard
//! invariants are checked after every step.
//!
//! ```text
//! proptest generates: Vec<Operation>
//!                          │
//!                          ▼
//!                 apply to GameSession
//!                          │
//!                          ▼
//!              InvariantRegistry::standard()
//! ```

use fivepin_core::{GameSession, GameSetup, SessionError, TurnState};
use fivepin_harness::{InvariantRegistry, LaneSnapshot, Operation, OperationOutcome, ScoreHistory, SystemSnapshot, apply};
use proptest::prelude::*;

fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        10 => (0u8..32).prop_map(|knocked| Operation::Throw { knocked }),
        3 => Just(Operation::Strike),
        1 => (any::<u8>(), any::<u8>(), prop::collection::vec(0u8..32, 0..4))
            .prop_map(|(bowler, frame, balls)| Operation::Correct { bowler, frame, balls }),
        1 => Just(Operation::ToggleHold),
    ]
}

fn setup_strategy() -> impl Strategy<Value = GameSetup> {
    (1usize..5, 1usize..4, any::<bool>()).prop_map(|(bowlers, frames_per_turn, league)| {
        let names: Vec<String> = (0..bowlers).map(|i| format!("Bowler {i}")).collect();
        let setup = if league { GameSetup::league(names, None, 3) } else { GameSetup::quick(names, 1) };
        setup.frames_per_turn(frames_per_turn)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: every standard invariant holds after every operation
    #[test]
    fn prop_invariants_hold_after_every_operation(
        setup in setup_strategy(),
        ops in prop::collection::vec(operation_strategy(), 0..150),
    ) {
        let registry = InvariantRegistry::standard();
        let mut session = GameSession::new(3, setup).unwrap();
        let mut history = ScoreHistory::new();

        for (step, op) in ops.iter().enumerate() {
            let outcome = apply(&mut session, op);
            if matches!(op, Operation::Correct { .. }) && outcome.is_applied() {
                history.clear();
            }
            history.observe(&session);

            let lane = LaneSnapshot::from_session(&session).with_history(&history);
            registry.assert_all(&SystemSnapshot::single(lane), &format!("after step {step} ({op:?})"));
        }
    }

    /// Property: a refused operation leaves every frame untouched
    #[test]
    fn prop_rejected_operations_change_nothing(
        ops in prop::collection::vec(operation_strategy(), 0..120),
    ) {
        let mut session = GameSession::new(1, GameSetup::quick(["A", "B"], 1)).unwrap();

        for op in &ops {
            let before = session.bowlers().to_vec();
            let current = session.current_bowler();
            if let OperationOutcome::Rejected(_) = apply(&mut session, op) {
                prop_assert_eq!(session.bowlers(), before.as_slice());
                prop_assert_eq!(session.current_bowler(), current);
            }
        }
    }

    /// Property: throws are only refused while on hold or after the game
    #[test]
    fn prop_throws_refused_only_when_not_bowling(
        ops in prop::collection::vec(operation_strategy(), 0..120),
    ) {
        let mut session = GameSession::new(1, GameSetup::quick(["A"], 1)).unwrap();

        for op in &ops {
            let held = session.hold_active();
            let state = session.turn_state();
            let outcome = apply(&mut session, op);
            if let (Operation::Throw { .. } | Operation::Strike, OperationOutcome::Rejected(e)) = (op, &outcome) {
                let expected = held || state != TurnState::Bowling;
                prop_assert!(expected, "throw refused while bowling: {e}");
                let known = matches!(e, SessionError::OnHold | SessionError::NotBowling { .. });
                prop_assert!(known, "unexpected refusal: {e}");
            }
        }
    }
}
