//! Whole-lane simulations: session, controller and simulated pinsetter on a
//! virtual clock, driven by seeded throws.

use fivepin_core::{GameSetup, PinVector, ResetDecision, SessionAction, TurnState};
use fivepin_harness::{BowlError, InvariantRegistry, SimLane, ThrowGenerator, rack_down};
use fivepin_machine::{ChaoticHardware, MachineConfig, MemoryHardware};

#[tokio::test]
async fn seeded_games_keep_invariants_and_rack_in_sync() {
    let registry = InvariantRegistry::standard();

    for seed in 0..8 {
        let mut lane = SimLane::builder(GameSetup::quick(["A", "B", "C"], 1)).build().unwrap();
        let mut throws = ThrowGenerator::new(seed);

        let mut balls = 0;
        while lane.session.turn_state() == TurnState::Bowling && balls < 200 {
            lane.settle().await.unwrap();
            assert_eq!(
                lane.memory.pins_down(),
                rack_down(&lane.session),
                "seed {seed}: physical rack differs before ball {balls}"
            );

            let knock = throws.next_knock(rack_down(&lane.session).standing());
            lane.bowl(knock).await.unwrap();
            registry.assert_all(&lane.snapshot(), &format!("seed {seed} ball {balls}"));
            balls += 1;
        }

        assert_eq!(lane.session.turn_state(), TurnState::Finished, "seed {seed} did not finish");
        assert!(lane.session.bowlers().iter().all(|b| b.completed));
    }
}

#[tokio::test]
async fn perfect_game_on_simulated_lane() {
    let mut lane = SimLane::builder(GameSetup::quick(["Perfect"], 1)).build().unwrap();

    while lane.session.turn_state() == TurnState::Bowling {
        let actions = lane.bowl(PinVector::ALL).await.unwrap();
        assert!(actions.contains(&SessionAction::Reset(ResetDecision::Full)));
    }

    assert_eq!(lane.session.bowlers()[0].total_score, 450);
    assert_eq!(lane.memory.pins_down(), PinVector::EMPTY);
    assert!(lane.memory.all_lines_high());
}

#[tokio::test]
async fn chaotic_hardware_keeps_scoring_consistent() {
    let registry = InvariantRegistry::scoring();
    let memory = MemoryHardware::new();
    let chaotic = ChaoticHardware::with_seed(memory.clone(), 0.05, 11);
    let mut lane =
        SimLane::builder(GameSetup::quick(["A", "B"], 1)).memory(memory).build_with(chaotic.clone()).unwrap();
    let mut throws = ThrowGenerator::new(5);

    let mut balls = 0;
    let mut hardware_faults = 0;
    while lane.session.turn_state() == TurnState::Bowling && balls < 200 {
        match lane.bowl(throws.next_knock(PinVector::ALL)).await {
            Ok(_) => {},
            // Injected write failures leave the ball scored.
            Err(BowlError::Hardware { .. }) => hardware_faults += 1,
            Err(BowlError::Session(_)) => break,
        }

        registry.assert_all(&lane.snapshot(), &format!("ball {balls}"));
        balls += 1;
    }

    assert!(chaotic.injected_failures() > 0);
    assert!(hardware_faults > 0);
}

#[tokio::test]
async fn suspended_final_ball_is_placed_on_settle() {
    let config = MachineConfig::default();
    let mut lane = SimLane::builder(GameSetup::quick(["A"], 1)).machine_config(config).build().unwrap();

    lane.bowl(PinVector::from_mask(0b1_0000)).await.unwrap();
    lane.bowl(PinVector::from_mask(0b0_1000)).await.unwrap();

    assert!(lane.machine.is_suspended());
    lane.settle().await.unwrap();
    assert!(!lane.machine.is_suspended());
    assert_eq!(lane.memory.pins_down(), rack_down(&lane.session));
}
