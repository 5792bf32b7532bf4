//! Fuzz target for score corrections
//!
//! Plays part of a game, then applies arbitrary corrections.
//!
//! # Invariants
//!
//! - An accepted correction leaves the game rescoring to itself
//! - An accepted correction never changes which frames are complete
//! - A rejected correction changes nothing
//! - NEVER panic on malformed corrections

#![no_main]

use arbitrary::Arbitrary;
use fivepin_core::{GameSession, GameSetup, PinVector, scoring::recalculate};
use fivepin_harness::rack_down;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Correction {
    bowler: u8,
    frame: u8,
    balls: Vec<u8>,
}

#[derive(Debug, Arbitrary)]
struct Input {
    throws: Vec<u8>,
    corrections: Vec<Correction>,
}

fuzz_target!(|input: Input| {
    let Ok(mut session) = GameSession::new(1, GameSetup::quick(["A", "B"], 1)) else {
        panic!("valid setup rejected");
    };
    for knocked in input.throws.iter().take(60) {
        let reading = rack_down(&session).union(PinVector::from_mask(*knocked));
        if session.process_ball(reading).is_err() {
            break;
        }
    }

    for correction in input.corrections.iter().take(20) {
        let before = session.bowlers().to_vec();
        let completed: Vec<usize> = before.iter().map(|b| b.current_frame).collect();
        let balls: Vec<PinVector> = correction.balls.iter().take(5).map(|m| PinVector::from_mask(*m)).collect();

        match session.apply_correction(usize::from(correction.bowler % 3), usize::from(correction.frame % 11), &balls) {
            Ok(_) => {
                let mut rescored = session.bowlers().to_vec();
                recalculate(&mut rescored);
                assert_eq!(rescored.as_slice(), session.bowlers(), "correction left stale scores");
                let after: Vec<usize> = session.bowlers().iter().map(|b| b.current_frame).collect();
                assert_eq!(after, completed, "correction moved the current frame");
            },
            Err(_) => assert_eq!(session.bowlers(), before.as_slice(), "rejected correction changed frames"),
        }
    }
});
