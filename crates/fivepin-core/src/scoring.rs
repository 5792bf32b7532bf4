//! Frame scoring.
//!
//! Scores are always recomputed from frame 0 for every bowler. Balls are the
//! only authoritative state; flags, bonuses and totals are derived. Running
//! [`recalculate`] twice produces identical results.
//!
//! Strikes in frames 0-8 borrow the next two balls, spares the next one.
//! Bonus balls come from the bowler's own later frames. If the bowler has
//! finished and is still owed balls, the lookahead continues through the
//! following bowlers in rotation order. Balls still missing are counted in
//! `pending_bonus`.

use crate::{
    bowler::Bowler,
    frame::{BonusRef, FRAMES_PER_GAME},
};

/// Recomputes flags, bonuses and totals for every bowler.
pub fn recalculate(bowlers: &mut [Bowler]) {
    for bowler in bowlers.iter_mut() {
        for frame in &mut bowler.frames {
            frame.classify();
        }
    }

    for index in 0..bowlers.len() {
        let mut running = 0u32;
        for frame_index in 0..FRAMES_PER_GAME.min(bowlers[index].frames.len()) {
            let needed = bowlers[index].frames[frame_index].bonus_needed(frame_index);
            let refs = if needed == 0 { Vec::new() } else { bonus_lookahead(bowlers, index, frame_index, needed) };
            let bonus = bonus_value(bowlers, &refs);

            let frame = &mut bowlers[index].frames[frame_index];
            frame.score = frame.pin_total() + bonus;
            frame.pending_bonus = (needed - refs.len()) as u8;
            frame.bonus_balls = refs;
            if !frame.balls.is_empty() {
                running += u32::from(frame.score);
            }
            frame.cumulative_total = running;
        }

        let bowler = &mut bowlers[index];
        bowler.total_score = running;
        bowler.completed = bowler.is_finished();
    }
}

/// Balls thrown after `frame` that a strike or spare there borrows.
fn bonus_lookahead(bowlers: &[Bowler], bowler: usize, frame: usize, needed: usize) -> Vec<BonusRef> {
    let mut refs = Vec::with_capacity(needed);
    collect_balls(bowlers, bowler, frame + 1, needed, &mut refs);

    if refs.len() < needed && bowlers[bowler].is_finished() {
        for step in 1..bowlers.len() {
            let next = (bowler + step) % bowlers.len();
            collect_balls(bowlers, next, frame + 1, needed, &mut refs);
            if refs.len() == needed {
                break;
            }
        }
    }

    refs
}

fn collect_balls(bowlers: &[Bowler], bowler: usize, from_frame: usize, needed: usize, refs: &mut Vec<BonusRef>) {
    for (frame, f) in bowlers[bowler].frames.iter().enumerate().skip(from_frame) {
        for ball in 0..f.balls.len() {
            if refs.len() == needed {
                return;
            }
            refs.push(BonusRef { bowler, frame, ball });
        }
    }
}

fn bonus_value(bowlers: &[Bowler], refs: &[BonusRef]) -> u16 {
    refs.iter()
        .filter_map(|r| bowlers.get(r.bowler)?.frames.get(r.frame)?.balls.get(r.ball))
        .map(|b| u16::from(b.value))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ball::{Rack, evaluate},
        frame::LAST_FRAME,
        pins::PinVector,
        SymbolTable,
    };

    /// Appends balls (given as knocked-pin keys) to a frame.
    fn bowl(bowler: &mut Bowler, frame: usize, keys: &[&str]) {
        let table = SymbolTable::standard();
        for key in keys {
            let delta: PinVector = key.parse().unwrap();
            let balls = &bowler.frames[frame].balls;
            let ball = evaluate(Rack::after(balls).down.union(delta), balls, &table);
            bowler.frames[frame].balls.push(ball);
        }
    }

    #[test]
    fn perfect_game_is_450() {
        let mut bowler = Bowler::new("A");
        for frame in 0..LAST_FRAME {
            bowl(&mut bowler, frame, &["11111"]);
        }
        bowl(&mut bowler, LAST_FRAME, &["11111", "11111", "11111"]);
        bowler.current_frame = FRAMES_PER_GAME;

        let mut bowlers = vec![bowler];
        recalculate(&mut bowlers);

        assert_eq!(bowlers[0].total_score, 450);
        assert!(bowlers[0].frames.iter().all(|f| f.score == 45));
        assert!(bowlers[0].completed);
    }

    #[test]
    fn strike_borrows_next_two_balls() {
        let mut bowler = Bowler::new("A");
        bowl(&mut bowler, 2, &["11111"]);
        bowl(&mut bowler, 3, &["00100", "01000", "10011"]);
        let mut bowlers = vec![bowler];
        recalculate(&mut bowlers);

        let strike = &bowlers[0].frames[2];
        assert!(strike.is_strike);
        assert_eq!(strike.score, 15 + 5 + 3);
        assert_eq!(
            strike.bonus_balls,
            vec![BonusRef { bowler: 0, frame: 3, ball: 0 }, BonusRef { bowler: 0, frame: 3, ball: 1 }]
        );
        assert_eq!(strike.pending_bonus, 0);
    }

    #[test]
    fn spare_waits_for_next_ball() {
        let mut bowler = Bowler::new("A");
        bowl(&mut bowler, 0, &["11000", "00111"]);
        let mut bowlers = vec![bowler];
        recalculate(&mut bowlers);
        assert!(bowlers[0].frames[0].is_spare);
        assert_eq!(bowlers[0].frames[0].pending_bonus, 1);
        assert_eq!(bowlers[0].frames[0].score, 15);

        bowl(&mut bowlers[0], 1, &["01110"]);
        recalculate(&mut bowlers);
        assert_eq!(bowlers[0].frames[0].score, 26);
        assert_eq!(bowlers[0].frames[0].pending_bonus, 0);
        assert_eq!(bowlers[0].frames[1].cumulative_total, 26 + 11);
    }

    #[test]
    fn tenth_frame_has_no_bonus() {
        let mut bowler = Bowler::new("A");
        bowl(&mut bowler, LAST_FRAME, &["11111", "00100", "11011"]);
        let mut bowlers = vec![bowler];
        recalculate(&mut bowlers);
        let tenth = &bowlers[0].frames[LAST_FRAME];
        assert!(tenth.is_strike);
        assert_eq!(tenth.score, 30);
        assert!(tenth.bonus_balls.is_empty());
    }

    #[test]
    fn recalculation_is_idempotent() {
        let mut bowler = Bowler::new("A");
        bowl(&mut bowler, 0, &["11111"]);
        bowl(&mut bowler, 1, &["11000", "00111"]);
        bowl(&mut bowler, 2, &["00100", "00000", "01000"]);
        let mut bowlers = vec![bowler, Bowler::new("B")];
        recalculate(&mut bowlers);
        let first = bowlers.clone();
        recalculate(&mut bowlers);
        assert_eq!(first, bowlers);
    }

    #[test]
    fn finished_bowler_borrows_from_next_in_rotation() {
        let mut a = Bowler::new("A");
        bowl(&mut a, 8, &["11111"]);
        a.current_frame = FRAMES_PER_GAME;
        let mut b = Bowler::new("B");
        bowl(&mut b, 9, &["00100", "01000"]);

        let mut bowlers = vec![a, b];
        recalculate(&mut bowlers);
        let frame = &bowlers[0].frames[8];
        assert_eq!(frame.score, 15 + 5 + 3);
        assert_eq!(frame.bonus_balls[0], BonusRef { bowler: 1, frame: 9, ball: 0 });
    }
}
