//! Standard invariant checks.

use fivepin_core::{
    Bowler,
    frame::{LAST_FRAME, MAX_BALLS},
    pins::RACK_VALUE,
    scoring::recalculate,
};

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// Largest score one frame can reach: three full racks.
const MAX_FRAME_SCORE: u16 = 3 * RACK_VALUE as u16;

fn violation(invariant: &'static str, message: String) -> InvariantResult {
    Err(Violation { invariant, message })
}

/// Strike frames before the 10th hold exactly one ball.
pub struct StrikeFrames;

impl Invariant for StrikeFrames {
    fn name(&self) -> &'static str {
        "strike_frames"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for lane in &state.lanes {
            for bowler in &lane.bowlers {
                for (index, frame) in bowler.frames.iter().enumerate().take(LAST_FRAME) {
                    let first_full = frame.balls.first().is_some_and(|b| b.value == RACK_VALUE);
                    if frame.is_strike != first_full {
                        return violation(
                            self.name(),
                            format!("lane {} {} frame {}: strike flag disagrees with balls", lane.lane_id, bowler.name, index + 1),
                        );
                    }
                    if frame.is_strike && frame.balls.len() != 1 {
                        return violation(
                            self.name(),
                            format!(
                                "lane {} {} frame {}: strike with {} balls",
                                lane.lane_id,
                                bowler.name,
                                index + 1,
                                frame.balls.len()
                            ),
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

/// A settled spare scores 15 plus the value of the one ball it borrowed.
pub struct SpareBonus;

impl Invariant for SpareBonus {
    fn name(&self) -> &'static str {
        "spare_bonus"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for lane in &state.lanes {
            for bowler in &lane.bowlers {
                for (index, frame) in bowler.frames.iter().enumerate().take(LAST_FRAME) {
                    if !frame.is_spare || frame.pending_bonus > 0 {
                        continue;
                    }
                    let [bonus] = frame.bonus_balls.as_slice() else {
                        return violation(
                            self.name(),
                            format!(
                                "lane {} {} frame {}: spare borrowed {} balls",
                                lane.lane_id,
                                bowler.name,
                                index + 1,
                                frame.bonus_balls.len()
                            ),
                        );
                    };
                    let Some(value) = ball_value(&lane.bowlers, bonus.bowler, bonus.frame, bonus.ball) else {
                        return violation(
                            self.name(),
                            format!("lane {} {} frame {}: bonus ref {bonus:?} dangles", lane.lane_id, bowler.name, index + 1),
                        );
                    };
                    let expected = u16::from(RACK_VALUE) + u16::from(value);
                    if frame.score != expected {
                        return violation(
                            self.name(),
                            format!(
                                "lane {} {} frame {}: spare scored {} expected {expected}",
                                lane.lane_id,
                                bowler.name,
                                index + 1,
                                frame.score
                            ),
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

fn ball_value(bowlers: &[Bowler], bowler: usize, frame: usize, ball: usize) -> Option<u8> {
    bowlers.get(bowler)?.frames.get(frame)?.balls.get(ball).map(|b| b.value)
}

/// The 10th frame scores its own pins only.
pub struct TenthFrameNoBonus;

impl Invariant for TenthFrameNoBonus {
    fn name(&self) -> &'static str {
        "tenth_frame_no_bonus"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for lane in &state.lanes {
            for bowler in &lane.bowlers {
                let Some(frame) = bowler.frames.get(LAST_FRAME) else { continue };
                if !frame.bonus_balls.is_empty() || frame.pending_bonus != 0 || frame.score != frame.pin_total() {
                    return violation(
                        self.name(),
                        format!(
                            "lane {} {}: 10th frame scored {} from {} pins",
                            lane.lane_id,
                            bowler.name,
                            frame.score,
                            frame.pin_total()
                        ),
                    );
                }
            }
        }
        Ok(())
    }
}

/// No frame holds more than three balls or scores more than three racks.
pub struct BallsPerFrame;

impl Invariant for BallsPerFrame {
    fn name(&self) -> &'static str {
        "balls_per_frame"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for lane in &state.lanes {
            for bowler in &lane.bowlers {
                for (index, frame) in bowler.frames.iter().enumerate() {
                    if frame.balls.len() > MAX_BALLS || frame.score > MAX_FRAME_SCORE {
                        return violation(
                            self.name(),
                            format!(
                                "lane {} {} frame {}: {} balls scoring {}",
                                lane.lane_id,
                                bowler.name,
                                index + 1,
                                frame.balls.len(),
                                frame.score
                            ),
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

/// Running totals never decrease from one frame to the next.
pub struct CumulativeMonotonic;

impl Invariant for CumulativeMonotonic {
    fn name(&self) -> &'static str {
        "cumulative_monotonic"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for lane in &state.lanes {
            for bowler in &lane.bowlers {
                let played = bowler.frames.iter().take_while(|f| !f.balls.is_empty());
                let totals: Vec<u32> = played.map(|f| f.cumulative_total).collect();
                if let Some(index) = totals.windows(2).position(|w| w[1] < w[0]) {
                    return violation(
                        self.name(),
                        format!("lane {} {}: cumulative total drops after frame {}", lane.lane_id, bowler.name, index + 1),
                    );
                }
            }
        }
        Ok(())
    }
}

/// A bowler's total never decreases as balls are added.
pub struct TotalsMonotonic;

impl Invariant for TotalsMonotonic {
    fn name(&self) -> &'static str {
        "totals_monotonic"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for lane in &state.lanes {
            for (bowler, history) in lane.total_history.iter().enumerate() {
                if let Some(window) = history.windows(2).find(|w| w[1] < w[0]) {
                    return violation(
                        self.name(),
                        format!("lane {} bowler {bowler}: total dropped {} -> {}", lane.lane_id, window[0], window[1]),
                    );
                }
            }
        }
        Ok(())
    }
}

/// Rescoring a scored game changes nothing.
pub struct RecalculationStable;

impl Invariant for RecalculationStable {
    fn name(&self) -> &'static str {
        "recalculation_stable"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for lane in &state.lanes {
            let mut rescored = lane.bowlers.clone();
            recalculate(&mut rescored);
            if let Some((before, after)) = lane.bowlers.iter().zip(&rescored).find(|(a, b)| a != b) {
                return violation(
                    self.name(),
                    format!(
                        "lane {} {}: total {} rescored to {}",
                        lane.lane_id, before.name, before.total_score, after.total_score
                    ),
                );
            }
        }
        Ok(())
    }
}

/// The bowler who is up exists.
pub struct CurrentBowlerValid;

impl Invariant for CurrentBowlerValid {
    fn name(&self) -> &'static str {
        "current_bowler_valid"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for lane in &state.lanes {
            if !lane.bowlers.is_empty() && lane.current_bowler >= lane.bowlers.len() {
                return violation(
                    self.name(),
                    format!("lane {}: bowler {} of {}", lane.lane_id, lane.current_bowler, lane.bowlers.len()),
                );
            }
        }
        Ok(())
    }
}

/// Actuator lines rest high once a command has returned.
pub struct SafeActuatorLevels;

impl Invariant for SafeActuatorLevels {
    fn name(&self) -> &'static str {
        "safe_actuator_levels"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for lane in &state.lanes {
            if lane.lines_high == Some(false) {
                return violation(self.name(), format!("lane {}: an actuator line was left low", lane.lane_id));
            }
        }
        Ok(())
    }
}
