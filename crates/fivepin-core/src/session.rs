//! Game session: the single mutable root of a lane's scoring state.
//!
//! # Architecture
//!
//! The session is a pure state machine. Each operation validates first,
//! mutates second and returns [`SessionAction`]s describing what happened
//! and what the pinsetter should do. A rejected operation leaves the session
//! untouched.
//!
//! One ball flows through:
//!
//! ```text
//!   raw pins ──> evaluate ──> frame ──> recalculate ──> turn manager
//!                                                          │
//!                    actions <── reset decision <──────────┘
//! ```

use std::cmp::Ordering;

use tracing::{debug, info, warn};

use crate::{
    action::{ResetDecision, SessionAction},
    ball::{Ball, Rack, SymbolTable, evaluate},
    bowler::Bowler,
    error::{CorrectionError, SessionError},
    frame::{FRAMES_PER_GAME, MAX_BALLS, final_ball_next, is_complete},
    game::{GameKind, GameSetup, LaneId},
    pins::PinVector,
    record::{BowlerRecord, GameRecord, TeamTransfer},
    scoring::recalculate,
    snapshot::{BowlerSnapshot, SessionSnapshot},
    turn::{TurnChange, TurnManager, TurnState},
};

/// Scoring state for one lane.
#[derive(Debug, Clone)]
pub struct GameSession {
    lane_id: LaneId,
    setup: GameSetup,
    bowlers: Vec<Bowler>,
    turns: TurnManager,
    hold_active: bool,
    game_number: u32,
    queued_team: Option<TeamTransfer>,
}

impl GameSession {
    /// Creates a session for `setup` on `lane_id`.
    pub fn new(lane_id: LaneId, setup: GameSetup) -> Result<Self, SessionError> {
        if setup.bowlers.is_empty() {
            return Err(SessionError::NoBowlers);
        }
        if setup.settings.frames_per_turn == Some(0) {
            return Err(SessionError::InvalidFramesPerTurn);
        }

        let bowlers: Vec<Bowler> =
            setup.bowlers.iter().map(|e| Bowler::new(e.name.clone()).with_handicap(e.handicap)).collect();
        let mut turns = TurnManager::new(setup.effective_frames_per_turn(), setup.kind.paired_lane().is_some());
        turns.start(&bowlers);

        info!(
            lane = lane_id,
            kind = setup.kind.label(),
            bowlers = bowlers.len(),
            frames_per_turn = turns.frames_per_turn(),
            "game session created"
        );

        Ok(Self { lane_id, setup, bowlers, turns, hold_active: false, game_number: 1, queued_team: None })
    }

    /// Actions announcing the first game.
    pub fn start_actions(&self) -> Vec<SessionAction> {
        let mut actions = vec![
            SessionAction::GameStarted { game_number: self.game_number },
            SessionAction::Reset(ResetDecision::Full),
        ];
        actions.extend(self.bowler_up());
        actions
    }

    /// Lane this session runs on.
    pub fn lane_id(&self) -> LaneId {
        self.lane_id
    }

    /// Game variant.
    pub fn kind(&self) -> &GameKind {
        &self.setup.kind
    }

    /// Bowlers in rotation order.
    pub fn bowlers(&self) -> &[Bowler] {
        &self.bowlers
    }

    /// Index of the bowler who is up.
    pub fn current_bowler(&self) -> usize {
        self.turns.current()
    }

    /// Rotation state.
    pub fn turn_state(&self) -> TurnState {
        self.turns.state()
    }

    /// Whether balls are currently refused.
    pub fn hold_active(&self) -> bool {
        self.hold_active
    }

    /// Game number within the session, from 1.
    pub fn game_number(&self) -> u32 {
        self.game_number
    }

    /// Scores one ball from a raw sensor reading.
    ///
    /// `raw` is the cumulative set of pins down since the rack was last set.
    pub fn process_ball(&mut self, raw: PinVector) -> Result<Vec<SessionAction>, SessionError> {
        if self.hold_active {
            return Err(SessionError::OnHold);
        }
        if self.turns.state() != TurnState::Bowling {
            return Err(SessionError::NotBowling { state: self.turns.state() });
        }

        let bowler_index = self.turns.current();
        let bowler = self.bowlers.get_mut(bowler_index).ok_or(SessionError::UnknownBowler(bowler_index))?;
        let frame_index = bowler.current_frame;
        let frame = bowler
            .frames
            .get_mut(frame_index)
            .ok_or(SessionError::InvalidFrame { bowler: bowler_index, frame: frame_index })?;

        let rack_before = frame.rack();
        let ball = evaluate(raw, &frame.balls, &self.setup.settings.symbols);
        frame.balls.push(ball.clone());

        let complete = frame.is_complete(frame_index);
        let decision = if complete || rack_before.down.union(ball.pins).is_all_down() {
            ResetDecision::Full
        } else {
            ResetDecision::KeepDown {
                down: frame.rack().down,
                final_ball_next: final_ball_next(frame_index, &frame.balls),
            }
        };

        info!(
            bowler = %bowler.name,
            frame = frame_index + 1,
            value = ball.value,
            symbol = %ball.symbol,
            pins = %ball.pins,
            "ball recorded"
        );

        recalculate(&mut self.bowlers);

        let mut actions = vec![SessionAction::BallRecorded { bowler: bowler_index, frame: frame_index, ball }];

        if complete {
            let frame = &self.bowlers[bowler_index].frames[frame_index];
            actions.push(SessionAction::FrameCompleted {
                bowler: bowler_index,
                frame: frame_index,
                score: frame.score,
                cumulative_total: frame.cumulative_total,
            });
        }

        actions.push(SessionAction::Reset(decision));

        if complete {
            let change = self.turns.frame_completed(&mut self.bowlers);
            recalculate(&mut self.bowlers);
            actions.extend(self.apply_turn_change(change));
        }

        Ok(actions)
    }

    /// Rewrites a frame from per-ball knocked pins and rescores everything.
    ///
    /// The frame must already be reached, and the correction may not change
    /// whether the frame is complete.
    pub fn apply_correction(
        &mut self,
        bowler_index: usize,
        frame_index: usize,
        pins: &[PinVector],
    ) -> Result<Vec<SessionAction>, SessionError> {
        let bowler = self.bowlers.get(bowler_index).ok_or(SessionError::UnknownBowler(bowler_index))?;
        let reached = frame_index < bowler.current_frame
            || (frame_index == bowler.current_frame && bowler_index == self.turns.current());
        if frame_index >= FRAMES_PER_GAME || !reached {
            return Err(SessionError::InvalidFrame { bowler: bowler_index, frame: frame_index });
        }
        let balls = rebuild_frame(frame_index, pins, &self.setup.settings.symbols)?;

        let was_complete = frame_index < bowler.current_frame;
        let now_complete = is_complete(frame_index, &balls);
        if was_complete != now_complete {
            return Err(CorrectionError::CompletionChanged { was_complete, now_complete }.into());
        }

        self.bowlers[bowler_index].frames[frame_index].balls = balls;
        recalculate(&mut self.bowlers);

        let total_score = self.bowlers[bowler_index].total_score;
        info!(bowler = bowler_index, frame = frame_index + 1, total_score, "score corrected");

        let mut actions =
            vec![SessionAction::CorrectionApplied { bowler: bowler_index, frame: frame_index, total_score }];
        if !was_complete && self.turns.state() == TurnState::Bowling {
            actions.extend(self.current_rack().map(SessionAction::Reset));
        }
        Ok(actions)
    }

    /// Flips the hold flag and returns the new value.
    pub fn toggle_hold(&mut self) -> bool {
        self.hold_active = !self.hold_active;
        info!(hold = self.hold_active, "hold toggled");
        self.hold_active
    }

    /// Pin layout the bowler who is up should be facing.
    pub fn current_rack(&self) -> Option<ResetDecision> {
        if self.turns.state() != TurnState::Bowling {
            return None;
        }
        let bowler = self.bowlers.get(self.turns.current())?;
        let frame = bowler.current()?;
        let rack = frame.rack();

        Some(if rack.is_fresh() {
            ResetDecision::Full
        } else {
            ResetDecision::KeepDown {
                down: rack.down,
                final_ball_next: final_ball_next(bowler.current_frame, &frame.balls),
            }
        })
    }

    /// Team payload for the paired lane, if this session is paired.
    pub fn export_team(&self) -> Option<TeamTransfer> {
        let to_lane = self.setup.kind.paired_lane()?;
        Some(TeamTransfer {
            from_lane: self.lane_id,
            to_lane,
            game_number: self.game_number,
            bowlers: self.bowlers.clone(),
        })
    }

    /// Takes over a team sent by the paired lane.
    ///
    /// A team that arrives while this lane's own team is still bowling is
    /// held until this lane exports.
    pub fn import_team(&mut self, team: TeamTransfer) -> Result<Vec<SessionAction>, SessionError> {
        if team.to_lane != self.lane_id {
            return Err(SessionError::WrongLane { to_lane: team.to_lane, lane: self.lane_id });
        }
        let team = TeamTransfer { bowlers: rebuild_team(team.bowlers, &self.setup.settings.symbols)?, ..team };

        if self.turns.state() == TurnState::Bowling {
            debug!(from_lane = team.from_lane, "team arrived early, holding until hand-off");
            self.queued_team = Some(team);
            return Ok(Vec::new());
        }

        Ok(self.take_team(team))
    }

    /// Clears every frame and starts the next game with the same bowlers.
    pub fn start_next_game(&mut self) -> Vec<SessionAction> {
        self.game_number += 1;
        for bowler in &mut self.bowlers {
            bowler.reset_frames();
        }
        recalculate(&mut self.bowlers);
        self.turns.start(&self.bowlers);
        info!(game = self.game_number, "next game started");
        self.start_actions()
    }

    /// Display snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            lane_id: self.lane_id,
            kind: self.setup.kind.label().to_string(),
            game_number: self.game_number,
            paired_lane: self.setup.kind.paired_lane(),
            current_bowler: self.turns.current(),
            turn_state: self.turns.state(),
            hold_active: self.hold_active,
            bowlers: self.bowlers.iter().map(BowlerSnapshot::from).collect(),
        }
    }

    /// Record of the current game.
    pub fn record(&self, finished_at_secs: u64) -> GameRecord {
        GameRecord {
            lane_id: self.lane_id,
            game_number: self.game_number,
            kind: self.setup.kind.label().to_string(),
            finished_at_secs,
            bowlers: self.bowlers.iter().map(BowlerRecord::from).collect(),
        }
    }

    fn take_team(&mut self, team: TeamTransfer) -> Vec<SessionAction> {
        info!(from_lane = team.from_lane, bowlers = team.bowlers.len(), "team imported");
        self.bowlers = team.bowlers;
        self.game_number = team.game_number;
        recalculate(&mut self.bowlers);

        let mut actions = vec![
            SessionAction::TeamImported { from_lane: team.from_lane },
            SessionAction::Reset(ResetDecision::Full),
        ];
        let change = self.turns.start(&self.bowlers);
        actions.extend(self.apply_turn_change(change));
        actions
    }

    fn apply_turn_change(&mut self, change: TurnChange) -> Vec<SessionAction> {
        match change {
            TurnChange::Continue => Vec::new(),
            TurnChange::NextBowler(_) => self.bowler_up().into_iter().collect(),
            TurnChange::GameFinished => {
                info!(game = self.game_number, "game finished");
                vec![SessionAction::GameFinished { game_number: self.game_number }]
            },
            TurnChange::ExportTeam => {
                let Some(team) = self.export_team() else {
                    warn!("turn manager asked for export on an unpaired session");
                    return Vec::new();
                };
                info!(to_lane = team.to_lane, "team handed to paired lane");
                let mut actions = vec![SessionAction::ExportTeam(team)];
                if let Some(queued) = self.queued_team.take() {
                    actions.extend(self.take_team(queued));
                }
                actions
            },
        }
    }

    fn bowler_up(&self) -> Option<SessionAction> {
        if self.turns.state() != TurnState::Bowling {
            return None;
        }
        let index = self.turns.current();
        let bowler = self.bowlers.get(index)?;
        Some(SessionAction::BowlerUp { bowler: index, name: bowler.name.clone() })
    }
}

/// Re-evaluates a frame from the pins each ball knocked down.
fn rebuild_frame(frame_index: usize, pins: &[PinVector], symbols: &SymbolTable) -> Result<Vec<Ball>, CorrectionError> {
    if pins.len() > MAX_BALLS {
        return Err(CorrectionError::TooManyBalls(pins.len()));
    }

    let mut balls = Vec::with_capacity(pins.len());
    for (index, knocked) in pins.iter().enumerate() {
        if is_complete(frame_index, &balls) {
            return Err(CorrectionError::BallAfterCompletion { ball: index });
        }
        let rack = Rack::after(&balls);
        if knocked.intersects(rack.down) {
            return Err(CorrectionError::PinsAlreadyDown { ball: index });
        }
        let ball = evaluate(rack.down.union(*knocked), &balls, symbols);
        balls.push(ball);
    }
    Ok(balls)
}

/// Checks a received team and rebuilds every ball from its pins.
///
/// Values and symbols are recomputed here; a ball whose value disagrees with
/// its pins, or a `current_frame` that disagrees with the frames, rejects the
/// whole team.
fn rebuild_team(mut bowlers: Vec<Bowler>, symbols: &SymbolTable) -> Result<Vec<Bowler>, SessionError> {
    let invalid = |name: &str, reason: String| SessionError::InvalidTeam(format!("{name}: {reason}"));

    if bowlers.is_empty() {
        return Err(SessionError::InvalidTeam("no bowlers".to_string()));
    }
    for bowler in &mut bowlers {
        if bowler.frames.len() != FRAMES_PER_GAME {
            return Err(invalid(&bowler.name, format!("{} frames", bowler.frames.len())));
        }
        if bowler.current_frame > FRAMES_PER_GAME {
            return Err(invalid(&bowler.name, "past frame 10".to_string()));
        }

        for (index, frame) in bowler.frames.iter_mut().enumerate() {
            if let Some(ball) = frame.balls.iter().find(|b| b.value != b.pins.value()) {
                let reason = format!("frame {}: ball value {} for pins {}", index + 1, ball.value, ball.pins);
                return Err(invalid(&bowler.name, reason));
            }
            let pins: Vec<PinVector> = frame.balls.iter().map(|b| b.pins).collect();
            let balls = rebuild_frame(index, &pins, symbols)
                .map_err(|e| invalid(&bowler.name, format!("frame {}: {e}", index + 1)))?;

            let consistent = match index.cmp(&bowler.current_frame) {
                Ordering::Less => is_complete(index, &balls),
                Ordering::Equal => !is_complete(index, &balls),
                Ordering::Greater => balls.is_empty(),
            };
            if !consistent {
                return Err(invalid(
                    &bowler.name,
                    format!("frame {} disagrees with current frame {}", index + 1, bowler.current_frame + 1),
                ));
            }
            frame.balls = balls;
        }
    }
    Ok(bowlers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ball::SPARE, frame::LAST_FRAME};

    fn pins(key: &str) -> PinVector {
        key.parse().unwrap()
    }

    fn resets(actions: &[SessionAction]) -> Vec<ResetDecision> {
        actions
            .iter()
            .filter_map(|a| match a {
                SessionAction::Reset(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn open_frame_takes_three_balls() {
        let mut session = GameSession::new(1, GameSetup::quick(["A"], 1)).unwrap();

        let first = session.process_ball(pins("11000")).unwrap();
        assert_eq!(
            resets(&first),
            vec![ResetDecision::KeepDown { down: pins("11000"), final_ball_next: false }]
        );

        let second = session.process_ball(pins("11110")).unwrap();
        assert!(matches!(
            second.as_slice(),
            [SessionAction::BallRecorded { ball, .. }, SessionAction::Reset(ResetDecision::KeepDown { final_ball_next: true, .. })]
                if ball.value == 8 && ball.pins == pins("00110")
        ));

        let third = session.process_ball(pins("11110")).unwrap();
        assert!(third.iter().any(|a| matches!(a, SessionAction::FrameCompleted { score: 13, .. })));
        assert_eq!(resets(&third), vec![ResetDecision::Full]);
        assert_eq!(session.bowlers()[0].current_frame, 1);
    }

    #[test]
    fn spare_completes_frame() {
        let mut session = GameSession::new(1, GameSetup::quick(["A", "B"], 1)).unwrap();
        session.process_ball(pins("00100")).unwrap();
        let actions = session.process_ball(PinVector::ALL).unwrap();

        assert!(matches!(&actions[0], SessionAction::BallRecorded { ball, .. } if ball.symbol == SPARE));
        assert!(actions.iter().any(|a| matches!(a, SessionAction::BowlerUp { bowler: 1, .. })));
        assert_eq!(session.current_bowler(), 1);
    }

    #[test]
    fn hold_refuses_balls() {
        let mut session = GameSession::new(1, GameSetup::quick(["A"], 1)).unwrap();
        assert!(session.toggle_hold());
        assert_eq!(session.process_ball(PinVector::ALL), Err(SessionError::OnHold));
        assert!(session.bowlers()[0].frames[0].balls.is_empty());
        assert!(!session.toggle_hold());
        assert!(session.process_ball(PinVector::ALL).is_ok());
    }

    #[test]
    fn empty_setup_is_rejected() {
        let setup = GameSetup::quick(Vec::<String>::new(), 1);
        assert_eq!(GameSession::new(1, setup).err(), Some(SessionError::NoBowlers));
        let setup = GameSetup::quick(["A"], 1).frames_per_turn(0);
        assert_eq!(GameSession::new(1, setup).err(), Some(SessionError::InvalidFramesPerTurn));
    }

    #[test]
    fn correction_rescores_earlier_frame() {
        let mut session = GameSession::new(1, GameSetup::quick(["A"], 1)).unwrap();
        session.process_ball(pins("00100")).unwrap();
        session.process_ball(pins("00100")).unwrap();
        session.process_ball(pins("00100")).unwrap();
        session.process_ball(pins("01110")).unwrap();

        let actions = session.apply_correction(0, 0, &[pins("00100"), pins("11011")]).unwrap();
        assert!(matches!(actions.as_slice(), [SessionAction::CorrectionApplied { frame: 0, .. }]));
        let frame = &session.bowlers()[0].frames[0];
        assert!(frame.is_spare);
        assert_eq!(frame.score, 15 + 11);
    }

    #[test]
    fn correction_validation() {
        let mut session = GameSession::new(1, GameSetup::quick(["A"], 1)).unwrap();
        session.process_ball(pins("11000")).unwrap();

        assert_eq!(
            session.apply_correction(0, 0, &[pins("11000"), pins("01000")]),
            Err(CorrectionError::PinsAlreadyDown { ball: 1 }.into())
        );
        assert_eq!(
            session.apply_correction(0, 0, &[PinVector::ALL, PinVector::EMPTY]),
            Err(CorrectionError::BallAfterCompletion { ball: 1 }.into())
        );
        assert_eq!(
            session.apply_correction(0, 0, &[PinVector::ALL]),
            Err(CorrectionError::CompletionChanged { was_complete: false, now_complete: true }.into())
        );
        assert_eq!(session.apply_correction(0, 3, &[]), Err(SessionError::InvalidFrame { bowler: 0, frame: 3 }));
        assert_eq!(session.bowlers()[0].frames[0].balls.len(), 1);
    }

    #[test]
    fn correction_on_current_frame_restores_pins() {
        let mut session = GameSession::new(1, GameSetup::quick(["A"], 1)).unwrap();
        session.process_ball(pins("11000")).unwrap();
        let actions = session.apply_correction(0, 0, &[pins("10000")]).unwrap();
        assert_eq!(resets(&actions), vec![ResetDecision::KeepDown { down: pins("10000"), final_ball_next: false }]);
    }

    #[test]
    fn paired_lanes_swap_teams() {
        let mut one = GameSession::new(1, GameSetup::league(["A"], Some(2), 1).frames_per_turn(1)).unwrap();
        let mut two = GameSession::new(2, GameSetup::league(["B"], Some(1), 1).frames_per_turn(1)).unwrap();

        let from_one = one.process_ball(PinVector::ALL).unwrap();
        let Some(SessionAction::ExportTeam(team_a)) =
            from_one.iter().find(|a| matches!(a, SessionAction::ExportTeam(_))).cloned()
        else {
            panic!("lane 1 should export: {from_one:?}");
        };
        assert_eq!(one.turn_state(), TurnState::WaitingForTeam);
        assert_eq!(one.process_ball(PinVector::ALL), Err(SessionError::NotBowling { state: TurnState::WaitingForTeam }));

        // Lane 2 is still bowling, so team A waits there.
        assert!(two.import_team(team_a).unwrap().is_empty());
        let from_two = two.process_ball(PinVector::ALL).unwrap();
        let team_b = from_two
            .iter()
            .find_map(|a| match a {
                SessionAction::ExportTeam(t) => Some(t.clone()),
                _ => None,
            })
            .unwrap();
        assert!(from_two.iter().any(|a| matches!(a, SessionAction::TeamImported { from_lane: 1 })));
        assert_eq!(two.bowlers()[0].name, "A");
        assert_eq!(two.bowlers()[0].current_frame, 1);

        let imported = one.import_team(team_b).unwrap();
        assert!(imported.iter().any(|a| matches!(a, SessionAction::BowlerUp { name, .. } if name == "B")));
        assert_eq!(one.turn_state(), TurnState::Bowling);
    }

    #[test]
    fn team_for_other_lane_is_rejected() {
        let mut one = GameSession::new(1, GameSetup::league(["A"], Some(2), 1)).unwrap();
        let team = TeamTransfer { from_lane: 2, to_lane: 3, game_number: 1, bowlers: vec![Bowler::new("B")] };
        assert_eq!(one.import_team(team), Err(SessionError::WrongLane { to_lane: 3, lane: 1 }));
    }

    fn team_of(bowler: Bowler) -> TeamTransfer {
        TeamTransfer { from_lane: 2, to_lane: 1, game_number: 1, bowlers: vec![bowler] }
    }

    #[test]
    fn team_with_values_not_matching_pins_is_rejected() {
        let mut one = GameSession::new(1, GameSetup::league(["A"], Some(2), 1)).unwrap();
        let mut bowler = Bowler::new("B");
        bowler.frames[0].balls = vec![
            Ball { pins: pins("00100"), value: 200, symbol: "HP".to_string() },
            Ball { pins: pins("01000"), value: 100, symbol: "3".to_string() },
        ];
        let before = one.snapshot();

        assert!(matches!(one.import_team(team_of(bowler)), Err(SessionError::InvalidTeam(_))));
        assert_eq!(one.snapshot(), before);
    }

    #[test]
    fn team_with_overlapping_pins_is_rejected() {
        let mut one = GameSession::new(1, GameSetup::league(["A"], Some(2), 1)).unwrap();
        let mut bowler = Bowler::new("B");
        bowler.frames[0].balls = vec![
            Ball { pins: pins("01100"), value: 8, symbol: "SL".to_string() },
            Ball { pins: pins("00100"), value: 5, symbol: "5".to_string() },
        ];
        bowler.current_frame = 0;

        assert!(matches!(one.import_team(team_of(bowler)), Err(SessionError::InvalidTeam(_))));
    }

    #[test]
    fn team_whose_current_frame_disagrees_with_balls_is_rejected() {
        let mut one = GameSession::new(1, GameSetup::league(["A"], Some(2), 1)).unwrap();

        // Frame 1 holds three balls but the bowler claims to still be in it.
        let mut complete_but_current = Bowler::new("B");
        complete_but_current.frames[0].balls = vec![
            Ball { pins: pins("00100"), value: 5, symbol: "HP".to_string() },
            Ball { pins: pins("01000"), value: 3, symbol: "3".to_string() },
            Ball { pins: pins("00010"), value: 3, symbol: "3".to_string() },
        ];
        assert!(matches!(one.import_team(team_of(complete_but_current)), Err(SessionError::InvalidTeam(_))));

        // Balls recorded beyond the current frame.
        let mut ahead = Bowler::new("B");
        ahead.frames[3].balls = vec![Ball { pins: PinVector::ALL, value: 15, symbol: "X".to_string() }];
        assert!(matches!(one.import_team(team_of(ahead)), Err(SessionError::InvalidTeam(_))));

        // A finished frame left behind as incomplete.
        let mut skipped = Bowler::new("B");
        skipped.current_frame = 1;
        assert!(matches!(one.import_team(team_of(skipped)), Err(SessionError::InvalidTeam(_))));
    }

    #[test]
    fn imported_balls_are_rescored_from_their_pins() {
        let mut one = GameSession::new(1, GameSetup::league(["A"], Some(2), 1).frames_per_turn(1)).unwrap();
        let mut bowler = Bowler::new("B");
        bowler.frames[0].balls = vec![
            Ball { pins: pins("00100"), value: 5, symbol: "?".to_string() },
            Ball { pins: pins("11011"), value: 10, symbol: "?".to_string() },
        ];
        bowler.current_frame = 1;
        bowler.total_score = 999;

        one.process_ball(PinVector::ALL).unwrap();
        assert_eq!(one.turn_state(), TurnState::WaitingForTeam);
        one.import_team(team_of(bowler)).unwrap();

        let frame = &one.bowlers()[0].frames[0];
        assert_eq!(frame.balls[0].symbol, "HP");
        assert_eq!(frame.balls[1].symbol, SPARE);
        assert!(frame.is_spare);

        // Three more balls in frame 2 stay within the frame's limit.
        one.process_ball(pins("00100")).unwrap();
        one.process_ball(pins("01100")).unwrap();
        one.process_ball(pins("01110")).unwrap();
        assert!(one.bowlers()[0].frames.iter().all(|f| f.balls.len() <= MAX_BALLS));
        assert_eq!(one.bowlers()[0].current_frame, 2);
    }

    #[test]
    fn record_adds_handicap_to_final_score() {
        let mut setup = GameSetup::quick(["A"], 1);
        setup.bowlers[0].handicap = 40;
        let mut session = GameSession::new(1, setup).unwrap();
        for _ in 0..3 {
            session.process_ball(PinVector::ALL).unwrap();
        }

        let record = session.record(1_700_000_000);
        assert_eq!(record.bowlers[0].handicap, 40);
        assert_eq!(record.bowlers[0].final_score, session.bowlers()[0].total_score);
        assert_eq!(record.bowlers[0].handicap_score, session.bowlers()[0].total_score + 40);
    }

    #[test]
    fn game_finishes_and_next_game_resets() {
        let mut session = GameSession::new(1, GameSetup::quick(["A"], 2)).unwrap();
        for _ in 0..LAST_FRAME {
            session.process_ball(PinVector::ALL).unwrap();
        }
        session.process_ball(pins("11000")).unwrap();
        let last = session.process_ball(pins("11100")).unwrap();
        assert!(last.iter().any(|a| matches!(a, SessionAction::GameFinished { game_number: 1 })));
        assert_eq!(session.turn_state(), TurnState::Finished);

        let record = session.record(1_700_000_000);
        assert_eq!(record.bowlers[0].frames.len(), FRAMES_PER_GAME);
        assert_eq!(record.bowlers[0].final_score, session.bowlers()[0].total_score);
        assert_eq!(record.bowlers[0].handicap_score, record.bowlers[0].final_score);

        let next = session.start_next_game();
        assert!(matches!(next.first(), Some(SessionAction::GameStarted { game_number: 2 })));
        assert_eq!(session.bowlers()[0].total_score, 0);
        assert_eq!(session.turn_state(), TurnState::Bowling);
    }
}
