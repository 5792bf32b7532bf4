//! Lane driver.
//!
//! Single owner of a lane's session, pinsetter controller and game log. Each
//! request runs to completion before the next one is read:
//!
//! ```text
//! BallDetected ─> tracker ─> evaluator ─> scoring ─> turns ─> pinsetter
//!                                            │
//!                                            └─> events
//! ```
//!
//! The session decides *what* happens and returns actions; the driver walks
//! the actions in order, carries out resets on the controller, writes
//! records to the log and turns everything into [`LaneEvent`]s.
//!
//! Once scoring has accepted a ball, a pinsetter failure no longer fails the
//! request: the score stands and the failure is reported as
//! [`LaneEvent::MachineFault`]. The controller has already driven the
//! actuators safe before returning the error.

use fivepin_core::{
    Environment, GameSession, GameSetup, LaneId, PinVector, ResetDecision, SessionAction, SessionError,
    SessionSnapshot, TeamTransfer, TurnState,
};
use fivepin_machine::{CycleReport, MachineController, MachineSummary, PinHardware, PinStatus};
use tracing::{debug, error, info, warn};

use crate::{
    config::LaneConfig,
    error::LaneError,
    event::{LaneEvent, LaneRequest},
    storage::GameLog,
};

/// One session plus what the lane needs to decide whether to continue it.
struct ActiveSession<I> {
    game: GameSession,
    started_at: I,
    games_played: u32,
}

/// Lane driver. See the module docs.
pub struct Lane<H, E: Environment, S> {
    id: LaneId,
    env: E,
    machine: MachineController<H, E>,
    log: S,
    session: Option<ActiveSession<E::Instant>>,
}

impl<H: PinHardware, E: Environment, S: GameLog> Lane<H, E, S> {
    /// Builds a lane from its settings.
    pub fn new(config: &LaneConfig, hardware: H, env: E, log: S) -> Self {
        let machine = MachineController::new(hardware, env.clone(), config.machine_config(), config.tracker_config());
        Self { id: config.lane_id, env, machine, log, session: None }
    }

    /// Lane identifier.
    pub fn lane_id(&self) -> LaneId {
        self.id
    }

    /// Environment the lane runs on.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Game log.
    pub fn log(&self) -> &S {
        &self.log
    }

    /// Session in progress, if any.
    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref().map(|s| &s.game)
    }

    /// Display snapshot of the session in progress.
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.session().map(GameSession::snapshot)
    }

    /// Pinsetter status.
    pub fn machine_status(&self) -> MachineSummary {
        self.machine.summary()
    }

    /// Handles one request.
    ///
    /// On `Err` the session is unchanged.
    pub async fn handle(&mut self, request: LaneRequest) -> Result<Vec<LaneEvent>, LaneError> {
        debug!(lane = self.id, request = request.name(), "handling request");
        match request {
            LaneRequest::StartGame(setup) => self.start_game(setup).await,
            LaneRequest::BallDetected => self.ball_detected().await,
            LaneRequest::SubmitBall(raw) => self.submit_ball(raw).await,
            LaneRequest::ManualReset { immediate } => self.manual_reset(immediate).await,
            LaneRequest::PinRestore(target) => {
                let report = self.machine.pin_restore(target).await?;
                Ok(cycle_events(report))
            },
            LaneRequest::PinSet(target) => {
                let placement = self.machine.pin_set(target).await?;
                Ok(vec![LaneEvent::PinsPlaced { placement }])
            },
            LaneRequest::EmergencyReset => {
                self.machine.emergency_pin_reset().await?;
                Ok(vec![LaneEvent::EmergencyReset])
            },
            LaneRequest::ScoreCorrection { bowler, frame, balls } => {
                let actions = self.active()?.apply_correction(bowler, frame, &balls)?;
                Ok(self.apply_actions(actions, true).await)
            },
            LaneRequest::ToggleHold => {
                let hold = self.active()?.toggle_hold();
                Ok(vec![LaneEvent::HoldChanged { hold }])
            },
            LaneRequest::EndGame { reason } => Ok(self.end_game(reason).await),
            LaneRequest::ImportTeam(team) => self.import_team(team).await,
            LaneRequest::Tick => Ok(self.tick().await),
        }
    }

    async fn start_game(&mut self, setup: GameSetup) -> Result<Vec<LaneEvent>, LaneError> {
        let game = GameSession::new(self.id, setup)?;
        if self.session.is_some() {
            warn!(lane = self.id, "starting a new session over the one in progress");
        }
        info!(lane = self.id, kind = game.kind().label(), bowlers = game.bowlers().len(), "session started");

        let actions = game.start_actions();
        self.session = Some(ActiveSession { game, started_at: self.env.now(), games_played: 0 });
        Ok(self.apply_actions(actions, true).await)
    }

    async fn ball_detected(&mut self) -> Result<Vec<LaneEvent>, LaneError> {
        self.ensure_accepting()?;

        let check = self.machine.check_pins().await;
        if check.failed_reads > 0 {
            warn!(lane = self.id, failed_reads = check.failed_reads, "pin check skipped failed reads");
        }
        let changed = check.status != PinStatus::NoChange;
        let mut events =
            vec![LaneEvent::PinsChecked { delta: check.delta, pins_down: check.pins_down, status: check.status }];
        events.extend(self.score(check.pins_down, changed).await?);
        Ok(events)
    }

    async fn submit_ball(&mut self, raw: PinVector) -> Result<Vec<LaneEvent>, LaneError> {
        self.ensure_accepting()?;

        let prior = self.machine.pins_down();
        let changed = !raw.without(prior).is_empty();
        self.machine.record_reading(raw);
        self.score(raw, changed).await
    }

    async fn score(&mut self, raw: PinVector, changed: bool) -> Result<Vec<LaneEvent>, LaneError> {
        let actions = self.active()?.process_ball(raw)?;
        Ok(self.apply_actions(actions, changed).await)
    }

    async fn manual_reset(&mut self, immediate: bool) -> Result<Vec<LaneEvent>, LaneError> {
        match self.machine.schedule_reset(immediate).await? {
            Some(report) => Ok(cycle_events(report)),
            None => Ok(vec![LaneEvent::ResetScheduled]),
        }
    }

    /// Drops the session and clears the deck for whoever bowls next.
    async fn end_game(&mut self, reason: String) -> Vec<LaneEvent> {
        let Some(active) = self.session.take() else {
            return Vec::new();
        };
        info!(lane = self.id, game = active.game.game_number(), %reason, "session ended");

        let mut events = match self.machine.full_reset().await {
            Ok(()) => vec![LaneEvent::PinsReset],
            Err(e) => {
                error!(lane = self.id, error = %e, "end of session reset failed");
                vec![LaneEvent::MachineFault { error: e.to_string() }]
            },
        };
        events.push(LaneEvent::SessionFinished { reason });
        events
    }

    async fn import_team(&mut self, team: TeamTransfer) -> Result<Vec<LaneEvent>, LaneError> {
        let actions = self.active()?.import_team(team)?;
        if actions.is_empty() {
            debug!(lane = self.id, "team queued until hand-off");
        }
        Ok(self.apply_actions(actions, true).await)
    }

    async fn tick(&mut self) -> Vec<LaneEvent> {
        match self.machine.tick().await {
            Ok(Some(placement)) => vec![LaneEvent::PinsPlaced { placement }],
            Ok(None) => Vec::new(),
            Err(e) => {
                error!(lane = self.id, error = %e, "deferred placement failed");
                vec![LaneEvent::MachineFault { error: e.to_string() }]
            },
        }
    }

    /// Refuses balls before any sensor is read, so a rejected ball costs no
    /// observation window.
    fn ensure_accepting(&self) -> Result<(), LaneError> {
        let game = &self.session.as_ref().ok_or(LaneError::NoSession)?.game;
        if game.hold_active() {
            return Err(SessionError::OnHold.into());
        }
        if game.turn_state() != TurnState::Bowling {
            return Err(SessionError::NotBowling { state: game.turn_state() }.into());
        }
        Ok(())
    }

    fn active(&mut self) -> Result<&mut GameSession, LaneError> {
        self.session.as_mut().map(|s| &mut s.game).ok_or(LaneError::NoSession)
    }

    /// Carries out session actions in order.
    ///
    /// Starting the next game produces more actions; they are processed in
    /// the same pass.
    async fn apply_actions(&mut self, initial: Vec<SessionAction>, changed: bool) -> Vec<LaneEvent> {
        let mut events = Vec::new();
        let mut pending_actions = initial;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    SessionAction::BallRecorded { bowler, frame, ball } => {
                        events.push(LaneEvent::BallRecorded { bowler, frame, ball });
                    },
                    SessionAction::FrameCompleted { bowler, frame, score, cumulative_total } => {
                        events.push(LaneEvent::FrameCompleted { bowler, frame, score, cumulative_total });
                    },
                    SessionAction::Reset(decision) => events.extend(self.reset(decision, changed).await),
                    SessionAction::BowlerUp { bowler, name } => events.push(LaneEvent::BowlerUp { bowler, name }),
                    SessionAction::ExportTeam(team) => events.push(LaneEvent::TeamExported { team }),
                    SessionAction::TeamImported { from_lane } => events.push(LaneEvent::TeamImported { from_lane }),
                    SessionAction::CorrectionApplied { bowler, frame, total_score } => {
                        events.push(LaneEvent::CorrectionApplied { bowler, frame, total_score });
                    },
                    SessionAction::GameStarted { game_number } => {
                        let kind = self.session().map(|g| g.kind().label().to_string()).unwrap_or_default();
                        events.push(LaneEvent::GameStarted { game_number, kind });
                    },
                    SessionAction::GameFinished { .. } => {
                        let (finished, next) = self.finish_game();
                        events.extend(finished);
                        pending_actions.extend(next);
                    },
                }
            }
        }
        events
    }

    async fn reset(&mut self, decision: ResetDecision, changed: bool) -> Vec<LaneEvent> {
        match self.machine.process_throw(decision, changed).await {
            Ok(report) => cycle_events(report),
            Err(e) => {
                error!(lane = self.id, error = %e, ?decision, "pinsetter cycle failed");
                vec![LaneEvent::MachineFault { error: e.to_string() }]
            },
        }
    }

    /// Records the finished game and starts the next one if the limit allows.
    fn finish_game(&mut self) -> (Vec<LaneEvent>, Vec<SessionAction>) {
        let now = self.env.now();
        let finished_at = self.env.wall_clock_secs();
        let Some(active) = self.session.as_mut() else {
            return (Vec::new(), Vec::new());
        };

        active.games_played += 1;
        let record = active.game.record(finished_at);
        let mut events = Vec::new();

        if active.game.kind().records_games() {
            match self.log.append(&record) {
                Ok(()) => info!(lane = self.id, game = record.game_number, "game recorded"),
                Err(e) => {
                    error!(lane = self.id, error = %e, "game log append failed");
                    events.push(LaneEvent::StorageFault { error: e.to_string() });
                },
            }
        }
        events.push(LaneEvent::GameFinished { record });

        let limit = active.game.kind().limit();
        if limit.allows_next(active.games_played, now - active.started_at) {
            let next = active.game.start_next_game();
            return (events, next);
        }

        info!(lane = self.id, games = active.games_played, "session limit reached");
        self.session = None;
        events.push(LaneEvent::SessionFinished { reason: "limit reached".to_string() });
        (events, Vec::new())
    }
}

fn cycle_events(report: CycleReport) -> Vec<LaneEvent> {
    match report {
        CycleReport::FullReset => vec![LaneEvent::PinsReset],
        CycleReport::Skipped => Vec::new(),
        CycleReport::Cycled { ready, placement } => {
            let mut events = Vec::new();
            if ready.is_fallback() {
                events.push(LaneEvent::ReadyFallback { outcome: ready });
            }
            events.push(LaneEvent::PinsRestored { placement });
            events
        },
    }
}
