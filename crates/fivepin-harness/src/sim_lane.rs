//! Simulated lane: session, controller and in-memory pinsetter on a virtual
//! clock.
//!
//! [`SimLane`] bowls a ball the way a lane does (knock pins on the simulated
//! hardware, read the sensors, score, carry out the reset decision) without
//! a runtime or a game log, so tests can step through whole games and check
//! invariants between balls.

use fivepin_core::{GameSession, GameSetup, LaneId, PinVector, SessionAction, SessionError};
use fivepin_machine::{
    HardwareError, MachineConfig, MachineController, MemoryHardware, PinHardware, PinStatus, TrackerConfig,
};
use thiserror::Error;
use tracing::debug;

use crate::{
    invariants::{LaneSnapshot, ScoreHistory, SystemSnapshot},
    sim_env::SimEnv,
};

/// Builder for [`SimLane`].
pub struct SimLaneBuilder {
    lane_id: LaneId,
    setup: GameSetup,
    machine: MachineConfig,
    tracker: TrackerConfig,
    memory: MemoryHardware,
    env: SimEnv,
}

impl SimLaneBuilder {
    /// Lane identifier (default 1).
    #[must_use]
    pub fn lane_id(mut self, lane_id: LaneId) -> Self {
        self.lane_id = lane_id;
        self
    }

    /// Controller timings.
    #[must_use]
    pub fn machine_config(mut self, config: MachineConfig) -> Self {
        self.machine = config;
        self
    }

    /// Tracker timings.
    #[must_use]
    pub fn tracker_config(mut self, config: TrackerConfig) -> Self {
        self.tracker = config;
        self
    }

    /// Simulated pinsetter to use; clones share its state.
    #[must_use]
    pub fn memory(mut self, memory: MemoryHardware) -> Self {
        self.memory = memory;
        self
    }

    /// Clock to use; clones share its time.
    #[must_use]
    pub fn env(mut self, env: SimEnv) -> Self {
        self.env = env;
        self
    }

    /// Lane driving the simulated pinsetter directly.
    pub fn build(self) -> Result<SimLane<MemoryHardware>, SessionError> {
        let hardware = self.memory.clone();
        self.build_with(hardware)
    }

    /// Lane driving `hardware`, typically a wrapper around the simulated
    /// pinsetter such as `ChaoticHardware`.
    pub fn build_with<H: PinHardware>(self, hardware: H) -> Result<SimLane<H>, SessionError> {
        let session = GameSession::new(self.lane_id, self.setup)?;
        let machine = MachineController::new(hardware, self.env.clone(), self.machine, self.tracker);
        Ok(SimLane {
            session,
            machine,
            memory: self.memory,
            env: self.env,
            history: ScoreHistory::new(),
            suspension: self.machine.final_ball_suspension,
        })
    }
}

/// A lane with nothing real attached.
pub struct SimLane<H: PinHardware> {
    /// The session being bowled.
    pub session: GameSession,
    /// Pinsetter controller.
    pub machine: MachineController<H, SimEnv>,
    /// The simulated pinsetter underneath any wrapper.
    pub memory: MemoryHardware,
    /// Virtual clock shared with the controller.
    pub env: SimEnv,
    /// Totals seen after each ball.
    pub history: ScoreHistory,
    suspension: std::time::Duration,
}

impl SimLane<MemoryHardware> {
    /// Builder for a lane bowling `setup`.
    pub fn builder(setup: GameSetup) -> SimLaneBuilder {
        SimLaneBuilder {
            lane_id: 1,
            setup,
            machine: MachineConfig::default(),
            tracker: TrackerConfig::default(),
            memory: MemoryHardware::new(),
            env: SimEnv::new(),
        }
    }
}

impl<H: PinHardware> SimLane<H> {
    /// Knocks `knock` on the simulated pinsetter, reads the sensors, scores
    /// the reading and carries out the reset decision.
    ///
    /// Waits out any pin-setting suspension first so the rack matches the
    /// session. Pinsetter failures are returned after scoring; the ball stays
    /// scored.
    pub async fn bowl(&mut self, knock: PinVector) -> Result<Vec<SessionAction>, BowlError> {
        self.settle().await?;
        self.memory.knock_down(knock);

        let check = self.machine.check_pins().await;
        let actions = self.session.process_ball(check.pins_down)?;
        let changed = check.status != PinStatus::NoChange;
        debug!(knock = %knock, read = %check.pins_down, status = ?check.status, "simulated ball");

        let mut failure = None;
        for action in &actions {
            if let SessionAction::Reset(decision) = action {
                if let Err(e) = self.machine.process_throw(*decision, changed).await {
                    failure = Some(e);
                }
            }
        }
        self.history.observe(&self.session);

        match failure {
            Some(e) => Err(BowlError::Hardware { error: e, actions }),
            None => Ok(actions),
        }
    }

    /// Advances past any suspension and applies deferred placements.
    pub async fn settle(&mut self) -> Result<(), HardwareError> {
        if self.machine.is_suspended() {
            self.env.advance(self.suspension);
        }
        self.machine.tick().await.map(|_| ())
    }

    /// Invariant snapshot of this lane.
    pub fn snapshot(&self) -> SystemSnapshot {
        let lane = LaneSnapshot::from_session(&self.session)
            .with_history(&self.history)
            .with_machine(self.machine.summary())
            .with_lines_high(self.memory.all_lines_high());
        SystemSnapshot::single(lane)
    }
}

/// Why a simulated ball did not complete cleanly.
#[derive(Error, Debug)]
pub enum BowlError {
    /// The session refused the ball; nothing changed.
    #[error("ball refused: {0}")]
    Session(#[from] SessionError),
    /// The ball was scored but the pinsetter failed.
    #[error("pinsetter failed after scoring: {error}")]
    Hardware {
        /// The failure.
        error: HardwareError,
        /// What the session did with the ball.
        actions: Vec<SessionAction>,
    },
}

impl From<HardwareError> for BowlError {
    fn from(error: HardwareError) -> Self {
        BowlError::Hardware { error, actions: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use fivepin_core::TurnState;

    use super::*;

    #[tokio::test]
    async fn open_frame_leaves_knocked_pins_down() {
        let mut lane = SimLane::builder(GameSetup::quick(["A"], 1)).build().unwrap();

        lane.bowl(PinVector::from_mask(0b0_0011)).await.unwrap();

        assert_eq!(lane.memory.pins_down(), PinVector::from_mask(0b0_0011));
        assert_eq!(lane.session.turn_state(), TurnState::Bowling);
        assert!(lane.env.elapsed() >= TrackerConfig::default().early_exit_after);
    }

    #[tokio::test]
    async fn held_session_refuses_simulated_ball() {
        let mut lane = SimLane::builder(GameSetup::quick(["A"], 1)).lane_id(4).build().unwrap();
        lane.session.toggle_hold();

        let err = lane.bowl(PinVector::ALL).await.unwrap_err();

        assert!(matches!(err, BowlError::Session(SessionError::OnHold)));
        assert_eq!(lane.snapshot().lanes[0].lane_id, 4);
    }
}
