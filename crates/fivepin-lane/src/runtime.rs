//! Lane task and handle.
//!
//! [`spawn`] moves a [`Lane`] into its own tokio task. Requests arrive over
//! an mpsc channel and run one at a time, so a ball is fully scored and the
//! pinsetter cycled before the next request is read. Events go to every
//! subscriber over a broadcast channel.

use std::time::Duration;

use fivepin_core::{Environment, GameSetup, PinVector, SessionSnapshot, TeamTransfer};
use fivepin_machine::{MachineSummary, PinHardware};
use tokio::{
    sync::{broadcast, mpsc, oneshot},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, info, warn};

use crate::{
    error::LaneError,
    event::{LaneEvent, LaneRequest},
    lane::Lane,
    storage::GameLog,
};

/// Channel sizes and tick period for a lane task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Queued requests before senders wait.
    pub request_capacity: usize,
    /// Events buffered per subscriber before the slowest one lags.
    pub event_capacity: usize,
    /// How often deferred placements are retried. `None` disables ticking.
    pub tick_interval: Option<Duration>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { request_capacity: 64, event_capacity: 256, tick_interval: Some(Duration::from_millis(250)) }
    }
}

type Reply<T> = oneshot::Sender<T>;

enum Command {
    Request { request: LaneRequest, reply: Reply<Result<Vec<LaneEvent>, LaneError>> },
    Snapshot { reply: Reply<Option<SessionSnapshot>> },
    MachineStatus { reply: Reply<MachineSummary> },
    Shutdown,
}

/// Handle to a running lane task.
///
/// Cheap to clone. Every method fails with [`LaneError::Stopped`] once the
/// task has exited.
#[derive(Clone)]
pub struct LaneHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<LaneEvent>,
}

/// Spawns `lane` on the current tokio runtime.
pub fn spawn<H, E, S>(lane: Lane<H, E, S>, config: RuntimeConfig) -> (LaneHandle, JoinHandle<()>)
where
    H: PinHardware,
    E: Environment,
    S: GameLog,
{
    let (commands, rx) = mpsc::channel(config.request_capacity);
    let (events, _) = broadcast::channel(config.event_capacity);

    let task = tokio::spawn(run(lane, rx, events.clone(), config.tick_interval));
    (LaneHandle { commands, events }, task)
}

async fn run<H, E, S>(
    mut lane: Lane<H, E, S>,
    mut commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<LaneEvent>,
    tick_interval: Option<Duration>,
) where
    H: PinHardware,
    E: Environment,
    S: GameLog,
{
    let mut ticker = tick_interval.map(|period| {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });
    info!(lane = lane.lane_id(), "lane task started");

    loop {
        let command = tokio::select! {
            command = commands.recv() => match command {
                Some(command) => command,
                None => break,
            },
            () = next_tick(ticker.as_mut()) => {
                Command::Request { request: LaneRequest::Tick, reply: oneshot::channel().0 }
            },
        };

        match command {
            Command::Request { request, reply } => {
                let name = request.name();
                let result = lane.handle(request).await;
                match &result {
                    Ok(produced) => publish(&events, produced.iter().cloned()),
                    Err(e) => {
                        debug!(lane = lane.lane_id(), request = name, error = %e, "request rejected");
                        publish(&events, [LaneEvent::Rejected { request: name.to_string(), reason: e.to_string() }]);
                    },
                }
                // Ticks and fire-and-forget callers drop the receiver.
                let _ = reply.send(result);
            },
            Command::Snapshot { reply } => {
                let _ = reply.send(lane.snapshot());
            },
            Command::MachineStatus { reply } => {
                let _ = reply.send(lane.machine_status());
            },
            Command::Shutdown => break,
        }
    }

    info!(lane = lane.lane_id(), "lane task stopped");
}

async fn next_tick(ticker: Option<&mut tokio::time::Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        },
        None => std::future::pending().await,
    }
}

fn publish(events: &broadcast::Sender<LaneEvent>, produced: impl IntoIterator<Item = LaneEvent>) {
    for event in produced {
        // No subscribers is fine; the lane keeps running headless.
        if events.send(event).is_err() {
            break;
        }
    }
}

impl LaneHandle {
    /// Receiver for every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<LaneEvent> {
        self.events.subscribe()
    }

    /// Starts a session.
    pub async fn start_game(&self, setup: GameSetup) -> Result<Vec<LaneEvent>, LaneError> {
        self.request(LaneRequest::StartGame(setup)).await
    }

    /// A ball was thrown; the lane reads its sensors.
    pub async fn ball_detected(&self) -> Result<Vec<LaneEvent>, LaneError> {
        self.request(LaneRequest::BallDetected).await
    }

    /// A ball was thrown with an externally detected reading.
    pub async fn submit_ball(&self, raw: PinVector) -> Result<Vec<LaneEvent>, LaneError> {
        self.request(LaneRequest::SubmitBall(raw)).await
    }

    /// Full reset now or at the next cycle.
    pub async fn request_manual_reset(&self, immediate: bool) -> Result<Vec<LaneEvent>, LaneError> {
        self.request(LaneRequest::ManualReset { immediate }).await
    }

    /// Cycles the pinsetter to `target`.
    pub async fn request_pin_restore(&self, target: PinVector) -> Result<Vec<LaneEvent>, LaneError> {
        self.request(LaneRequest::PinRestore(target)).await
    }

    /// Places `target` without a cycle.
    pub async fn pin_set(&self, target: PinVector) -> Result<Vec<LaneEvent>, LaneError> {
        self.request(LaneRequest::PinSet(target)).await
    }

    /// Drives every actuator to its safe level.
    pub async fn emergency_reset(&self) -> Result<Vec<LaneEvent>, LaneError> {
        self.request(LaneRequest::EmergencyReset).await
    }

    /// Rewrites one frame.
    pub async fn apply_score_correction(
        &self,
        bowler: usize,
        frame: usize,
        balls: Vec<PinVector>,
    ) -> Result<Vec<LaneEvent>, LaneError> {
        self.request(LaneRequest::ScoreCorrection { bowler, frame, balls }).await
    }

    /// Flips the hold flag.
    pub async fn toggle_hold(&self) -> Result<Vec<LaneEvent>, LaneError> {
        self.request(LaneRequest::ToggleHold).await
    }

    /// Ends the session.
    pub async fn end_game(&self, reason: impl Into<String>) -> Result<Vec<LaneEvent>, LaneError> {
        self.request(LaneRequest::EndGame { reason: reason.into() }).await
    }

    /// Delivers a team from the paired lane.
    pub async fn import_team(&self, team: TeamTransfer) -> Result<Vec<LaneEvent>, LaneError> {
        self.request(LaneRequest::ImportTeam(team)).await
    }

    /// Retries deferred placements now.
    pub async fn tick(&self) -> Result<Vec<LaneEvent>, LaneError> {
        self.request(LaneRequest::Tick).await
    }

    /// Sends any request and waits for its events.
    pub async fn request(&self, request: LaneRequest) -> Result<Vec<LaneEvent>, LaneError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Request { request, reply }).await?;
        rx.await.map_err(|_| LaneError::Stopped)?
    }

    /// Display snapshot of the session in progress.
    pub async fn snapshot(&self) -> Result<Option<SessionSnapshot>, LaneError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        rx.await.map_err(|_| LaneError::Stopped)
    }

    /// Pinsetter status.
    pub async fn machine_status(&self) -> Result<MachineSummary, LaneError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::MachineStatus { reply }).await?;
        rx.await.map_err(|_| LaneError::Stopped)
    }

    /// Stops the task after the requests already queued.
    pub async fn shutdown(&self) {
        if self.send(Command::Shutdown).await.is_err() {
            warn!("lane task already stopped");
        }
    }

    async fn send(&self, command: Command) -> Result<(), LaneError> {
        self.commands.send(command).await.map_err(|_| LaneError::Stopped)
    }
}
