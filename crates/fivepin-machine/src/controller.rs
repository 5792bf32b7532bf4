//! Machine cycle controller.
//!
//! Owns the pinsetter: reset pulses, the wait for the mechanism-ready
//! signal, and actuator pulses that knock pins down to match a target
//! layout. The scoring side never drives hardware; it hands the controller a
//! [`ResetDecision`] and the controller carries it out.
//!
//! # Cycle
//!
//! ```text
//!   Idle ──reset pulse──> ResetPulseSent ──> WaitingForReady ──> PlacingPins ──> Idle
//!                                                │
//!                              timeout / errors  │  suspended
//!                                                ▼
//!                                   force-apply control state
//! ```
//!
//! # Safety levels
//!
//! High is the resting level of every actuator. Placement drives all five
//! lines high first, pulses the lines of pins that should be down, and
//! returns them high. If any write fails the controller issues an emergency
//! all-high before reporting the error, so a failure never leaves an
//! actuator energised.

use std::time::Duration;

use fivepin_core::{Environment, Pin, PinVector, ResetDecision};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    error::HardwareError,
    hardware::{Level, OutputLine, PinHardware, SensorId},
    tracker::{PinCheck, PinStateTracker, TrackerConfig},
};

/// Default reset pulse width.
pub const DEFAULT_RESET_PULSE: Duration = Duration::from_millis(50);

/// Default limit on the ready wait.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(8);

/// Default ready sensor poll interval.
pub const DEFAULT_READY_POLL: Duration = Duration::from_millis(10);

/// Default number of ready read errors tolerated.
pub const DEFAULT_READY_MAX_ERRORS: u32 = 10;

/// Default knock-down pulse width.
pub const DEFAULT_KNOCK_PULSE: Duration = Duration::from_millis(250);

/// Default pin-setting cool-down before a frame's last ball.
pub const DEFAULT_FINAL_BALL_SUSPENSION: Duration = Duration::from_secs(8);

/// Pinsetter timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineConfig {
    /// Reset pulse width.
    pub reset_pulse: Duration,
    /// Limit on the ready wait.
    pub ready_timeout: Duration,
    /// Ready sensor poll interval.
    pub ready_poll: Duration,
    /// Ready read errors tolerated before giving up.
    pub ready_max_errors: u32,
    /// Voltage at or above which the ready sensor is asserted.
    pub ready_threshold: f32,
    /// Knock-down pulse width.
    pub knock_pulse: Duration,
    /// Pin-setting cool-down before a frame's last ball.
    pub final_ball_suspension: Duration,
    /// Write attempts per line during an emergency all-high.
    pub emergency_attempts: u32,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            reset_pulse: DEFAULT_RESET_PULSE,
            ready_timeout: DEFAULT_READY_TIMEOUT,
            ready_poll: DEFAULT_READY_POLL,
            ready_max_errors: DEFAULT_READY_MAX_ERRORS,
            ready_threshold: 4.0,
            knock_pulse: DEFAULT_KNOCK_PULSE,
            final_ball_suspension: DEFAULT_FINAL_BALL_SUSPENSION,
            emergency_attempts: 3,
        }
    }
}

/// Where the controller is in a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    /// No cycle running.
    Idle,
    /// Reset pulse issued.
    ResetPulseSent,
    /// Polling the ready sensor.
    WaitingForReady,
    /// Driving actuators.
    PlacingPins,
}

/// How the ready wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReadyOutcome {
    /// Sensor asserted.
    Ready {
        /// Time spent waiting.
        elapsed: Duration,
    },
    /// Pin setting is suspended; no wait performed.
    Skipped,
    /// Sensor never asserted.
    TimedOut {
        /// Time spent waiting.
        elapsed: Duration,
    },
    /// Too many read errors.
    SensorFailed {
        /// Errors seen.
        errors: u32,
    },
}

impl ReadyOutcome {
    /// Whether the controller fell back instead of seeing the signal.
    pub fn is_fallback(self) -> bool {
        matches!(self, Self::TimedOut { .. } | Self::SensorFailed { .. })
    }
}

/// What happened to a placement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "placement", content = "pins", rename_all = "snake_case")]
pub enum Placement {
    /// Actuators driven to the layout.
    Applied(PinVector),
    /// Held until pin setting resumes.
    Deferred(PinVector),
}

/// Result of executing a reset decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleReport {
    /// Full rack set.
    FullReset,
    /// Nothing changed, no cycle run.
    Skipped,
    /// Reset, ready wait and placement ran.
    Cycled {
        /// Ready wait outcome.
        ready: ReadyOutcome,
        /// Placement outcome.
        placement: Placement,
    },
}

/// Pinsetter state owned by the controller.
#[derive(Debug, Clone, Copy)]
pub struct MachineState<I> {
    /// Control state: pins the controller believes are down.
    pub pins_down: PinVector,
    /// Next cycle must be a full reset.
    pub pending_full_reset: bool,
    /// When the last reset pulse started.
    pub cycle_started_at: Option<I>,
    /// Pin setting suspended until this instant.
    pub suspended_until: Option<I>,
    /// Placement held during suspension.
    pub deferred: Option<PinVector>,
    /// Cycle phase.
    pub cycle: CycleState,
}

/// Serializable machine status for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineSummary {
    /// Pins the controller believes are down.
    pub pins_down: PinVector,
    /// Next cycle is a full reset.
    pub pending_full_reset: bool,
    /// Pin setting is suspended.
    pub pin_setting_suspended: bool,
    /// Placement waiting for the suspension to end.
    pub deferred_placement: Option<PinVector>,
    /// Cycle phase.
    pub cycle: CycleState,
}

/// Drives one lane's pinsetter.
pub struct MachineController<H, E: Environment> {
    hardware: H,
    env: E,
    tracker: PinStateTracker<H, E>,
    config: MachineConfig,
    state: MachineState<E::Instant>,
}

impl<H: PinHardware, E: Environment> MachineController<H, E> {
    /// Creates a controller; the control state starts with every pin up.
    pub fn new(hardware: H, env: E, config: MachineConfig, tracker: TrackerConfig) -> Self {
        Self {
            tracker: PinStateTracker::new(hardware.clone(), env.clone(), tracker),
            hardware,
            env,
            config,
            state: MachineState {
                pins_down: PinVector::EMPTY,
                pending_full_reset: false,
                cycle_started_at: None,
                suspended_until: None,
                deferred: None,
                cycle: CycleState::Idle,
            },
        }
    }

    /// Current state.
    pub fn state(&self) -> &MachineState<E::Instant> {
        &self.state
    }

    /// Pins the controller believes are down.
    pub fn pins_down(&self) -> PinVector {
        self.state.pins_down
    }

    /// Whether pin setting is in its cool-down.
    pub fn is_suspended(&self) -> bool {
        self.state.suspended_until.is_some_and(|until| self.env.now() < until)
    }

    /// Serializable status.
    pub fn summary(&self) -> MachineSummary {
        MachineSummary {
            pins_down: self.state.pins_down,
            pending_full_reset: self.state.pending_full_reset,
            pin_setting_suspended: self.is_suspended(),
            deferred_placement: self.state.deferred,
            cycle: self.state.cycle,
        }
    }

    /// Runs the pin tracker against the control state and adopts its result.
    pub async fn check_pins(&mut self) -> PinCheck {
        let check = self.tracker.check_pins(self.state.pins_down).await;
        self.state.pins_down = check.pins_down;
        debug!(pins = %check.pins_down, status = ?check.status, "pin check finished");
        check
    }

    /// Merges a reading that arrived without a sensor check.
    pub fn record_reading(&mut self, raw: PinVector) {
        self.state.pins_down = self.state.pins_down.union(raw);
    }

    /// Sends the reset pulse.
    ///
    /// When the next ball is the frame's last, pin setting is suspended for
    /// the configured cool-down.
    pub async fn reset(&mut self, final_ball_next: bool) -> Result<(), HardwareError> {
        let now = self.env.now();
        self.state.cycle = CycleState::ResetPulseSent;
        self.state.cycle_started_at = Some(now);

        let result = self.pulse(&[OutputLine::Reset], self.config.reset_pulse).await;

        if final_ball_next {
            self.state.suspended_until = Some(now + self.config.final_ball_suspension);
            info!(cooldown = ?self.config.final_ball_suspension, "pin setting suspended before final ball");
        }

        if let Err(e) = &result {
            error!(error = %e, "reset pulse failed");
            self.state.cycle = CycleState::Idle;
        }
        result
    }

    /// Polls the ready sensor until it asserts, times out or errors out.
    pub async fn wait_for_ready(&mut self) -> ReadyOutcome {
        if self.is_suspended() {
            info!("pin setting suspended, skipping ready wait");
            return ReadyOutcome::Skipped;
        }

        self.state.cycle = CycleState::WaitingForReady;
        let start = self.env.now();
        let mut errors = 0u32;

        loop {
            match self.hardware.read_voltage(SensorId::Ready) {
                Ok(volts) if volts >= self.config.ready_threshold => {
                    let elapsed = self.env.now() - start;
                    debug!(?elapsed, "pinsetter ready");
                    return ReadyOutcome::Ready { elapsed };
                },
                Ok(_) => {},
                Err(e) => {
                    errors += 1;
                    warn!(error = %e, errors, "ready sensor read failed");
                    if errors > self.config.ready_max_errors {
                        warn!(errors, "too many ready sensor errors, falling back");
                        return ReadyOutcome::SensorFailed { errors };
                    }
                },
            }

            let elapsed = self.env.now() - start;
            if elapsed >= self.config.ready_timeout {
                warn!(?elapsed, "ready signal timed out, falling back");
                return ReadyOutcome::TimedOut { elapsed };
            }
            self.env.sleep(self.config.ready_poll).await;
        }
    }

    /// Drives the actuators so exactly `target` is down.
    ///
    /// Deferred while pin setting is suspended.
    pub async fn apply_configuration(&mut self, target: PinVector) -> Result<Placement, HardwareError> {
        if self.is_suspended() {
            info!(%target, "pin setting suspended, deferring placement");
            self.state.deferred = Some(target);
            self.state.cycle = CycleState::Idle;
            return Ok(Placement::Deferred(target));
        }
        self.place(target).await.map(|()| Placement::Applied(target))
    }

    /// Resets to a full rack without waiting for the ready signal.
    ///
    /// A failed pulse leaves any scheduled reset pending.
    pub async fn full_reset(&mut self) -> Result<(), HardwareError> {
        info!("full reset");
        self.reset(false).await?;

        self.state.pending_full_reset = false;
        self.state.deferred = None;
        self.state.suspended_until = None;
        self.state.pins_down = PinVector::EMPTY;
        self.all_high()?;
        self.state.cycle = CycleState::Idle;
        Ok(())
    }

    /// Reset, wait for ready, then place `target`.
    ///
    /// A pending full reset takes precedence. If the ready signal never
    /// comes, the target is applied anyway.
    pub async fn machine_cycle(
        &mut self,
        target: PinVector,
        final_ball_next: bool,
    ) -> Result<CycleReport, HardwareError> {
        if self.state.pending_full_reset {
            self.full_reset().await?;
            return Ok(CycleReport::FullReset);
        }

        self.reset(final_ball_next).await?;
        let ready = self.wait_for_ready().await;
        if ready.is_fallback() {
            warn!(%target, ?ready, "restoring last known pins without ready signal");
        }
        let placement = self.apply_configuration(target).await?;
        Ok(CycleReport::Cycled { ready, placement })
    }

    /// Adopts `target` as the control state and cycles to it.
    pub async fn pin_restore(&mut self, target: PinVector) -> Result<CycleReport, HardwareError> {
        info!(%target, "pin restore");
        self.state.pins_down = target;
        self.machine_cycle(target, false).await
    }

    /// Places `target` directly, ignoring the cycle and any suspension.
    pub async fn pin_set(&mut self, target: PinVector) -> Result<Placement, HardwareError> {
        info!(%target, "direct pin set");
        self.state.deferred = None;
        self.place(target).await.map(|()| Placement::Applied(target))
    }

    /// Full reset now, or at the start of the next cycle.
    pub async fn schedule_reset(&mut self, immediate: bool) -> Result<Option<CycleReport>, HardwareError> {
        if immediate {
            self.full_reset().await?;
            return Ok(Some(CycleReport::FullReset));
        }
        info!("full reset scheduled for next cycle");
        self.state.pending_full_reset = true;
        Ok(None)
    }

    /// Drives every actuator to its safe level and forgets the control state.
    pub async fn emergency_pin_reset(&mut self) -> Result<(), HardwareError> {
        warn!("emergency pin reset");
        self.state.deferred = None;
        self.state.pins_down = PinVector::EMPTY;
        self.state.cycle = CycleState::Idle;
        self.all_high()
    }

    /// Carries out the scoring engine's decision for the ball just scored.
    ///
    /// `changed` is whether the ball knocked anything down; an unchanged
    /// rack needs no cycle.
    pub async fn process_throw(
        &mut self,
        decision: ResetDecision,
        changed: bool,
    ) -> Result<CycleReport, HardwareError> {
        match decision {
            ResetDecision::Full => {
                self.full_reset().await?;
                Ok(CycleReport::FullReset)
            },
            ResetDecision::KeepDown { .. } if self.state.pending_full_reset => {
                self.full_reset().await?;
                Ok(CycleReport::FullReset)
            },
            ResetDecision::KeepDown { .. } if !changed => Ok(CycleReport::Skipped),
            ResetDecision::KeepDown { down, final_ball_next } => {
                self.state.pins_down = down;
                self.machine_cycle(down, final_ball_next).await
            },
        }
    }

    /// Applies a deferred placement once the suspension has ended.
    pub async fn tick(&mut self) -> Result<Option<Placement>, HardwareError> {
        if self.is_suspended() {
            return Ok(None);
        }
        self.state.suspended_until = None;
        match self.state.deferred.take() {
            Some(target) => {
                debug!(%target, "applying deferred placement");
                self.place(target).await.map(|()| Some(Placement::Applied(target)))
            },
            None => Ok(None),
        }
    }

    /// Baseline all-high, knock-down pulse, emergency all-high on failure.
    async fn place(&mut self, target: PinVector) -> Result<(), HardwareError> {
        self.state.cycle = CycleState::PlacingPins;

        let result = self.drive(target).await;
        self.state.cycle = CycleState::Idle;

        match result {
            Ok(()) => {
                self.state.pins_down = target;
                debug!(%target, "pins placed");
                Ok(())
            },
            Err(e) => {
                error!(error = %e, %target, "pin placement failed, forcing all actuators high");
                // Placement error takes precedence over a failed restore.
                let _ = self.all_high();
                Err(e)
            },
        }
    }

    async fn drive(&mut self, target: PinVector) -> Result<(), HardwareError> {
        for pin in Pin::ALL {
            self.hardware.set_output(OutputLine::Pin(pin), Level::High)?;
        }
        let lines: Vec<OutputLine> = target.pins().map(OutputLine::Pin).collect();
        if lines.is_empty() {
            return Ok(());
        }
        self.pulse(&lines, self.config.knock_pulse).await
    }

    /// Drives `lines` low for `width`, then high.
    async fn pulse(&self, lines: &[OutputLine], width: Duration) -> Result<(), HardwareError> {
        for line in lines {
            if let Err(e) = self.hardware.set_output(*line, Level::Low) {
                self.restore_high(lines);
                return Err(e);
            }
        }
        self.env.sleep(width).await;

        let mut first_error = None;
        for line in lines {
            if let Err(e) = self.hardware.set_output(*line, Level::High)
                && first_error.is_none()
            {
                first_error = Some(e);
            }
        }
        match first_error {
            None => Ok(()),
            Some(e) => {
                self.restore_high(lines);
                Err(e)
            },
        }
    }

    fn all_high(&self) -> Result<(), HardwareError> {
        let lines: Vec<OutputLine> = Pin::ALL.into_iter().map(OutputLine::Pin).collect();
        match self.restore_high(&lines) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Writes high to each line with bounded retries; returns the last
    /// error for any line that stayed unconfirmed.
    fn restore_high(&self, lines: &[OutputLine]) -> Option<HardwareError> {
        let mut failure = None;
        for line in lines {
            let mut last = None;
            for _ in 0..self.config.emergency_attempts.max(1) {
                match self.hardware.set_output(*line, Level::High) {
                    Ok(()) => {
                        last = None;
                        break;
                    },
                    Err(e) => last = Some(e),
                }
            }
            if let Some(e) = last {
                error!(?line, error = %e, "could not return line to safe level");
                failure = Some(e);
            }
        }
        failure
    }
}
