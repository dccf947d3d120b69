//! Phase controller for the pomodoro clock.
//!
//! This module provides the timer state machine:
//! - Phase transitions (Pomodoro → Break → Pomodoro / None)
//! - Overtime when manual-break mode is on
//! - Pause/resume with deadline shifting
//! - Long-break cycle counting and session expiry
//! - Tracking, sound, notification and hook dispatch on each transition
//!
//! The controller never schedules itself. The host loop calls
//! [`PhaseController::tick`] once per second while the [`TickTrigger`] is
//! armed.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ConfigSource};
use crate::dispatch::{Cue, Dispatcher};
use crate::hooks::{HookContext, HookKind, Hooks};
use crate::tracking::{TrackingBackend, TrackingError};
use crate::types::{Phase, PomodoroConfig, TaskRef, TimerState};

use super::clock::Clock;
use super::status;
use super::trigger::TickTrigger;

/// Set while a controller exists in this process.
static CONTROLLER_ALIVE: AtomicBool = AtomicBool::new(false);

// ============================================================================
// TimerError
// ============================================================================

/// Errors returned by controller operations.
#[derive(Debug, Error)]
pub enum TimerError {
    /// Another controller is alive in this process.
    #[error("A pomodoro clock is already running")]
    AlreadyRunning,

    /// The operation needs an active phase.
    #[error("No pomodoro is running")]
    NotRunning,

    /// The configuration could not be loaded or is out of range.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    /// The time tracker refused to start tracking.
    #[error(transparent)]
    Tracking(#[from] TrackingError),
}

impl TimerError {
    /// Returns true if this error is caused by the configuration.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::AlreadyRunning => "Stop the other daemon before starting a new one",
            Self::NotRunning => "Start a pomodoro with 'pomodoro-clock invoke'",
            Self::InvalidConfig(e) => e.suggestion(),
            Self::Tracking(e) => e.suggestion(),
        }
    }
}

// ============================================================================
// Confirmation
// ============================================================================

/// Questions the controller may ask before acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// The last session is stale; reset the cycle count?
    ResetExpiredCount,
    /// A phase is running; kill it?
    KillRunning,
}

/// Answers controller prompts.
pub trait Confirm {
    fn confirm(&mut self, prompt: Prompt) -> bool;
}

impl<F: FnMut(Prompt) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: Prompt) -> bool {
        self(prompt)
    }
}

/// Pre-collected answers, as sent by the command-line client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Answers {
    pub kill: bool,
    pub reset_expired: bool,
}

impl Confirm for Answers {
    fn confirm(&mut self, prompt: Prompt) -> bool {
        match prompt {
            Prompt::ResetExpiredCount => self.reset_expired,
            Prompt::KillRunning => self.kill,
        }
    }
}

/// What [`PhaseController::invoke`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeOutcome {
    /// A new pomodoro started
    Started,
    /// Overtime ended and the given break began
    BreakStarted(Phase),
    /// The running phase was killed
    Killed,
    /// The kill confirmation was declined; nothing changed
    Declined,
}

// ============================================================================
// PhaseController
// ============================================================================

/// External collaborators of a [`PhaseController`].
pub struct Collaborators {
    pub config: Box<dyn ConfigSource>,
    pub clock: Box<dyn Clock>,
    pub tracker: Box<dyn TrackingBackend>,
    pub dispatcher: Dispatcher,
}

/// Owns the timer state and drives every phase transition.
///
/// Only one controller may exist per process at a time.
pub struct PhaseController {
    state: TimerState,
    trigger: TickTrigger,
    status_text: String,
    config: Box<dyn ConfigSource>,
    clock: Box<dyn Clock>,
    tracker: Box<dyn TrackingBackend>,
    dispatcher: Dispatcher,
    hooks: Hooks,
}

impl PhaseController {
    /// Creates the process-wide controller.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::AlreadyRunning` while another controller is alive.
    pub fn new(collaborators: Collaborators) -> Result<Self, TimerError> {
        if CONTROLLER_ALIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TimerError::AlreadyRunning);
        }

        let Collaborators {
            config,
            clock,
            tracker,
            dispatcher,
        } = collaborators;

        Ok(Self {
            state: TimerState::new(clock.now()),
            trigger: TickTrigger::new(),
            status_text: String::new(),
            config,
            clock,
            tracker,
            dispatcher,
            hooks: Hooks::new(),
        })
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Time left in the current phase; negative in overtime.
    pub fn remaining(&self) -> TimeDelta {
        self.state.remaining(self.clock.now())
    }

    /// Status line as of the last tick or transition.
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn trigger(&self) -> &TickTrigger {
        &self.trigger
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Task tracked by the current session, if any.
    pub fn current_task(&self) -> Option<TaskRef> {
        self.state
            .paused_task
            .clone()
            .or_else(|| self.state.original_task.clone())
    }

    /// Loads the configuration as it is right now.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is unreadable or out of range.
    pub fn load_config(&self) -> Result<PomodoroConfig, TimerError> {
        Ok(self.config.load()?)
    }

    /// Returns true if an unfinished cycle has gone stale.
    pub fn session_expired(&self, config: &PomodoroConfig) -> bool {
        self.state.pomodoro_count > 0
            && self
                .state
                .is_expired(self.clock.now(), config.expiry_window())
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Enters `phase` from now, replacing any armed trigger.
    ///
    /// Entering a pomodoro plays the start cue and fires the started hook.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn start(&mut self, phase: Phase) -> Result<(), TimerError> {
        let config = self.load_config()?;
        let now = self.clock.now();

        if !phase.is_active() {
            self.reset(&config, now);
            return Ok(());
        }

        self.enter_phase(phase, &config, now);
        if phase == Phase::Pomodoro {
            self.announce_start(&config);
        }
        Ok(())
    }

    /// Advances the timer by one trigger firing.
    ///
    /// A call while inactive or paused only disarms a stale trigger.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn tick(&mut self) -> Result<(), TimerError> {
        if !self.state.is_active() || self.state.paused {
            if self.trigger.is_armed() {
                debug!("Disarming stale trigger");
                self.trigger.disarm();
            }
            return Ok(());
        }

        let config = self.load_config()?;
        let now = self.clock.now();

        let mut transitioned = false;
        if self.state.remaining(now) <= TimeDelta::zero() {
            transitioned = true;
            match self.state.phase {
                Phase::Pomodoro if config.manual_break => self.enter_overtime(&config, now),
                Phase::Pomodoro => self.finish_pomodoro(&config, now),
                Phase::ShortBreak | Phase::LongBreak => self.finish_break(&config, now),
                Phase::Overtime | Phase::None => transitioned = false,
            }
        }

        self.refresh_status(&config, now);

        if !self.state.is_active() {
            return Ok(());
        }

        if !transitioned && config.ticking_phases.contains(&self.state.phase) {
            let elapsed = self.state.elapsed(now).num_seconds();
            if elapsed % i64::from(config.ticking_frequency_seconds) == 0 {
                self.dispatcher.alert(Cue::Tick, &config);
            }
        }
        self.fire(HookKind::Tick);

        Ok(())
    }

    /// Pauses the running phase.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::NotRunning` when no phase is active.
    pub fn pause(&mut self) -> Result<(), TimerError> {
        if !self.state.is_active() {
            return Err(TimerError::NotRunning);
        }
        if self.state.paused {
            return Ok(());
        }

        let config = self.load_config()?;
        let now = self.clock.now();

        let mut task = None;
        if self.tracking_applies(&config) && self.tracker.is_tracking_active() {
            task = self
                .tracker
                .resolve_current_task_context()
                .or_else(|| self.state.original_task.clone());
            self.end_tracking(false);
        }

        self.trigger.disarm();
        self.state.pause(now, task);
        self.refresh_status(&config, now);
        info!("Paused {} with {}s left", self.state.phase, self.remaining().num_seconds());
        Ok(())
    }

    /// Resumes a paused phase, shifting its deadline by the pause length.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn resume(&mut self) -> Result<(), TimerError> {
        if !self.state.paused {
            return Ok(());
        }

        let config = self.load_config()?;
        let now = self.clock.now();

        let task = self.state.resume(now);
        if let Some(task) = task.filter(|_| self.tracking_applies(&config)) {
            self.begin_tracking(&task);
        }

        self.trigger.arm();
        self.refresh_status(&config, now);
        info!("Resumed {}", self.state.phase);
        Ok(())
    }

    /// Resumes when paused, otherwise pauses.
    ///
    /// # Errors
    ///
    /// Propagates the error of the chosen operation.
    pub fn toggle_pause(&mut self) -> Result<(), TimerError> {
        if self.state.paused {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Kills the running phase.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::NotRunning` when no phase is active.
    pub fn kill(&mut self) -> Result<(), TimerError> {
        if !self.state.is_active() {
            return Err(TimerError::NotRunning);
        }
        let config = self.load_config()?;
        let now = self.clock.now();
        self.kill_with(&config, now);
        Ok(())
    }

    /// The toggle command.
    ///
    /// Starts a pomodoro when inactive, ends overtime, or kills the running
    /// phase after confirmation.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or tracking
    /// cannot begin for a new pomodoro.
    pub fn invoke(
        &mut self,
        task_hint: Option<TaskRef>,
        confirm: &mut dyn Confirm,
    ) -> Result<InvokeOutcome, TimerError> {
        let config = self.load_config()?;
        let now = self.clock.now();

        let reset_count =
            self.session_expired(&config) && confirm.confirm(Prompt::ResetExpiredCount);

        // State is only touched once the clock-in has succeeded.
        if self.state.phase == Phase::None {
            let task = task_hint.or_else(|| self.tracker.resolve_current_task_context());
            if let Some(task) = &task {
                self.tracker.begin_tracking(task)?;
            }
            self.state.original_task = task;
        }

        if reset_count {
            info!("Session expired, resetting pomodoro count");
            self.state.pomodoro_count = 0;
        }
        self.state.last_clock_in = Some(now);

        match self.state.phase {
            Phase::Overtime => {
                self.finish_pomodoro(&config, now);
                Ok(InvokeOutcome::BreakStarted(self.state.phase))
            }
            Phase::None => {
                self.enter_phase(Phase::Pomodoro, &config, now);
                self.announce_start(&config);
                Ok(InvokeOutcome::Started)
            }
            Phase::Pomodoro | Phase::ShortBreak | Phase::LongBreak => {
                if config.ask_before_kill && !confirm.confirm(Prompt::KillRunning) {
                    return Ok(InvokeOutcome::Declined);
                }
                self.kill_with(&config, now);
                Ok(InvokeOutcome::Killed)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    fn enter_phase(&mut self, phase: Phase, config: &PomodoroConfig, now: DateTime<Utc>) {
        self.trigger.disarm();
        self.state.enter(phase, now, config.phase_duration(phase));
        self.trigger.arm();
        self.refresh_status(config, now);
        info!("Entered {} until {}", phase, self.state.end_time);
    }

    fn reset(&mut self, config: &PomodoroConfig, now: DateTime<Utc>) {
        self.trigger.disarm();
        self.state.reset(now);
        self.refresh_status(config, now);
    }

    fn announce_start(&mut self, config: &PomodoroConfig) {
        self.dispatcher.alert(Cue::Start, config);
        self.fire(HookKind::Started);
    }

    fn enter_overtime(&mut self, config: &PomodoroConfig, now: DateTime<Utc>) {
        self.enter_phase(Phase::Overtime, config, now);
        self.dispatcher.alert(Cue::Overtime, config);
        self.fire(HookKind::Overtime);
    }

    fn finish_pomodoro(&mut self, config: &PomodoroConfig, now: DateTime<Utc>) {
        if !config.clock_breaks {
            self.end_tracking(false);
        }

        self.state.pomodoro_count = self.state.pomodoro_count.saturating_add(1);
        let long_break = config.is_long_break(self.state.pomodoro_count);
        let phase = if long_break {
            Phase::LongBreak
        } else {
            Phase::ShortBreak
        };
        self.enter_phase(phase, config, now);

        self.dispatcher
            .alert(Cue::PomodoroFinished { long_break }, config);
        self.fire(HookKind::Finished);
    }

    fn finish_break(&mut self, config: &PomodoroConfig, now: DateTime<Utc>) {
        let long_break = self.state.phase == Phase::LongBreak;
        if config.clock_breaks {
            self.end_tracking(false);
        }

        let continuing = config.auto_continue;
        if continuing {
            if let Some(task) = self.state.original_task.clone() {
                self.begin_tracking(&task);
            }
            self.enter_phase(Phase::Pomodoro, config, now);
        } else {
            self.reset(config, now);
            info!("Break finished, timer stopped");
        }

        self.dispatcher.alert(
            Cue::BreakFinished {
                long_break,
                continuing,
            },
            config,
        );
        self.fire(HookKind::BreakFinished);
        self.fire(if long_break {
            HookKind::LongBreakFinished
        } else {
            HookKind::ShortBreakFinished
        });

        if continuing {
            self.announce_start(config);
        }
    }

    fn kill_with(&mut self, config: &PomodoroConfig, now: DateTime<Utc>) {
        self.end_tracking(!config.keep_killed_time);
        self.reset(config, now);
        info!("Pomodoro killed");
        self.dispatcher.alert(Cue::Killed, config);
        self.fire(HookKind::Killed);
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Breaks are only tracked when the config asks for it.
    fn tracking_applies(&self, config: &PomodoroConfig) -> bool {
        !self.state.phase.is_break() || config.clock_breaks
    }

    fn begin_tracking(&mut self, task: &TaskRef) {
        if let Err(e) = self.tracker.begin_tracking(task) {
            warn!("Failed to begin tracking '{}': {} ({})", task, e, e.suggestion());
        }
    }

    fn end_tracking(&mut self, discard: bool) {
        if !self.tracker.is_tracking_active() {
            return;
        }
        if let Err(e) = self.tracker.end_tracking(discard) {
            warn!("Failed to end tracking: {} ({})", e, e.suggestion());
        }
    }

    fn refresh_status(&mut self, config: &PomodoroConfig, now: DateTime<Utc>) {
        self.status_text = status::render(&self.state, &config.formats, now);
    }

    fn fire(&mut self, kind: HookKind) {
        let ctx = HookContext {
            kind,
            phase: self.state.phase,
            pomodoro_count: self.state.pomodoro_count,
            task: self.state.original_task.clone(),
        };
        self.hooks.fire(&ctx);
    }
}

impl Drop for PhaseController {
    fn drop(&mut self) {
        CONTROLLER_ALIVE.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for PhaseController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseController")
            .field("state", &self.state)
            .field("trigger", &self.trigger)
            .field("status_text", &self.status_text)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
