//! Core data types for the pomodoro clock.
//!
//! This module defines the data structures used for:
//! - Timer phases and the controller-owned timer state
//! - Timer configuration with validation
//! - Sound cue settings per transition event
//! - IPC request/response serialization

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::hooks::HookCommand;
use crate::tracking::TrackingConfig;

// ============================================================================
// Phase
// ============================================================================

/// Represents the current phase of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No timer is running
    None,
    /// Currently in a work session
    Pomodoro,
    /// Work session expired in manual-break mode; waits for the user
    Overtime,
    /// Currently in a short break
    ShortBreak,
    /// Currently in a long break
    LongBreak,
}

impl Phase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::None => "none",
            Phase::Pomodoro => "pomodoro",
            Phase::Overtime => "overtime",
            Phase::ShortBreak => "short_break",
            Phase::LongBreak => "long_break",
        }
    }

    /// Returns true if a timer is running in this phase.
    pub fn is_active(&self) -> bool {
        !matches!(self, Phase::None)
    }

    /// Returns true for the two break phases.
    pub fn is_break(&self) -> bool {
        matches!(self, Phase::ShortBreak | Phase::LongBreak)
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::None
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TaskRef
// ============================================================================

/// Opaque reference to a task in the time-tracking backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskRef(String);

impl TaskRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Sound settings
// ============================================================================

/// Transition events that can carry an audio cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundEvent {
    /// A work phase started
    Start,
    /// A work phase completed
    Pomodoro,
    /// A work phase ran into overtime
    Overtime,
    /// The running phase was killed
    Killed,
    /// A short break finished
    ShortBreak,
    /// A long break finished
    LongBreak,
    /// Per-second ticking
    Tick,
}

/// Playback settings for one sound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundSetting {
    /// Whether the cue plays at all
    #[serde(default)]
    pub enabled: bool,
    /// Audio resource to play
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Extra arguments handed to an external player
    #[serde(default)]
    pub args: Vec<String>,
}

impl SoundSetting {
    fn bundled(enabled: bool, file_name: &str) -> Self {
        Self {
            enabled,
            path: default_sound_dir().map(|dir| dir.join(file_name)),
            args: Vec::new(),
        }
    }
}

/// Per-event sound configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub start: SoundSetting,
    pub pomodoro: SoundSetting,
    pub overtime: SoundSetting,
    pub killed: SoundSetting,
    pub short_break: SoundSetting,
    pub long_break: SoundSetting,
    pub tick: SoundSetting,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            start: SoundSetting::bundled(false, "bell.wav"),
            pomodoro: SoundSetting::bundled(true, "bell.wav"),
            overtime: SoundSetting::bundled(true, "bell.wav"),
            killed: SoundSetting::bundled(false, "bell.wav"),
            short_break: SoundSetting::bundled(true, "bell_multiple.wav"),
            long_break: SoundSetting::bundled(true, "bell_multiple.wav"),
            tick: SoundSetting::bundled(false, "tick.wav"),
        }
    }
}

impl SoundConfig {
    /// Returns the settings for the given event.
    pub fn setting(&self, event: SoundEvent) -> &SoundSetting {
        match event {
            SoundEvent::Start => &self.start,
            SoundEvent::Pomodoro => &self.pomodoro,
            SoundEvent::Overtime => &self.overtime,
            SoundEvent::Killed => &self.killed,
            SoundEvent::ShortBreak => &self.short_break,
            SoundEvent::LongBreak => &self.long_break,
            SoundEvent::Tick => &self.tick,
        }
    }

    /// Returns mutable settings for the given event.
    pub fn setting_mut(&mut self, event: SoundEvent) -> &mut SoundSetting {
        match event {
            SoundEvent::Start => &mut self.start,
            SoundEvent::Pomodoro => &mut self.pomodoro,
            SoundEvent::Overtime => &mut self.overtime,
            SoundEvent::Killed => &mut self.killed,
            SoundEvent::ShortBreak => &mut self.short_break,
            SoundEvent::LongBreak => &mut self.long_break,
            SoundEvent::Tick => &mut self.tick,
        }
    }
}

/// Directory holding the bundled bell and tick sounds.
pub fn default_sound_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("pomodoro-clock").join("sounds"))
}

// ============================================================================
// StatusFormats
// ============================================================================

/// Status-line templates per phase. `{time}` is replaced with `MM:SS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusFormats {
    pub pomodoro: String,
    pub overtime: String,
    pub short_break: String,
    pub long_break: String,
}

impl Default for StatusFormats {
    fn default() -> Self {
        Self {
            pomodoro: "Pomodoro~{time}".to_string(),
            overtime: "+{time}".to_string(),
            short_break: "Short Break~{time}".to_string(),
            long_break: "Long Break~{time}".to_string(),
        }
    }
}

impl StatusFormats {
    /// Returns the template for the given phase, or None when inactive.
    pub fn for_phase(&self, phase: Phase) -> Option<&str> {
        match phase {
            Phase::None => None,
            Phase::Pomodoro => Some(&self.pomodoro),
            Phase::Overtime => Some(&self.overtime),
            Phase::ShortBreak => Some(&self.short_break),
            Phase::LongBreak => Some(&self.long_break),
        }
    }
}

// ============================================================================
// PomodoroConfig
// ============================================================================

/// Configuration for the pomodoro clock.
///
/// Missing fields in a config file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PomodoroConfig {
    /// Work duration in minutes (1-180)
    pub work_minutes: u32,
    /// Short break duration in minutes (1-120)
    pub short_break_minutes: u32,
    /// Long break duration in minutes (1-120)
    pub long_break_minutes: u32,
    /// Every n-th completed pomodoro is followed by a long break
    pub long_break_frequency: u32,
    /// Start the next pomodoro automatically when a break ends
    pub auto_continue: bool,
    /// Enter overtime instead of a break when a pomodoro expires
    pub manual_break: bool,
    /// Ask before killing a running phase
    pub ask_before_kill: bool,
    /// Keep tracked time of a killed pomodoro instead of discarding it
    pub keep_killed_time: bool,
    /// Keep tracking through breaks
    pub clock_breaks: bool,
    /// Minutes after the last clock-in after which the cycle counts as expired
    pub expiry_minutes: u32,
    /// Per-event sound settings
    pub sounds: SoundConfig,
    /// Phases in which the ticking cue plays
    pub ticking_phases: Vec<Phase>,
    /// Ticking cue interval in seconds
    pub ticking_frequency_seconds: u32,
    /// External audio player overriding discovery
    pub audio_player: Option<PathBuf>,
    /// Status-line templates
    pub formats: StatusFormats,
    /// Time-tracking command templates
    pub tracking: TrackingConfig,
    /// Shell hooks run on lifecycle events
    pub hooks: Vec<HookCommand>,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 20,
            long_break_frequency: 4,
            auto_continue: false,
            manual_break: false,
            ask_before_kill: true,
            keep_killed_time: false,
            clock_breaks: false,
            expiry_minutes: 120,
            sounds: SoundConfig::default(),
            ticking_phases: vec![Phase::Pomodoro, Phase::ShortBreak, Phase::LongBreak],
            ticking_frequency_seconds: 1,
            audio_player: None,
            formats: StatusFormats::default(),
            tracking: TrackingConfig::default(),
            hooks: Vec::new(),
        }
    }
}

impl PomodoroConfig {
    /// Creates a new configuration with the specified work duration.
    pub fn with_work_minutes(mut self, minutes: u32) -> Self {
        self.work_minutes = minutes;
        self
    }

    /// Creates a new configuration with the specified short break duration.
    pub fn with_short_break_minutes(mut self, minutes: u32) -> Self {
        self.short_break_minutes = minutes;
        self
    }

    /// Creates a new configuration with the specified long break duration.
    pub fn with_long_break_minutes(mut self, minutes: u32) -> Self {
        self.long_break_minutes = minutes;
        self
    }

    /// Creates a new configuration with the specified long break frequency.
    pub fn with_long_break_frequency(mut self, frequency: u32) -> Self {
        self.long_break_frequency = frequency;
        self
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.work_minutes < 1 || self.work_minutes > 180 {
            return Err("work_minutes must be between 1 and 180".to_string());
        }
        if self.short_break_minutes < 1 || self.short_break_minutes > 120 {
            return Err("short_break_minutes must be between 1 and 120".to_string());
        }
        if self.long_break_minutes < 1 || self.long_break_minutes > 120 {
            return Err("long_break_minutes must be between 1 and 120".to_string());
        }
        if self.long_break_frequency < 1 {
            return Err("long_break_frequency must be at least 1".to_string());
        }
        if self.ticking_frequency_seconds < 1 {
            return Err("ticking_frequency_seconds must be at least 1".to_string());
        }
        if self.expiry_minutes < 1 {
            return Err("expiry_minutes must be at least 1".to_string());
        }
        Ok(())
    }

    /// Countdown length of a phase. Overtime has no natural expiry.
    pub fn phase_duration(&self, phase: Phase) -> TimeDelta {
        let minutes = match phase {
            Phase::Pomodoro => self.work_minutes,
            Phase::ShortBreak => self.short_break_minutes,
            Phase::LongBreak => self.long_break_minutes,
            Phase::Overtime | Phase::None => 0,
        };
        TimeDelta::minutes(i64::from(minutes))
    }

    /// Window after the last clock-in beyond which the cycle is stale.
    pub fn expiry_window(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.expiry_minutes))
    }

    /// Returns true if the n-th completed pomodoro earns a long break.
    ///
    /// A zero frequency never yields a long break.
    pub fn is_long_break(&self, pomodoro_count: u32) -> bool {
        pomodoro_count
            .checked_rem(self.long_break_frequency)
            .is_some_and(|rem| rem == 0)
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// State owned and mutated by the phase controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    /// Current phase of the timer
    pub phase: Phase,
    /// When the current phase's countdown reaches zero
    pub end_time: DateTime<Utc>,
    /// When the current phase began (shifted by pauses)
    pub started_at: DateTime<Utc>,
    /// Completed pomodoros in the current cycle
    pub pomodoro_count: u32,
    /// Most recent session start, used for expiry checks
    pub last_clock_in: Option<DateTime<Utc>>,
    /// Task that was tracked when the timer started
    pub original_task: Option<TaskRef>,
    /// Whether the countdown is paused
    pub paused: bool,
    /// When the pause began
    pub paused_at: Option<DateTime<Utc>>,
    /// Task whose tracking was suspended by the pause
    pub paused_task: Option<TaskRef>,
}

impl TimerState {
    /// Creates a new TimerState with no active phase.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            phase: Phase::None,
            end_time: now,
            started_at: now,
            pomodoro_count: 0,
            last_clock_in: None,
            original_task: None,
            paused: false,
            paused_at: None,
            paused_task: None,
        }
    }

    /// Returns true if a phase is running (paused or not).
    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    /// Enters a phase that lasts `duration` from `now`.
    pub fn enter(&mut self, phase: Phase, now: DateTime<Utc>, duration: TimeDelta) {
        self.phase = phase;
        self.started_at = now;
        self.end_time = now + duration;
        self.clear_pause();
    }

    /// Returns to the inactive phase. The cycle count is preserved.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.phase = Phase::None;
        self.started_at = now;
        self.end_time = now;
        self.clear_pause();
    }

    /// Marks the timer paused at `now`.
    pub fn pause(&mut self, now: DateTime<Utc>, task: Option<TaskRef>) {
        self.paused = true;
        self.paused_at = Some(now);
        self.paused_task = task;
    }

    /// Unpauses, shifting the deadline by the pause length.
    ///
    /// Returns the task whose tracking was suspended, if any.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Option<TaskRef> {
        if let Some(paused_at) = self.paused_at {
            let gap = now - paused_at;
            self.end_time += gap;
            self.started_at += gap;
        }
        let task = self.paused_task.take();
        self.clear_pause();
        task
    }

    /// Time left until the deadline; negative once it has passed.
    ///
    /// A paused timer reports the time left when the pause began.
    pub fn remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        let reference = if self.paused {
            self.paused_at.unwrap_or(now)
        } else {
            now
        };
        self.end_time - reference
    }

    /// Time spent in the current phase, excluding pauses.
    pub fn elapsed(&self, now: DateTime<Utc>) -> TimeDelta {
        let reference = if self.paused {
            self.paused_at.unwrap_or(now)
        } else {
            now
        };
        reference - self.started_at
    }

    /// Returns true if the last clock-in is older than `window`.
    pub fn is_expired(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        self.last_clock_in
            .is_some_and(|clock_in| now - clock_in > window)
    }

    fn clear_pause(&mut self) {
        self.paused = false;
        self.paused_at = None;
        self.paused_task = None;
    }
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from client to daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Toggle command: start, finish overtime, or kill
    Invoke {
        /// Task to track when starting
        #[serde(rename = "taskName", default, skip_serializing_if = "Option::is_none")]
        task_name: Option<String>,
        /// Answer to the kill confirmation
        #[serde(rename = "confirmKill", default)]
        confirm_kill: bool,
        /// Answer to the expired-cycle reset confirmation
        #[serde(rename = "resetExpired", default)]
        reset_expired: bool,
    },
    /// Pause the current timer
    Pause,
    /// Resume the paused timer
    Resume,
    /// Pause or resume depending on the current state
    TogglePause,
    /// Kill the current phase
    Kill,
    /// Query the current status
    Status,
}

/// Response data for IPC responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseData {
    /// Current phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// Seconds left; negative in overtime
    #[serde(rename = "remainingSeconds", skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<i64>,
    /// Completed pomodoros in the cycle
    #[serde(rename = "pomodoroCount", skip_serializing_if = "Option::is_none")]
    pub pomodoro_count: Option<u32>,
    /// Task being tracked
    #[serde(rename = "taskName", skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    /// Whether the timer is paused
    #[serde(default)]
    pub paused: bool,
    /// Rendered status line
    #[serde(rename = "statusText", skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    /// Whether the last session is older than the expiry window
    #[serde(rename = "sessionExpired", default)]
    pub session_expired: bool,
    /// Whether invoking a running timer needs confirmation
    #[serde(rename = "askBeforeKill", default)]
    pub ask_before_kill: bool,
}

impl ResponseData {
    /// Returns true if the response describes a running phase.
    pub fn is_active(&self) -> bool {
        self.phase
            .as_deref()
            .is_some_and(|phase| phase != Phase::None.as_str())
    }

    /// Returns true if the response describes the overtime phase.
    pub fn is_overtime(&self) -> bool {
        self.phase.as_deref() == Some(Phase::Overtime.as_str())
    }
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true for error responses.
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, minute, 0).unwrap()
    }

    // ------------------------------------------------------------------------
    // Phase Tests
    // ------------------------------------------------------------------------

    mod phase_tests {
        use super::*;

        #[test]
        fn test_default_is_none() {
            assert_eq!(Phase::default(), Phase::None);
        }

        #[test]
        fn test_as_str() {
            assert_eq!(Phase::None.as_str(), "none");
            assert_eq!(Phase::Pomodoro.as_str(), "pomodoro");
            assert_eq!(Phase::Overtime.as_str(), "overtime");
            assert_eq!(Phase::ShortBreak.as_str(), "short_break");
            assert_eq!(Phase::LongBreak.as_str(), "long_break");
        }

        #[test]
        fn test_is_active_and_is_break() {
            assert!(!Phase::None.is_active());
            assert!(Phase::Overtime.is_active());
            assert!(Phase::ShortBreak.is_break());
            assert!(Phase::LongBreak.is_break());
            assert!(!Phase::Pomodoro.is_break());
            assert!(!Phase::Overtime.is_break());
        }

        #[test]
        fn test_serde_names_match_as_str() {
            let json = serde_json::to_string(&Phase::ShortBreak).unwrap();
            assert_eq!(json, "\"short_break\"");
            let phase: Phase = serde_json::from_str("\"long_break\"").unwrap();
            assert_eq!(phase, Phase::LongBreak);
        }
    }

    // ------------------------------------------------------------------------
    // PomodoroConfig Tests
    // ------------------------------------------------------------------------

    mod pomodoro_config_tests {
        use super::*;

        #[test]
        fn test_default_values() {
            let config = PomodoroConfig::default();
            assert_eq!(config.work_minutes, 25);
            assert_eq!(config.short_break_minutes, 5);
            assert_eq!(config.long_break_minutes, 20);
            assert_eq!(config.long_break_frequency, 4);
            assert_eq!(config.expiry_minutes, 120);
            assert!(config.ask_before_kill);
            assert!(!config.manual_break);
            assert!(!config.auto_continue);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_builder_pattern() {
            let config = PomodoroConfig::default()
                .with_work_minutes(50)
                .with_short_break_minutes(10)
                .with_long_break_minutes(30)
                .with_long_break_frequency(3);

            assert_eq!(config.work_minutes, 50);
            assert_eq!(config.short_break_minutes, 10);
            assert_eq!(config.long_break_minutes, 30);
            assert_eq!(config.long_break_frequency, 3);
        }

        #[test]
        fn test_validate_rejects_zero_frequency() {
            let config = PomodoroConfig::default().with_long_break_frequency(0);
            let err = config.validate().unwrap_err();
            assert!(err.contains("long_break_frequency"));
        }

        #[test]
        fn test_validate_rejects_out_of_range_durations() {
            assert!(PomodoroConfig::default().with_work_minutes(0).validate().is_err());
            assert!(PomodoroConfig::default().with_work_minutes(181).validate().is_err());
            assert!(PomodoroConfig::default()
                .with_short_break_minutes(121)
                .validate()
                .is_err());
            assert!(PomodoroConfig::default()
                .with_long_break_minutes(0)
                .validate()
                .is_err());
        }

        #[test]
        fn test_validate_rejects_zero_ticking_frequency() {
            let config = PomodoroConfig {
                ticking_frequency_seconds: 0,
                ..PomodoroConfig::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_phase_duration() {
            let config = PomodoroConfig::default();
            assert_eq!(config.phase_duration(Phase::Pomodoro), TimeDelta::minutes(25));
            assert_eq!(config.phase_duration(Phase::ShortBreak), TimeDelta::minutes(5));
            assert_eq!(config.phase_duration(Phase::LongBreak), TimeDelta::minutes(20));
            assert_eq!(config.phase_duration(Phase::Overtime), TimeDelta::zero());
        }

        #[test]
        fn test_is_long_break() {
            let config = PomodoroConfig::default();
            assert!(!config.is_long_break(1));
            assert!(!config.is_long_break(3));
            assert!(config.is_long_break(4));
            assert!(config.is_long_break(8));

            let never = PomodoroConfig::default().with_long_break_frequency(0);
            assert!(!never.is_long_break(4));
        }

        #[test]
        fn test_partial_json_fills_defaults() {
            let config: PomodoroConfig =
                serde_json::from_str(r#"{"work_minutes": 50, "manual_break": true}"#).unwrap();
            assert_eq!(config.work_minutes, 50);
            assert!(config.manual_break);
            assert_eq!(config.short_break_minutes, 5);
            assert_eq!(config.long_break_frequency, 4);
        }

        #[test]
        fn test_sound_setting_lookup_is_per_event() {
            let mut sounds = SoundConfig::default();
            sounds.setting_mut(SoundEvent::Tick).enabled = true;
            assert!(sounds.setting(SoundEvent::Tick).enabled);
            assert!(!sounds.setting(SoundEvent::Start).enabled);
            assert!(sounds.setting(SoundEvent::Pomodoro).enabled);
        }
    }

    // ------------------------------------------------------------------------
    // TimerState Tests
    // ------------------------------------------------------------------------

    mod timer_state_tests {
        use super::*;

        #[test]
        fn test_new_state() {
            let state = TimerState::new(at(0));
            assert_eq!(state.phase, Phase::None);
            assert_eq!(state.pomodoro_count, 0);
            assert!(!state.paused);
            assert!(state.last_clock_in.is_none());
        }

        #[test]
        fn test_enter_sets_deadline() {
            let mut state = TimerState::new(at(0));
            state.enter(Phase::Pomodoro, at(0), TimeDelta::minutes(25));

            assert_eq!(state.phase, Phase::Pomodoro);
            assert_eq!(state.end_time, at(25));
            assert_eq!(state.remaining(at(10)), TimeDelta::minutes(15));
            assert_eq!(state.elapsed(at(10)), TimeDelta::minutes(10));
        }

        #[test]
        fn test_pause_freezes_remaining() {
            let mut state = TimerState::new(at(0));
            state.enter(Phase::Pomodoro, at(0), TimeDelta::minutes(25));
            state.pause(at(10), None);

            assert_eq!(state.remaining(at(12)), TimeDelta::minutes(15));
            assert_eq!(state.elapsed(at(12)), TimeDelta::minutes(10));
        }

        #[test]
        fn test_resume_shifts_deadline() {
            let mut state = TimerState::new(at(0));
            state.enter(Phase::Pomodoro, at(0), TimeDelta::minutes(25));
            state.pause(at(10), Some(TaskRef::new("write report")));

            let task = state.resume(at(12));

            assert_eq!(task, Some(TaskRef::new("write report")));
            assert!(!state.paused);
            assert_eq!(state.end_time, at(27));
            assert_eq!(state.remaining(at(12)), TimeDelta::minutes(15));
        }

        #[test]
        fn test_reset_preserves_count() {
            let mut state = TimerState::new(at(0));
            state.pomodoro_count = 3;
            state.enter(Phase::ShortBreak, at(0), TimeDelta::minutes(5));
            state.pause(at(1), None);

            state.reset(at(2));

            assert_eq!(state.phase, Phase::None);
            assert!(!state.paused);
            assert_eq!(state.pomodoro_count, 3);
        }

        #[test]
        fn test_is_expired() {
            let mut state = TimerState::new(at(0));
            assert!(!state.is_expired(at(59), TimeDelta::minutes(30)));

            state.last_clock_in = Some(at(0));
            assert!(!state.is_expired(at(30), TimeDelta::minutes(30)));
            assert!(state.is_expired(at(31), TimeDelta::minutes(30)));
        }
    }

    // ------------------------------------------------------------------------
    // IPC Types Tests
    // ------------------------------------------------------------------------

    mod ipc_tests {
        use super::*;

        #[test]
        fn test_invoke_request_serialize() {
            let request = IpcRequest::Invoke {
                task_name: Some("Review".to_string()),
                confirm_kill: true,
                reset_expired: false,
            };
            let json = serde_json::to_string(&request).unwrap();
            assert!(json.contains("\"command\":\"invoke\""));
            assert!(json.contains("\"taskName\":\"Review\""));
            assert!(json.contains("\"confirmKill\":true"));
        }

        #[test]
        fn test_invoke_request_defaults_answers() {
            let request: IpcRequest = serde_json::from_str(r#"{"command":"invoke"}"#).unwrap();
            match request {
                IpcRequest::Invoke {
                    task_name,
                    confirm_kill,
                    reset_expired,
                } => {
                    assert!(task_name.is_none());
                    assert!(!confirm_kill);
                    assert!(!reset_expired);
                }
                _ => panic!("Expected Invoke request"),
            }
        }

        #[test]
        fn test_toggle_pause_command_name() {
            let json = serde_json::to_string(&IpcRequest::TogglePause).unwrap();
            assert_eq!(json, r#"{"command":"togglepause"}"#);
        }

        #[test]
        fn test_response_data_phase_helpers() {
            let data = ResponseData {
                phase: Some("overtime".to_string()),
                ..ResponseData::default()
            };
            assert!(data.is_active());
            assert!(data.is_overtime());

            let idle = ResponseData {
                phase: Some("none".to_string()),
                ..ResponseData::default()
            };
            assert!(!idle.is_active());
        }

        #[test]
        fn test_ipc_response_error() {
            let response = IpcResponse::error("no timer is running");
            assert!(response.is_error());
            assert!(response.data.is_none());
        }
    }
}
