//! Pomodoro Clock Library
//!
//! This library provides the core functionality for the pomodoro clock:
//! - Phase controller driving pomodoro, overtime and break phases
//! - Sound and desktop-notification dispatch for phase cues
//! - Time tracking through an external command-line tracker
//! - Lifecycle hooks for user observers
//! - IPC server/client for daemon-CLI communication
//! - CLI command parsing and display utilities
//! - Type definitions for configuration and state

pub mod cli;
pub mod config;
pub mod daemon;
pub mod dispatch;
pub mod hooks;
pub mod notification;
pub mod process;
pub mod sound;
pub mod tracking;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    IpcRequest, IpcResponse, Phase, PomodoroConfig, ResponseData, SoundEvent, TaskRef, TimerState,
};

pub use config::{ConfigError, ConfigFile, ConfigSource, SharedConfig};
pub use daemon::{
    Answers, Clock, Collaborators, InvokeOutcome, ManualClock, PhaseController, Prompt,
    SystemClock, TimerError,
};
pub use dispatch::{Cue, Dispatcher, PlaybackRoute};
pub use hooks::{HookContext, HookKind, Hooks};
pub use notification::{MockNotifier, NotificationError, Notifier};
pub use sound::{MockSoundPlayer, PlaybackEnv, SoundError, SoundPlayer};
pub use tracking::{MockTracker, TrackingBackend, TrackingError};
