//! Time-tracking backend abstraction.
//!
//! The phase controller clocks in when a work phase starts and clocks out
//! when it ends, pauses or is killed. Backends implement
//! [`TrackingBackend`]; [`CommandTracker`] drives a command-line tracker
//! such as timewarrior.

mod command;
mod error;

pub use command::{CommandTracker, TrackingConfig};
pub use error::TrackingError;

use std::sync::{Arc, Mutex};

use crate::types::TaskRef;

/// Operations the controller needs from a time tracker.
pub trait TrackingBackend {
    /// Starts recording time against `task`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker could not be reached.
    fn begin_tracking(&mut self, task: &TaskRef) -> Result<(), TrackingError>;

    /// Stops recording. With `discard` the tracked interval is thrown away.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker could not be reached.
    fn end_tracking(&mut self, discard: bool) -> Result<(), TrackingError>;

    /// Returns true while time is being recorded.
    fn is_tracking_active(&self) -> bool;

    /// Returns the task the user is currently working on, if known.
    fn resolve_current_task_context(&self) -> Option<TaskRef>;
}

// ============================================================================
// MockTracker
// ============================================================================

/// One call made against [`MockTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingCall {
    Begin(TaskRef),
    End { discard: bool },
}

#[derive(Debug, Default)]
struct MockTrackerState {
    calls: Vec<TrackingCall>,
    active: Option<TaskRef>,
    context: Option<TaskRef>,
    should_fail: bool,
}

/// Mock tracker for testing. Clones share their state.
#[derive(Debug, Clone, Default)]
pub struct MockTracker {
    state: Arc<Mutex<MockTrackerState>>,
}

impl MockTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MockTrackerState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    /// Sets the task reported when nothing is being tracked.
    pub fn set_context(&self, task: Option<TaskRef>) {
        self.with_state(|s| s.context = task);
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.with_state(|s| s.should_fail = should_fail);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<TrackingCall> {
        self.with_state(|s| s.calls.clone())
    }

    #[must_use]
    pub fn active_task(&self) -> Option<TaskRef> {
        self.with_state(|s| s.active.clone())
    }

    pub fn clear_calls(&self) {
        self.with_state(|s| s.calls.clear());
    }
}

impl TrackingBackend for MockTracker {
    fn begin_tracking(&mut self, task: &TaskRef) -> Result<(), TrackingError> {
        self.with_state(|s| {
            if s.should_fail {
                return Err(TrackingError::Unavailable("mock failure".to_string()));
            }
            s.calls.push(TrackingCall::Begin(task.clone()));
            s.active = Some(task.clone());
            Ok(())
        })
    }

    fn end_tracking(&mut self, discard: bool) -> Result<(), TrackingError> {
        self.with_state(|s| {
            if s.should_fail {
                return Err(TrackingError::Unavailable("mock failure".to_string()));
            }
            s.calls.push(TrackingCall::End { discard });
            s.active = None;
            Ok(())
        })
    }

    fn is_tracking_active(&self) -> bool {
        self.with_state(|s| s.active.is_some())
    }

    fn resolve_current_task_context(&self) -> Option<TaskRef> {
        self.with_state(|s| s.active.clone().or_else(|| s.context.clone()))
    }
}
