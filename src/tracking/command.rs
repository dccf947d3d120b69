//! Tracking backend that drives a command-line time tracker.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::TrackingError;
use super::TrackingBackend;
use crate::process::Launcher;
use crate::types::TaskRef;

/// Placeholder substituted with the task name in argv templates.
const TASK_PLACEHOLDER: &str = "{task}";

/// Argv templates for the command-line tracker.
///
/// An empty template disables the corresponding call; the backend then only
/// records state locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Command that starts tracking, e.g. `["timew", "start", "{task}"]`
    pub begin: Vec<String>,
    /// Command that stops tracking and keeps the time
    pub end: Vec<String>,
    /// Command that stops tracking and discards the time
    pub cancel: Vec<String>,
    /// Task used when none is given and nothing is being tracked
    pub default_task: Option<String>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            begin: vec!["timew".into(), "start".into(), TASK_PLACEHOLDER.into()],
            end: vec!["timew".into(), "stop".into()],
            cancel: vec!["timew".into(), "cancel".into()],
            default_task: None,
        }
    }
}

impl TrackingConfig {
    /// Config with no commands; tracking state is kept in memory only.
    pub fn disabled() -> Self {
        Self {
            begin: Vec::new(),
            end: Vec::new(),
            cancel: Vec::new(),
            default_task: None,
        }
    }
}

/// Substitutes `{task}` in every argument of `template`.
fn render(template: &[String], task: Option<&TaskRef>) -> Vec<String> {
    let name = task.map(TaskRef::as_str).unwrap_or_default();
    template
        .iter()
        .map(|arg| arg.replace(TASK_PLACEHOLDER, name))
        .collect()
}

/// [`TrackingBackend`] that launches configured commands.
///
/// Commands reach the launcher in call order. The daemon hands it a
/// [`SequentialLauncher`](crate::process::SequentialLauncher) so they also
/// finish in that order.
pub struct CommandTracker {
    config: TrackingConfig,
    launcher: Arc<dyn Launcher>,
    active: Option<TaskRef>,
}

impl CommandTracker {
    pub fn new(config: TrackingConfig, launcher: Arc<dyn Launcher>) -> Self {
        Self {
            config,
            launcher,
            active: None,
        }
    }

    fn run(&self, template: &[String], task: Option<&TaskRef>) -> Result<(), TrackingError> {
        let argv = render(template, task);
        let Some((program, args)) = argv.split_first() else {
            debug!("No tracking command configured, recording state only");
            return Ok(());
        };

        self.launcher
            .launch(Path::new(program), args, &[])
            .map_err(|source| TrackingError::LaunchFailed {
                command: argv.join(" "),
                source,
            })
    }
}

impl std::fmt::Debug for CommandTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTracker")
            .field("config", &self.config)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl TrackingBackend for CommandTracker {
    fn begin_tracking(&mut self, task: &TaskRef) -> Result<(), TrackingError> {
        self.run(&self.config.begin, Some(task))?;
        info!("Clocked in on '{}'", task);
        self.active = Some(task.clone());
        Ok(())
    }

    fn end_tracking(&mut self, discard: bool) -> Result<(), TrackingError> {
        let Some(task) = self.active.take() else {
            return Ok(());
        };
        let template = if discard {
            &self.config.cancel
        } else {
            &self.config.end
        };
        let result = self.run(template, Some(&task));
        info!(discard, "Clocked out of '{}'", task);
        result
    }

    fn is_tracking_active(&self) -> bool {
        self.active.is_some()
    }

    fn resolve_current_task_context(&self) -> Option<TaskRef> {
        self.active
            .clone()
            .or_else(|| self.config.default_task.as_deref().map(TaskRef::new))
    }
}
