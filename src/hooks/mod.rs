//! Lifecycle hooks.
//!
//! Observers register for a [`HookKind`] and run in registration order when
//! the controller fires that kind. A failing or panicking observer is logged
//! and the remaining observers still run.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::process::Launcher;
use crate::types::{Phase, TaskRef};

/// Lifecycle points observers can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    Started,
    Finished,
    Overtime,
    Killed,
    BreakFinished,
    ShortBreakFinished,
    LongBreakFinished,
    Tick,
}

impl HookKind {
    pub const ALL: [HookKind; 8] = [
        HookKind::Started,
        HookKind::Finished,
        HookKind::Overtime,
        HookKind::Killed,
        HookKind::BreakFinished,
        HookKind::ShortBreakFinished,
        HookKind::LongBreakFinished,
        HookKind::Tick,
    ];
}

/// What observers get to see when a hook fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookContext {
    pub kind: HookKind,
    /// Phase after the transition
    pub phase: Phase,
    pub pomodoro_count: u32,
    pub task: Option<TaskRef>,
}

/// A registered observer.
pub type Observer = Box<dyn FnMut(&HookContext) -> anyhow::Result<()>>;

/// Per-kind observer lists.
#[derive(Default)]
pub struct Hooks {
    observers: HashMap<HookKind, Vec<Observer>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observer for `kind`.
    pub fn register(&mut self, kind: HookKind, observer: Observer) {
        self.observers.entry(kind).or_default().push(observer);
    }

    /// Number of observers registered for `kind`.
    pub fn count(&self, kind: HookKind) -> usize {
        self.observers.get(&kind).map_or(0, Vec::len)
    }

    /// Runs every observer registered for `ctx.kind`.
    pub fn fire(&mut self, ctx: &HookContext) {
        let Some(observers) = self.observers.get_mut(&ctx.kind) else {
            return;
        };

        for (index, observer) in observers.iter_mut().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| observer(ctx))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("{:?} hook #{} failed: {:#}", ctx.kind, index, e),
                Err(_) => warn!("{:?} hook #{} panicked", ctx.kind, index),
            }
        }
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<_, _> = self
            .observers
            .iter()
            .map(|(kind, list)| (*kind, list.len()))
            .collect();
        f.debug_struct("Hooks").field("observers", &counts).finish()
    }
}

// ============================================================================
// Shell-command hooks
// ============================================================================

/// A configured shell hook: run `command` when `on` fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookCommand {
    pub on: HookKind,
    pub command: Vec<String>,
}

/// Builds an observer that launches `argv` with the hook context in the
/// environment (`POMODORO_PHASE`, `POMODORO_COUNT`, `POMODORO_TASK`).
pub fn command_observer(argv: Vec<String>, launcher: Arc<dyn Launcher>) -> Observer {
    Box::new(move |ctx: &HookContext| {
        let Some((program, args)) = argv.split_first() else {
            anyhow::bail!("empty hook command");
        };
        let envs = vec![
            ("POMODORO_PHASE".to_string(), ctx.phase.as_str().to_string()),
            ("POMODORO_COUNT".to_string(), ctx.pomodoro_count.to_string()),
            (
                "POMODORO_TASK".to_string(),
                ctx.task.as_ref().map(ToString::to_string).unwrap_or_default(),
            ),
        ];
        launcher.launch(Path::new(program), args, &envs)?;
        debug!("Launched {:?} hook '{}'", ctx.kind, program);
        Ok(())
    })
}
