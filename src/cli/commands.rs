//! Command definitions for the pomodoro clock CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI Structure
// ============================================================================

/// Pomodoro clock with overtime, tracking and hooks
#[derive(Parser, Debug)]
#[command(
    name = "pomodoro-clock",
    version,
    about = "Pomodoro clock daemon and client",
    long_about = "A pomodoro clock that runs as a small daemon.\n\
                  The client toggles pomodoros, pauses them and reports status over a Unix socket.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Daemon socket path (default: ~/.pomodoro-clock/pomodoro-clock.sock)
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a pomodoro, end overtime, or kill the running phase
    Invoke(InvokeArgs),

    /// Pause the current phase
    Pause,

    /// Resume a paused phase
    Resume,

    /// Pause or resume depending on the current state
    TogglePause,

    /// Kill the current phase
    Kill,

    /// Show current timer status
    Status,

    /// Run the timer daemon in the foreground
    Daemon(DaemonArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Command Arguments
// ============================================================================

/// Arguments for the invoke command
#[derive(Args, Debug, Clone, Default)]
pub struct InvokeArgs {
    /// Task to track for a new pomodoro
    #[arg(short, long, value_parser = validate_task_name)]
    pub task: Option<String>,

    /// Kill a running phase without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Reset an expired cycle count without asking
    #[arg(short, long)]
    pub reset_count: bool,
}

/// Arguments for the daemon command
#[derive(Args, Debug, Clone, Default)]
pub struct DaemonArgs {
    /// Config file (default: ~/.pomodoro-clock/config.json)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates the task name.
///
/// - Must not be blank
/// - Must not exceed 100 characters
fn validate_task_name(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("Task name must not be empty".to_string());
    }
    if s.chars().count() > 100 {
        return Err("Task name must be at most 100 characters".to_string());
    }
    Ok(s.to_string())
}

// ============================================================================
// Tests
// ============================================================================
