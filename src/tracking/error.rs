//! Time-tracking error types.

use thiserror::Error;

/// Errors that can occur while talking to the time-tracking backend.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// The tracking command could not be started.
    #[error("Failed to launch tracking command '{command}': {source}")]
    LaunchFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The backend refused or is not reachable.
    #[error("Time tracker unavailable: {0}")]
    Unavailable(String),
}

impl TrackingError {
    /// Returns true if the error came from spawning a process.
    #[must_use]
    pub fn is_launch_error(&self) -> bool {
        matches!(self, Self::LaunchFailed { .. })
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::LaunchFailed { .. } => {
                "Check that the tracking command in the config is installed and on PATH"
            }
            Self::Unavailable(_) => "Check that the time tracker is running",
        }
    }
}
