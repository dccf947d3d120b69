//! Notification system error types.

use thiserror::Error;

/// Errors that can occur in the notification system.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Failed to send a notification.
    #[error("Failed to send notification: {0}")]
    SendFailed(String),

    /// No desktop notification tool is available.
    #[error("Notification center not available")]
    NotAvailable,
}

impl NotificationError {
    /// Returns true if notifications cannot work on this system at all.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::NotAvailable)
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::SendFailed(_) => "Check that the desktop notification daemon is running",
            Self::NotAvailable => "Install notify-send (libnotify) to get desktop notifications",
        }
    }
}
