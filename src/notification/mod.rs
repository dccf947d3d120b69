//! Desktop notifications.
//!
//! Notifications are fire-and-forget: [`DesktopNotifier`] launches
//! `notify-send` on Linux or `osascript` on macOS and never waits for it.
//! Without either tool the notice is only logged.

pub mod error;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::info;

pub use self::error::NotificationError;

use crate::process::{find_executable, Launcher};

/// Application name passed to the notification daemon.
const APP_NAME: &str = "pomodoro-clock";

/// Trait for notification channels.
pub trait Notifier {
    /// Shows a notification with `title` and `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification could not be handed off.
    fn notify(&self, title: &str, message: &str) -> Result<(), NotificationError>;
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, title: &str, message: &str) -> Result<(), NotificationError> {
        (**self).notify(title, message)
    }
}

// ============================================================================
// DesktopNotifier
// ============================================================================

/// Tool used to show desktop notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyTool {
    /// freedesktop `notify-send`
    NotifySend(PathBuf),
    /// macOS `osascript`
    Osascript(PathBuf),
    /// Nothing available; notices go to the log
    LogOnly,
}

impl NotifyTool {
    /// Picks the tool for the running platform.
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            if let Some(path) = find_executable("osascript") {
                return Self::Osascript(path);
            }
        }
        match find_executable("notify-send") {
            Some(path) => Self::NotifySend(path),
            None => Self::LogOnly,
        }
    }

    /// Builds the argument list for showing one notification.
    pub fn args(&self, title: &str, message: &str) -> Vec<String> {
        match self {
            Self::NotifySend(_) => vec![
                format!("--app-name={}", APP_NAME),
                title.to_string(),
                message.to_string(),
            ],
            Self::Osascript(_) => vec![
                "-e".to_string(),
                format!(
                    "display notification \"{}\" with title \"{}\"",
                    escape_applescript(message),
                    escape_applescript(title)
                ),
            ],
            Self::LogOnly => Vec::new(),
        }
    }
}

fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Notifier that shells out to the platform notification tool.
pub struct DesktopNotifier {
    tool: NotifyTool,
    launcher: Arc<dyn Launcher>,
}

impl DesktopNotifier {
    pub fn new(tool: NotifyTool, launcher: Arc<dyn Launcher>) -> Self {
        Self { tool, launcher }
    }

    /// Creates a notifier for the running platform.
    pub fn detect(launcher: Arc<dyn Launcher>) -> Self {
        Self::new(NotifyTool::detect(), launcher)
    }

    pub fn tool(&self) -> &NotifyTool {
        &self.tool
    }
}

impl std::fmt::Debug for DesktopNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesktopNotifier")
            .field("tool", &self.tool)
            .finish_non_exhaustive()
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<(), NotificationError> {
        let program = match &self.tool {
            NotifyTool::NotifySend(path) | NotifyTool::Osascript(path) => path,
            NotifyTool::LogOnly => {
                info!("{} {}", title, message);
                return Ok(());
            }
        };

        self.launcher
            .launch(program, &self.tool.args(title, message), &[])
            .map_err(|e| NotificationError::SendFailed(e.to_string()))
    }
}

// ============================================================================
// MockNotifier
// ============================================================================

/// Mock notifier for testing.
#[derive(Debug, Default)]
pub struct MockNotifier {
    notifications: Mutex<Vec<(String, String)>>,
    should_fail: AtomicBool,
}

impl MockNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Returns recorded `(title, message)` pairs.
    #[must_use]
    pub fn get_notifications(&self) -> Vec<(String, String)> {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    #[must_use]
    pub fn notification_count(&self) -> usize {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn clear_recorded(&self) {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<(), NotificationError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(NotificationError::SendFailed("Mock failure".to_string()));
        }
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((title.to_string(), message.to_string()));
        Ok(())
    }
}
