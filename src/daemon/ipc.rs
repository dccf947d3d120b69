//! IPC Server for the pomodoro clock.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - One JSON request and one JSON response per connection
//! - Dispatch of requests to the [`PhaseController`]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use crate::types::{IpcRequest, IpcResponse, Phase, ResponseData, TaskRef};

use super::status;
use super::timer::{Answers, InvokeOutcome, PhaseController};

// ============================================================================
// Constants
// ============================================================================

/// Maximum request size in bytes (4KB)
pub const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// The client closed the connection without sending anything
    #[error("Connection closed by client")]
    ConnectionClosed,

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Reads one request, up to end of stream, and deserializes it.
    ///
    /// Applies a read timeout and the request size cap.
    ///
    /// # Errors
    ///
    /// Returns an error if reading times out, the request is too large or
    /// deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = Vec::with_capacity(512);
        let limit = (MAX_REQUEST_SIZE + 1) as u64;

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            (&mut *stream).take(limit).read_to_end(&mut buffer),
        )
        .await;

        match read_result {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        }

        if buffer.is_empty() {
            return Err(IpcError::ConnectionClosed.into());
        }
        if buffer.len() > MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest =
            serde_json::from_slice(&buffer).context("Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// Request handling
// ============================================================================

/// Describes the controller for a response.
pub fn snapshot(controller: &PhaseController) -> ResponseData {
    let state = controller.state();
    let config = controller.load_config().ok();

    let status_text = match &config {
        Some(config) => status::render(state, &config.formats, controller.now()),
        None => controller.status_text().to_string(),
    };

    ResponseData {
        phase: Some(state.phase.as_str().to_string()),
        remaining_seconds: state
            .is_active()
            .then(|| controller.remaining().num_seconds()),
        pomodoro_count: Some(state.pomodoro_count),
        task_name: controller.current_task().map(|task| task.to_string()),
        paused: state.paused,
        status_text: Some(status_text),
        session_expired: config
            .as_ref()
            .is_some_and(|config| controller.session_expired(config)),
        ask_before_kill: config.as_ref().map_or(true, |config| config.ask_before_kill),
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::None => "Timer",
        Phase::Pomodoro => "Pomodoro",
        Phase::Overtime => "Overtime",
        Phase::ShortBreak => "Short break",
        Phase::LongBreak => "Long break",
    }
}

/// Runs `request` against the controller and builds the response.
pub fn handle_request(controller: &mut PhaseController, request: IpcRequest) -> IpcResponse {
    debug!("Handling {:?}", request);

    let result = match request {
        IpcRequest::Invoke {
            task_name,
            confirm_kill,
            reset_expired,
        } => {
            let mut answers = Answers {
                kill: confirm_kill,
                reset_expired,
            };
            controller
                .invoke(task_name.map(TaskRef::new), &mut answers)
                .map(|outcome| match outcome {
                    InvokeOutcome::Started => "Pomodoro started".to_string(),
                    InvokeOutcome::BreakStarted(phase) => {
                        format!("{} started", phase_label(phase))
                    }
                    InvokeOutcome::Killed => "Pomodoro killed".to_string(),
                    InvokeOutcome::Declined => "Timer keeps running".to_string(),
                })
        }
        IpcRequest::Pause => controller.pause().map(|()| "Timer paused".to_string()),
        IpcRequest::Resume => controller.resume().map(|()| "Timer resumed".to_string()),
        IpcRequest::TogglePause => controller.toggle_pause().map(|()| {
            if controller.state().paused {
                "Timer paused".to_string()
            } else {
                "Timer resumed".to_string()
            }
        }),
        IpcRequest::Kill => controller.kill().map(|()| "Pomodoro killed".to_string()),
        IpcRequest::Status => Ok(String::new()),
    };

    match result {
        Ok(message) => IpcResponse::success(message, Some(snapshot(controller))),
        Err(e) => {
            warn!("Request failed: {}", e);
            IpcResponse::error(format!("{} ({})", e, e.suggestion()))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeDelta, TimeZone, Utc};
    use serial_test::serial;

    use crate::config::SharedConfig;
    use crate::daemon::clock::ManualClock;
    use crate::daemon::timer::Collaborators;
    use crate::dispatch::Dispatcher;
    use crate::notification::MockNotifier;
    use crate::process::MockLauncher;
    use crate::sound::PlaybackEnv;
    use crate::tracking::MockTracker;
    use crate::types::PomodoroConfig;

    // ------------------------------------------------------------------------
    // Helper functions
    // ------------------------------------------------------------------------

    fn create_temp_socket_path() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sock");
        (dir, path)
    }

    fn create_controller(config: PomodoroConfig) -> (PhaseController, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 6, 1, 14, 0, 0).unwrap());
        let controller = PhaseController::new(Collaborators {
            config: Box::new(SharedConfig::new(config)),
            clock: Box::new(clock.clone()),
            tracker: Box::new(MockTracker::new()),
            dispatcher: Dispatcher::new(
                Box::new(MockNotifier::new()),
                None,
                Arc::new(MockLauncher::new()),
                PlaybackEnv::none(),
            ),
        })
        .unwrap();
        (controller, clock)
    }

    fn invoke(confirm_kill: bool) -> IpcRequest {
        IpcRequest::Invoke {
            task_name: Some("API design".to_string()),
            confirm_kill,
            reset_expired: false,
        }
    }

    // ------------------------------------------------------------------------
    // IpcServer Tests
    // ------------------------------------------------------------------------

    mod ipc_server_tests {
        use super::*;

        #[tokio::test]
        async fn test_server_creation() {
            let (_dir, socket_path) = create_temp_socket_path();
            let server = IpcServer::new(&socket_path);

            assert!(server.is_ok());
            assert!(socket_path.exists());
        }

        #[tokio::test]
        async fn test_server_removes_existing_socket() {
            let (_dir, socket_path) = create_temp_socket_path();
            std::fs::write(&socket_path, "dummy").unwrap();

            let server = IpcServer::new(&socket_path);
            assert!(server.is_ok());
        }

        #[tokio::test]
        async fn test_server_creates_parent_directory() {
            let dir = tempfile::tempdir().unwrap();
            let socket_path = dir.path().join("subdir").join("test.sock");

            let server = IpcServer::new(&socket_path);
            assert!(server.is_ok());
            assert!(socket_path.parent().unwrap().exists());
        }

        #[tokio::test]
        async fn test_drop_removes_socket() {
            let (_dir, socket_path) = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();
            drop(server);
            assert!(!socket_path.exists());
        }

        #[tokio::test]
        async fn test_receive_request_status() {
            let (_dir, socket_path) = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();

            let client_path = socket_path.clone();
            let client = tokio::spawn(async move {
                let mut stream = UnixStream::connect(&client_path).await.unwrap();
                stream.write_all(br#"{"command":"status"}"#).await.unwrap();
                stream.shutdown().await.unwrap();
            });

            let mut stream = server.accept().await.unwrap();
            let request = IpcServer::receive_request(&mut stream).await.unwrap();
            assert!(matches!(request, IpcRequest::Status));

            client.await.unwrap();
        }

        #[tokio::test]
        async fn test_receive_request_too_large() {
            let (_dir, socket_path) = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();

            let client_path = socket_path.clone();
            let client = tokio::spawn(async move {
                let mut stream = UnixStream::connect(&client_path).await.unwrap();
                let padding = "x".repeat(MAX_REQUEST_SIZE);
                let body = format!(r#"{{"command":"invoke","taskName":"{}"}}"#, padding);
                let _ = stream.write_all(body.as_bytes()).await;
                let _ = stream.shutdown().await;
            });

            let mut stream = server.accept().await.unwrap();
            let err = IpcServer::receive_request(&mut stream).await.unwrap_err();
            assert!(err.to_string().contains("too large"));

            client.await.unwrap();
        }

        #[tokio::test]
        async fn test_receive_request_invalid_json() {
            let (_dir, socket_path) = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();

            let client_path = socket_path.clone();
            let client = tokio::spawn(async move {
                let mut stream = UnixStream::connect(&client_path).await.unwrap();
                stream.write_all(b"{\"command\":\"explode\"}").await.unwrap();
                stream.shutdown().await.unwrap();
            });

            let mut stream = server.accept().await.unwrap();
            assert!(IpcServer::receive_request(&mut stream).await.is_err());

            client.await.unwrap();
        }

        #[tokio::test]
        async fn test_receive_request_empty_is_closed() {
            let (_dir, socket_path) = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();

            let client_path = socket_path.clone();
            let client = tokio::spawn(async move {
                let stream = UnixStream::connect(&client_path).await.unwrap();
                drop(stream);
            });

            let mut stream = server.accept().await.unwrap();
            let err = IpcServer::receive_request(&mut stream).await.unwrap_err();
            assert!(err.to_string().contains("closed"));

            client.await.unwrap();
        }
    }

    // ------------------------------------------------------------------------
    // handle_request Tests
    // ------------------------------------------------------------------------

    mod handle_request_tests {
        use super::*;

        #[test]
        #[serial]
        fn test_status_when_idle() {
            let (mut controller, _clock) = create_controller(PomodoroConfig::default());

            let response = handle_request(&mut controller, IpcRequest::Status);

            assert!(!response.is_error());
            let data = response.data.unwrap();
            assert_eq!(data.phase.as_deref(), Some("none"));
            assert_eq!(data.remaining_seconds, None);
            assert_eq!(data.pomodoro_count, Some(0));
            assert!(data.ask_before_kill);
            assert!(!data.session_expired);
        }

        #[test]
        #[serial]
        fn test_invoke_starts_pomodoro() {
            let (mut controller, clock) = create_controller(PomodoroConfig::default());

            let response = handle_request(&mut controller, invoke(false));
            assert_eq!(response.message, "Pomodoro started");

            clock.advance(TimeDelta::seconds(90));
            let data = handle_request(&mut controller, IpcRequest::Status)
                .data
                .unwrap();
            assert_eq!(data.phase.as_deref(), Some("pomodoro"));
            assert_eq!(data.remaining_seconds, Some(25 * 60 - 90));
            assert_eq!(data.task_name.as_deref(), Some("API design"));
            assert_eq!(data.status_text.as_deref(), Some("Pomodoro~23:30"));
        }

        #[test]
        #[serial]
        fn test_invoke_running_without_confirmation_is_declined() {
            let (mut controller, _clock) = create_controller(PomodoroConfig::default());
            handle_request(&mut controller, invoke(false));

            let response = handle_request(&mut controller, invoke(false));

            assert_eq!(response.message, "Timer keeps running");
            assert_eq!(controller.phase(), Phase::Pomodoro);
        }

        #[test]
        #[serial]
        fn test_invoke_running_with_confirmation_kills() {
            let (mut controller, _clock) = create_controller(PomodoroConfig::default());
            handle_request(&mut controller, invoke(false));

            let response = handle_request(&mut controller, invoke(true));

            assert_eq!(response.message, "Pomodoro killed");
            assert_eq!(controller.phase(), Phase::None);
        }

        #[test]
        #[serial]
        fn test_toggle_pause_reports_direction() {
            let (mut controller, _clock) = create_controller(PomodoroConfig::default());
            handle_request(&mut controller, invoke(false));

            let paused = handle_request(&mut controller, IpcRequest::TogglePause);
            assert_eq!(paused.message, "Timer paused");
            assert!(paused.data.unwrap().paused);

            let resumed = handle_request(&mut controller, IpcRequest::TogglePause);
            assert_eq!(resumed.message, "Timer resumed");
        }

        #[test]
        #[serial]
        fn test_pause_when_idle_is_error() {
            let (mut controller, _clock) = create_controller(PomodoroConfig::default());

            let response = handle_request(&mut controller, IpcRequest::Pause);

            assert!(response.is_error());
            assert!(response.message.contains("No pomodoro is running"));
        }

        #[test]
        #[serial]
        fn test_kill_request() {
            let (mut controller, _clock) = create_controller(PomodoroConfig::default());
            handle_request(&mut controller, invoke(false));

            let response = handle_request(&mut controller, IpcRequest::Kill);

            assert_eq!(response.message, "Pomodoro killed");
            assert_eq!(response.data.unwrap().phase.as_deref(), Some("none"));
        }

        #[test]
        #[serial]
        fn test_invoke_in_overtime_reports_break() {
            let config = PomodoroConfig {
                manual_break: true,
                ..PomodoroConfig::default()
            };
            let (mut controller, clock) = create_controller(config);
            handle_request(&mut controller, invoke(false));
            clock.advance(TimeDelta::minutes(25));
            controller.tick().unwrap();

            let response = handle_request(&mut controller, invoke(false));

            assert_eq!(response.message, "Short break started");
        }
    }
}
