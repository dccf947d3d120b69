//! IPC Client for communicating with the pomodoro clock daemon.
//!
//! This module provides:
//! - Unix Domain Socket client
//! - Request/response handling
//! - Connection retry logic
//! - Timeout handling

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::config::default_socket_path;
use crate::daemon::Answers;
use crate::types::{IpcRequest, IpcResponse};

// ============================================================================
// Constants
// ============================================================================

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read/write timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size in bytes (64KB)
const MAX_RESPONSE_SIZE: usize = 65536;

/// Maximum retry attempts
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds (base delay, multiplied by attempt number)
const RETRY_DELAY_MS: u64 = 500;

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for daemon communication.
pub struct IpcClient {
    /// Socket path
    socket_path: PathBuf,
    /// Connection timeout
    timeout: Duration,
}

impl IpcClient {
    /// Creates a new IPC client with the default socket path.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        let socket_path = default_socket_path().context("Cannot determine the home directory")?;
        Ok(Self::with_socket_path(socket_path))
    }

    /// Creates a new IPC client with a custom socket path.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: Duration::from_secs(CONNECTION_TIMEOUT_SECS),
        }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Sends the toggle command with pre-collected answers.
    pub async fn invoke(&self, task: Option<String>, answers: Answers) -> Result<IpcResponse> {
        let request = IpcRequest::Invoke {
            task_name: task,
            confirm_kill: answers.kill,
            reset_expired: answers.reset_expired,
        };
        self.send_request_with_retry(&request).await
    }

    /// Sends a pause command to the daemon.
    pub async fn pause(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Pause).await
    }

    /// Sends a resume command to the daemon.
    pub async fn resume(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Resume).await
    }

    /// Sends a toggle-pause command to the daemon.
    pub async fn toggle_pause(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::TogglePause)
            .await
    }

    /// Sends a kill command to the daemon.
    pub async fn kill(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Kill).await
    }

    /// Sends a status query to the daemon.
    pub async fn status(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Status).await
    }

    /// Sends a request to the daemon with retry logic.
    ///
    /// Only transport failures are retried; an error reported by the daemon
    /// is returned as-is.
    async fn send_request_with_retry(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            match self.send_request(request).await {
                Ok(response) if response.is_error() => {
                    anyhow::bail!("{}", response.message);
                }
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::warn!("Request failed (attempt {}/{}): {:#}", attempt, MAX_RETRIES, e);
                    last_error = Some(e);

                    if attempt < MAX_RETRIES {
                        let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("Request was never sent")))
    }

    /// Sends a single request to the daemon.
    async fn send_request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut stream = timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("Connection timed out")?
            .context("Cannot reach the daemon. Start it with 'pomodoro-clock daemon'")?;

        let request_json =
            serde_json::to_vec(request).context("Failed to serialize the request")?;

        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.write_all(&request_json),
        )
        .await
        .context("Write timed out")?
        .context("Failed to send the request")?;

        // Shutdown write side to signal end of request
        stream
            .shutdown()
            .await
            .context("Failed to finish the request")?;

        let mut buffer = Vec::new();
        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            (&mut stream)
                .take(MAX_RESPONSE_SIZE as u64)
                .read_to_end(&mut buffer),
        )
        .await
        .context("Read timed out")?
        .context("Failed to receive the response")?;

        if buffer.is_empty() {
            anyhow::bail!("The daemon sent no response");
        }

        let response: IpcResponse =
            serde_json::from_slice(&buffer).context("Failed to parse the response")?;

        Ok(response)
    }
}

// ============================================================================
// Tests
// ============================================================================
