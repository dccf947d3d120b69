//! Sound system error types.
//!
//! Every error here is recoverable: the dispatcher moves on to the next
//! playback route and ends with the terminal bell.

use thiserror::Error;

/// Errors that can occur in the sound playback system.
#[derive(Debug, Error)]
pub enum SoundError {
    /// Audio device is not available (e.g., no speakers connected).
    #[error("Audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// Sound file was not found at the specified path.
    #[error("Sound file not found: {0}")]
    FileNotFound(String),

    /// Failed to decode the audio file.
    #[error("Failed to decode sound file: {0}")]
    DecodeError(String),

    /// Failed to create the audio output stream.
    #[error("Failed to create audio stream: {0}")]
    StreamError(String),

    /// A player process could not be started.
    #[error("Failed to launch audio player: {0}")]
    LaunchError(String),
}

impl SoundError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_) | Self::StreamError(_))
    }

    /// Returns true if this error is related to the audio file.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::DecodeError(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::DeviceNotAvailable(_) => "Connect an audio output device",
            Self::FileNotFound(_) => "Check the sound path in the config file",
            Self::DecodeError(_) => "The sound file may be corrupt or in an unsupported format",
            Self::StreamError(_) => "Check the system audio settings",
            Self::LaunchError(_) => "Install an audio player or set audio_player in the config",
        }
    }
}
