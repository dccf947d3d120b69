//! In-process sound player using rodio.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use super::error::SoundError;

/// A sound player that decodes and plays files through rodio.
///
/// Playback is non-blocking; sounds continue playing in the background.
/// The output stream is not `Send`, so the player stays on the thread that
/// created it.
pub struct RodioSoundPlayer {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    /// Handle to the output stream for creating sinks.
    stream_handle: OutputStreamHandle,
}

impl RodioSoundPlayer {
    /// Opens the default audio output device.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new() -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            stream_handle,
        })
    }

    /// Plays a sound file from the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or decoded, or if a
    /// sink cannot be created on the output stream.
    pub fn play(&self, path: &Path) -> Result<(), SoundError> {
        let file = File::open(path)
            .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e)))?;

        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| SoundError::DecodeError(e.to_string()))?;

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| SoundError::StreamError(e.to_string()))?;

        sink.append(decoder);
        sink.detach();

        debug!("Playing {} (detached)", path.display());
        Ok(())
    }
}

impl std::fmt::Debug for RodioSoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundPlayer").finish_non_exhaustive()
    }
}

/// Creates a sound player, returning None if audio is unavailable.
#[must_use]
pub fn try_create_player() -> Option<RodioSoundPlayer> {
    match RodioSoundPlayer::new() {
        Ok(player) => Some(player),
        Err(e) => {
            warn!("In-process audio not available: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests skip themselves in environments without audio hardware.

    #[test]
    fn test_play_missing_file_is_file_error() {
        let player = match RodioSoundPlayer::new() {
            Ok(p) => p,
            Err(_) => return,
        };

        let err = player
            .play(Path::new("/nonexistent/path/to/bell.wav"))
            .unwrap_err();
        assert!(err.is_file_error());
    }

    #[test]
    fn test_play_garbage_is_decode_error() {
        let player = match RodioSoundPlayer::new() {
            Ok(p) => p,
            Err(_) => return,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.wav");
        std::fs::write(&path, b"definitely not audio").unwrap();

        let err = player.play(&path).unwrap_err();
        assert!(matches!(err, SoundError::DecodeError(_)));
    }

    #[test]
    fn test_try_create_player_does_not_panic() {
        let _player = try_create_player();
    }
}
