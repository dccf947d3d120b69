//! Sound playback for timer cues.
//!
//! This module provides the building blocks the dispatcher chains together:
//!
//! - In-process playback through rodio ([`RodioSoundPlayer`])
//! - WSL host and external-player detection ([`PlaybackEnv`])
//! - A [`SoundPlayer`] trait with a mock for tests
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │    Dispatcher    │
//! └────────┬─────────┘
//!          │ enabled + file exists?
//!          ▼
//! ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │  WSL host player │──▶│ RodioSoundPlayer │──▶│ external player  │
//! └──────────────────┘   └──────────────────┘   └────────┬─────────┘
//!                                                        ▼
//!                                               terminal bell (BEL)
//! ```

mod error;
mod host;
mod player;

pub use error::SoundError;
pub use host::{discover_external_player, to_windows_path, PlaybackEnv, WslHost, EXTERNAL_PLAYERS};
pub use player::{try_create_player, RodioSoundPlayer};

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Trait for in-process sound playback implementations.
pub trait SoundPlayer {
    /// Plays the file at `path` without blocking.
    ///
    /// # Errors
    ///
    /// Returns an error if playback fails.
    fn play(&self, path: &Path) -> Result<(), SoundError>;

    /// Returns true if the audio system is available.
    fn is_available(&self) -> bool;
}

impl SoundPlayer for RodioSoundPlayer {
    fn play(&self, path: &Path) -> Result<(), SoundError> {
        RodioSoundPlayer::play(self, path)
    }

    fn is_available(&self) -> bool {
        true
    }
}

impl<T: SoundPlayer + ?Sized> SoundPlayer for Arc<T> {
    fn play(&self, path: &Path) -> Result<(), SoundError> {
        (**self).play(path)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// Mock sound player for testing.
#[derive(Debug)]
pub struct MockSoundPlayer {
    play_calls: Mutex<Vec<PathBuf>>,
    available: AtomicBool,
    should_fail: AtomicBool,
}

impl Default for MockSoundPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            play_calls: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<PathBuf> {
        self.play_calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn clear_calls(&self) {
        self.play_calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play(&self, path: &Path) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::StreamError("mock failure".to_string()));
        }
        self.play_calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.to_path_buf());
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}
