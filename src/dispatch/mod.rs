//! Sound and notification dispatch for timer transitions.
//!
//! Each transition raises a [`Cue`]. The dispatcher looks up the cue's sound
//! settings, picks a playback route, and shows the matching desktop notice.
//! Nothing here can fail a transition: every collaborator problem degrades
//! to the terminal bell or a log line.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::notification::Notifier;
use crate::process::Launcher;
use crate::sound::{PlaybackEnv, SoundPlayer, WslHost};
use crate::types::{PomodoroConfig, SoundEvent};

// ============================================================================
// Cue
// ============================================================================

/// A transition that the user should hear or see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// A work phase started
    Start,
    /// A work phase completed and a break began
    PomodoroFinished { long_break: bool },
    /// A work phase expired in manual-break mode
    Overtime,
    /// The running phase was killed
    Killed,
    /// A break ended
    BreakFinished { long_break: bool, continuing: bool },
    /// Periodic tick while a phase runs
    Tick,
}

impl Cue {
    /// Sound event whose settings apply to this cue.
    pub fn sound_event(&self) -> SoundEvent {
        match self {
            Cue::Start => SoundEvent::Start,
            Cue::PomodoroFinished { .. } => SoundEvent::Pomodoro,
            Cue::Overtime => SoundEvent::Overtime,
            Cue::Killed => SoundEvent::Killed,
            Cue::BreakFinished {
                long_break: false, ..
            } => SoundEvent::ShortBreak,
            Cue::BreakFinished {
                long_break: true, ..
            } => SoundEvent::LongBreak,
            Cue::Tick => SoundEvent::Tick,
        }
    }

    /// Notification `(title, message)`, if this cue shows one.
    pub fn notice(&self) -> Option<(&'static str, &'static str)> {
        match *self {
            Cue::Start | Cue::Tick => None,
            Cue::PomodoroFinished { long_break: false } => {
                Some(("Pomodoro completed!", "Time for a short break."))
            }
            Cue::PomodoroFinished { long_break: true } => {
                Some(("Pomodoro completed!", "Time for a long break."))
            }
            Cue::Overtime => Some((
                "Pomodoro completed. Now on overtime!",
                "Start the break by invoking the timer again.",
            )),
            Cue::Killed => Some(("Pomodoro killed.", "One does not simply kill a pomodoro!")),
            Cue::BreakFinished {
                long_break,
                continuing,
            } => {
                let title = if long_break {
                    "Long break finished."
                } else {
                    "Short break finished."
                };
                let message = if continuing {
                    "Starting the next pomodoro."
                } else {
                    "Ready for another pomodoro?"
                };
                Some((title, message))
            }
        }
    }
}

// ============================================================================
// PlaybackRoute
// ============================================================================

/// How a sound cue ended up being played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackRoute {
    /// Handed to the Windows host from WSL
    WslHost,
    /// Played by the in-process player
    InProcess,
    /// Handed to an external player process
    External(PathBuf),
    /// Terminal bell written to stderr
    Bell,
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Turns cues into sounds and notifications.
pub struct Dispatcher {
    notifier: Box<dyn Notifier>,
    player: Option<Box<dyn SoundPlayer>>,
    launcher: Arc<dyn Launcher>,
    env: PlaybackEnv,
}

impl Dispatcher {
    pub fn new(
        notifier: Box<dyn Notifier>,
        player: Option<Box<dyn SoundPlayer>>,
        launcher: Arc<dyn Launcher>,
        env: PlaybackEnv,
    ) -> Self {
        Self {
            notifier,
            player,
            launcher,
            env,
        }
    }

    /// Plays the cue's sound, then shows its notice.
    pub fn alert(&self, cue: Cue, config: &PomodoroConfig) {
        self.play(cue.sound_event(), config);

        if let Some((title, message)) = cue.notice() {
            if let Err(e) = self.notifier.notify(title, message) {
                warn!("Notification failed: {} ({})", e, e.suggestion());
            }
        }
    }

    /// Plays the sound configured for `event`.
    ///
    /// Returns `None` when the event is disabled, otherwise the route that
    /// took the sound.
    pub fn play(&self, event: SoundEvent, config: &PomodoroConfig) -> Option<PlaybackRoute> {
        let setting = config.sounds.setting(event);
        if !setting.enabled {
            return None;
        }

        let Some(path) = setting.path.as_deref().filter(|p| p.exists()) else {
            warn!("Sound file for {:?} is not configured or missing", event);
            return Some(self.bell());
        };

        if let Some(host) = &self.env.wsl {
            if self.play_on_host(host, path) {
                return Some(PlaybackRoute::WslHost);
            }
        }

        if let Some(player) = self.player.as_ref().filter(|p| p.is_available()) {
            match player.play(path) {
                Ok(()) => return Some(PlaybackRoute::InProcess),
                Err(e) => debug!("In-process playback failed: {} ({})", e, e.suggestion()),
            }
        }

        let external = config
            .audio_player
            .clone()
            .or_else(|| self.env.external_player.clone());
        if let Some(program) = external {
            let mut args = setting.args.clone();
            args.push(path.to_string_lossy().into_owned());
            match self.launcher.launch(&program, &args, &[]) {
                Ok(()) => return Some(PlaybackRoute::External(program)),
                Err(e) => debug!("External player {} failed: {}", program.display(), e),
            }
        }

        warn!("No audio player available for {:?}, ringing the bell", event);
        Some(self.bell())
    }

    fn play_on_host(&self, host: &WslHost, path: &Path) -> bool {
        let windows_path = host.windows_path(path);
        match self.launcher.launch(
            &host.powershell,
            &WslHost::playback_args(&windows_path),
            &[],
        ) {
            Ok(()) => true,
            Err(e) => {
                debug!("WSL host playback failed: {}", e);
                false
            }
        }
    }

    fn bell(&self) -> PlaybackRoute {
        let mut stderr = std::io::stderr();
        if let Err(e) = stderr.write_all(b"\x07").and_then(|()| stderr.flush()) {
            debug!("Failed to ring terminal bell: {}", e);
        }
        PlaybackRoute::Bell
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("has_player", &self.player.is_some())
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
