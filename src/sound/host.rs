//! Playback environment detection.
//!
//! Under WSL the Linux side usually has no audio device, so sounds are
//! handed to the Windows host through `powershell.exe`. Elsewhere an
//! external command-line player is discovered on `PATH`.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::process::{find_executable, is_wsl};

/// Command-line players tried in order when none is configured.
pub const EXTERNAL_PLAYERS: [&str; 4] = ["paplay", "aplay", "afplay", "play"];

/// Fallback location of PowerShell when it is not on `PATH`.
const POWERSHELL_FALLBACK: &str = "/mnt/c/Windows/System32/WindowsPowerShell/v1.0/powershell.exe";

// ============================================================================
// WslHost
// ============================================================================

/// The Windows host reachable from a WSL distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WslHost {
    /// Name of the running distribution, for `\\wsl.localhost` paths
    pub distro: String,
    /// Path to `powershell.exe`
    pub powershell: PathBuf,
}

impl WslHost {
    /// Detects the WSL host, if running under WSL with PowerShell reachable.
    pub fn detect() -> Option<Self> {
        if !is_wsl() {
            return None;
        }
        let powershell = find_executable("powershell.exe").or_else(|| {
            let fallback = PathBuf::from(POWERSHELL_FALLBACK);
            fallback.is_file().then_some(fallback)
        })?;
        let distro = std::env::var("WSL_DISTRO_NAME").unwrap_or_else(|_| "Ubuntu".to_string());
        Some(Self { distro, powershell })
    }

    /// Translates a Linux path to one the Windows host can open.
    ///
    /// Asks `wslpath -w` first and falls back to [`to_windows_path`].
    pub fn windows_path(&self, path: &Path) -> String {
        let translated = Command::new("wslpath")
            .arg("-w")
            .arg(path)
            .output()
            .ok()
            .filter(|output| output.status.success())
            .and_then(|output| String::from_utf8(output.stdout).ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        translated.unwrap_or_else(|| to_windows_path(path, &self.distro))
    }

    /// Arguments for `powershell.exe` that play `windows_path` synchronously.
    pub fn playback_args(windows_path: &str) -> Vec<String> {
        let escaped = windows_path.replace('\'', "''");
        vec![
            "-NoProfile".to_string(),
            "-NonInteractive".to_string(),
            "-Command".to_string(),
            format!("(New-Object Media.SoundPlayer '{}').PlaySync()", escaped),
        ]
    }
}

/// Maps `/mnt/<drive>/...` to `<DRIVE>:\...` and any other absolute path to
/// `\\wsl.localhost\<distro>\...`.
pub fn to_windows_path(path: &Path, distro: &str) -> String {
    let unix = path.to_string_lossy();

    if let Some(rest) = unix.strip_prefix("/mnt/") {
        let mut parts = rest.splitn(2, '/');
        if let Some(drive) = parts.next().filter(|d| d.len() == 1) {
            let tail = parts.next().unwrap_or_default().replace('/', "\\");
            return format!("{}:\\{}", drive.to_uppercase(), tail);
        }
    }

    format!(
        "\\\\wsl.localhost\\{}{}",
        distro,
        unix.replace('/', "\\")
    )
}

// ============================================================================
// PlaybackEnv
// ============================================================================

/// What the host offers for playing sounds outside this process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackEnv {
    /// Windows host when running under WSL
    pub wsl: Option<WslHost>,
    /// First external player found on `PATH`
    pub external_player: Option<PathBuf>,
}

impl PlaybackEnv {
    /// Probes the running system.
    pub fn detect() -> Self {
        let env = Self {
            wsl: WslHost::detect(),
            external_player: discover_external_player(),
        };
        debug!(
            wsl = env.wsl.is_some(),
            player = ?env.external_player,
            "Detected playback environment"
        );
        env
    }

    /// An environment with nothing available, so only the bell remains.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Returns the first of [`EXTERNAL_PLAYERS`] found on `PATH`.
pub fn discover_external_player() -> Option<PathBuf> {
    EXTERNAL_PLAYERS.iter().find_map(|name| find_executable(name))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod path_translation_tests {
        use super::*;

        #[test]
        fn test_mounted_drive_maps_to_drive_letter() {
            let path = Path::new("/mnt/c/Users/me/sounds/bell.wav");
            assert_eq!(
                to_windows_path(path, "Ubuntu"),
                "C:\\Users\\me\\sounds\\bell.wav"
            );
        }

        #[test]
        fn test_linux_path_maps_to_unc_share() {
            let path = Path::new("/home/me/.local/share/pomodoro-clock/sounds/bell.wav");
            assert_eq!(
                to_windows_path(path, "Debian"),
                "\\\\wsl.localhost\\Debian\\home\\me\\.local\\share\\pomodoro-clock\\sounds\\bell.wav"
            );
        }

        #[test]
        fn test_mnt_without_drive_is_linux_path() {
            let path = Path::new("/mnt/data/bell.wav");
            assert_eq!(
                to_windows_path(path, "Ubuntu"),
                "\\\\wsl.localhost\\Ubuntu\\mnt\\data\\bell.wav"
            );
        }
    }

    #[test]
    fn test_playback_args_escape_quotes() {
        let args = WslHost::playback_args("C:\\it's\\bell.wav");
        assert_eq!(args[0], "-NoProfile");
        assert_eq!(
            args[3],
            "(New-Object Media.SoundPlayer 'C:\\it''s\\bell.wav').PlaySync()"
        );
    }

    #[test]
    fn test_none_env_has_nothing() {
        let env = PlaybackEnv::none();
        assert!(env.wsl.is_none());
        assert!(env.external_player.is_none());
    }
}
