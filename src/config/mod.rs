//! Configuration loading.
//!
//! The controller re-reads its configuration at the moment each operation
//! runs, so edits to the config file take effect without restarting the
//! daemon. Sources implement [`ConfigSource`].

mod error;

pub use error::ConfigError;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::types::PomodoroConfig;

// ============================================================================
// Constants
// ============================================================================

/// Directory under the home directory holding config and socket.
const APP_DIR: &str = ".pomodoro-clock";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Socket file name
const SOCKET_FILE: &str = "pomodoro-clock.sock";

/// Returns `~/.pomodoro-clock/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_DIR).join(CONFIG_FILE))
}

/// Returns `~/.pomodoro-clock/pomodoro-clock.sock`.
pub fn default_socket_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_DIR).join(SOCKET_FILE))
}

// ============================================================================
// ConfigSource
// ============================================================================

/// Something that yields the current, validated configuration.
pub trait ConfigSource {
    /// Loads and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or the values are
    /// out of range.
    fn load(&self) -> Result<PomodoroConfig, ConfigError>;
}

impl ConfigSource for PomodoroConfig {
    fn load(&self) -> Result<PomodoroConfig, ConfigError> {
        self.validate().map_err(ConfigError::Invalid)?;
        Ok(self.clone())
    }
}

/// JSON config file on disk. A missing file yields the defaults.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for ConfigFile {
    fn load(&self) -> Result<PomodoroConfig, ConfigError> {
        let config = match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                    path: self.path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file at {}, using defaults", self.path.display());
                PomodoroConfig::default()
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

/// In-memory configuration that can be changed while a controller holds it.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<Mutex<PomodoroConfig>>,
}

impl SharedConfig {
    pub fn new(config: PomodoroConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(config)),
        }
    }

    /// Applies `f` to the stored configuration.
    pub fn update(&self, f: impl FnOnce(&mut PomodoroConfig)) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard);
    }
}

impl ConfigSource for SharedConfig {
    fn load(&self) -> Result<PomodoroConfig, ConfigError> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.load()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod config_file_tests {
        use super::*;

        #[test]
        fn test_missing_file_yields_defaults() {
            let dir = tempfile::tempdir().unwrap();
            let source = ConfigFile::new(dir.path().join("absent.json"));

            let config = source.load().unwrap();
            assert_eq!(config, PomodoroConfig::default());
        }

        #[test]
        fn test_reads_partial_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.json");
            std::fs::write(&path, r#"{"work_minutes": 45, "auto_continue": true}"#).unwrap();

            let config = ConfigFile::new(&path).load().unwrap();
            assert_eq!(config.work_minutes, 45);
            assert!(config.auto_continue);
            assert_eq!(config.short_break_minutes, 5);
        }

        #[test]
        fn test_rereads_on_every_load() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.json");
            let source = ConfigFile::new(&path);

            std::fs::write(&path, r#"{"work_minutes": 30}"#).unwrap();
            assert_eq!(source.load().unwrap().work_minutes, 30);

            std::fs::write(&path, r#"{"work_minutes": 40}"#).unwrap();
            assert_eq!(source.load().unwrap().work_minutes, 40);
        }

        #[test]
        fn test_malformed_file_is_parse_error() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.json");
            std::fs::write(&path, "{ not json").unwrap();

            let err = ConfigFile::new(&path).load().unwrap_err();
            assert!(matches!(err, ConfigError::Parse { .. }));
        }

        #[test]
        fn test_zero_frequency_is_invalid() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.json");
            std::fs::write(&path, r#"{"long_break_frequency": 0}"#).unwrap();

            let err = ConfigFile::new(&path).load().unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)));
        }
    }

    mod shared_config_tests {
        use super::*;

        #[test]
        fn test_update_is_visible_to_clones() {
            let shared = SharedConfig::new(PomodoroConfig::default());
            let handle = shared.clone();

            handle.update(|config| config.manual_break = true);

            assert!(shared.load().unwrap().manual_break);
        }

        #[test]
        fn test_invalid_update_fails_load() {
            let shared = SharedConfig::default();
            shared.update(|config| config.work_minutes = 0);
            assert!(shared.load().is_err());
        }
    }

    #[test]
    fn test_default_paths_share_directory() {
        if let (Some(config), Some(socket)) = (default_config_path(), default_socket_path()) {
            assert_eq!(config.parent(), socket.parent());
            assert!(config.ends_with(".pomodoro-clock/config.json"));
        }
    }
}
