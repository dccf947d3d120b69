//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading the timer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for the expected schema.
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The configuration parsed but violates a range constraint.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Returns true if the config file itself is unreadable or malformed.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Parse { .. })
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Io { .. } => "Check the permissions of the config file",
            Self::Parse { .. } => "Fix the JSON syntax in the config file",
            Self::Invalid(_) => "Adjust the value to the documented range",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::Invalid("long_break_frequency must be at least 1".to_string());
        assert!(err.to_string().contains("long_break_frequency"));

        let err = ConfigError::Io {
            path: PathBuf::from("/tmp/config.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/config.json"));
    }

    #[test]
    fn test_is_file_error() {
        let parse = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(ConfigError::Parse {
            path: PathBuf::from("c.json"),
            source: parse
        }
        .is_file_error());
        assert!(!ConfigError::Invalid("x".into()).is_file_error());
    }

    #[test]
    fn test_suggestion() {
        assert!(ConfigError::Invalid("x".into()).suggestion().contains("range"));
    }
}
