//! Error types shared across VDock crates.

use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config directory found.
    #[error("Config directory not found")]
    NoConfigDir,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Serialize error.
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value that parsed but is out of range.
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Errors from running an external process.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The argument vector was empty.
    #[error("No program specified")]
    EmptyCommand,

    /// The process could not be started.
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the child failed.
    #[error("Failed to wait for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process outlived its wall-clock budget and was killed.
    #[error("Command timed out after {} seconds", .timeout.as_secs())]
    TimedOut { timeout: Duration },
}

impl ProcessError {
    /// True when the OS refused to start the program for lack of permission.
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            ProcessError::Spawn { source, .. }
                if source.kind() == std::io::ErrorKind::PermissionDenied
        )
    }

    /// True when the program does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProcessError::Spawn { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
