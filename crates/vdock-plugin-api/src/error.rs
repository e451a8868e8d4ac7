//! Error types for plugin loading and execution.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or calling a plugin.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Lua script error.
    #[error("Lua error: {0}")]
    Lua(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The script ran but did not define the `Plugin` table.
    #[error("{0} does not define a global Plugin table")]
    MissingEntry(String),

    #[error("Plugin does not provide {0}")]
    MissingCapability(&'static str),

    #[error("Invalid plugin info: {0}")]
    InvalidInfo(String),

    #[error("Plugin {0} failed to initialize")]
    InitializeFailed(String),

    #[error("Plugin not found: {0}")]
    NotFound(String),

    /// A plugin returned something that is not a result envelope.
    #[error("Invalid action result: {0}")]
    InvalidResult(String),

    /// A host API function was called with bad arguments.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Plugin panicked: {0}")]
    Panicked(String),
}

impl From<mlua::Error> for PluginError {
    fn from(err: mlua::Error) -> Self {
        PluginError::Lua(err.to_string())
    }
}

impl From<PluginError> for mlua::Error {
    fn from(err: PluginError) -> Self {
        mlua::Error::external(err)
    }
}

pub type PluginResult<T> = Result<T, PluginError>;
