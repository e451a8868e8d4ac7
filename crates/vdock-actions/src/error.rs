//! Error types for action handlers.

use thiserror::Error;
use vdock_core::{ActionResult, ErrorCode, ProcessError};

/// Errors raised by host input services (keyboard, mouse, clipboard).
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to initialize input backend: {0}")]
    Init(String),

    #[error("Cannot send key '{0}'")]
    UnsupportedKey(String),

    #[error("Input event failed: {0}")]
    Event(String),

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),
}

/// Errors from validating or executing an action.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Command execution is disabled")]
    CommandsDisabled,

    #[error("Command '{0}' is not in the allow-list")]
    NotAllowed(String),

    #[error("Nesting depth {depth} exceeds the maximum of {max}")]
    DepthExceeded { depth: usize, max: usize },

    #[error("Keyboard control is not available on this host")]
    InputUnavailable,

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("Path does not exist: {0}")]
    PathNotFound(String),

    #[error("Failed to launch '{target}': {source}")]
    Launch {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open '{target}': {source}")]
    Open {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("{0} is not supported on this platform")]
    Unsupported(String),

    #[error("Metrics unavailable: {0}")]
    Metrics(String),
}

impl ActionError {
    /// Map the error onto the numeric code reported to clients.
    pub fn code(&self) -> ErrorCode {
        match self {
            ActionError::MissingField(_) => ErrorCode::ConfigMissingField,
            ActionError::InvalidConfig(_) | ActionError::DepthExceeded { .. } => {
                ErrorCode::ActionValidationFailed
            }
            ActionError::CommandsDisabled | ActionError::NotAllowed(_) => {
                ErrorCode::ActionPermissionDenied
            }
            ActionError::InputUnavailable => ErrorCode::HotkeyLibraryUnavailable,
            ActionError::Input(InputError::UnsupportedKey(_)) => ErrorCode::HotkeyInvalidKey,
            ActionError::Input(_) => ErrorCode::HotkeySendFailed,
            ActionError::Process(ProcessError::TimedOut { .. }) => ErrorCode::ActionTimeout,
            ActionError::Process(e) if e.is_permission_denied() => {
                ErrorCode::ActionPermissionDenied
            }
            ActionError::Process(_) => ErrorCode::ActionExecutionFailed,
            ActionError::PathNotFound(_) => ErrorCode::ProgramNotFound,
            ActionError::Launch { source, .. }
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                ErrorCode::ProgramPermissionDenied
            }
            ActionError::Launch { .. } => ErrorCode::ProgramLaunchFailed,
            ActionError::Open { .. } => ErrorCode::UrlOpenFailed,
            ActionError::UnsupportedScheme(_) => ErrorCode::UrlInvalid,
            ActionError::Unsupported(_) => ErrorCode::SystemNotSupported,
            ActionError::Metrics(_) => ErrorCode::ActionExecutionFailed,
        }
    }
}

impl From<ActionError> for ActionResult {
    fn from(err: ActionError) -> Self {
        ActionResult::failure(err.to_string()).with_code(err.code())
    }
}
