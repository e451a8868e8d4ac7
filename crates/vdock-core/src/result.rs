//! The uniform result envelope returned by every action.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message used when a failure is constructed without one.
const GENERIC_FAILURE: &str = "Action failed";

/// Result returned by action execution.
///
/// Wire shape: `{success, message, data, error_code?, details?}`. `data` is
/// always serialized, even when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub data: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ActionResult {
    /// A successful result with a message and no data.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Map::new(),
            error_code: None,
            details: None,
        }
    }

    /// A failed result. An empty message is replaced with a generic one.
    pub fn failure(message: impl Into<String>) -> Self {
        let mut result = Self {
            success: false,
            message: message.into(),
            data: Map::new(),
            error_code: None,
            details: None,
        };
        result.normalize();
        result
    }

    /// Attach a data map, replacing any existing data.
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    /// Insert a single data entry.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.error_code = Some(code.as_u32());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Enforce the envelope invariant: a failure always carries a message.
    pub fn normalize(&mut self) {
        if !self.success && self.message.trim().is_empty() {
            self.message = GENERIC_FAILURE.to_string();
        }
    }

    /// Parse a result produced by foreign code (plugins).
    ///
    /// Returns `None` when the value lacks a boolean `success` field.
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.get("success").is_some_and(Value::is_boolean) {
            return None;
        }
        let mut result: ActionResult = serde_json::from_value(value).ok()?;
        result.normalize();
        Some(result)
    }

    /// Serialize to the wire representation.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({
                "success": false,
                "message": "Failed to serialize action result",
                "data": {}
            })
        })
    }
}

/// Error codes for common failure scenarios.
///
/// Codes are grouped by area so clients can map them to troubleshooting text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ActionExecutionFailed,
    ActionValidationFailed,
    ActionTimeout,
    ActionPermissionDenied,

    HotkeyInvalidKey,
    HotkeySendFailed,
    HotkeyLibraryUnavailable,

    ProgramNotFound,
    ProgramLaunchFailed,
    ProgramPermissionDenied,

    UrlInvalid,
    UrlOpenFailed,

    SystemCommandFailed,
    SystemPermissionDenied,
    SystemNotSupported,

    ConfigInvalid,
    ConfigMissingField,

    PluginActionUnknown,
    PluginNotFound,
    PluginDisabled,
    PluginActionFailed,
}

impl ErrorCode {
    pub fn as_u32(self) -> u32 {
        match self {
            ErrorCode::ActionExecutionFailed => 1000,
            ErrorCode::ActionValidationFailed => 1001,
            ErrorCode::ActionTimeout => 1002,
            ErrorCode::ActionPermissionDenied => 1003,
            ErrorCode::HotkeyInvalidKey => 2000,
            ErrorCode::HotkeySendFailed => 2001,
            ErrorCode::HotkeyLibraryUnavailable => 2002,
            ErrorCode::ProgramNotFound => 2100,
            ErrorCode::ProgramLaunchFailed => 2101,
            ErrorCode::ProgramPermissionDenied => 2102,
            ErrorCode::UrlInvalid => 2200,
            ErrorCode::UrlOpenFailed => 2201,
            ErrorCode::SystemCommandFailed => 2300,
            ErrorCode::SystemPermissionDenied => 2301,
            ErrorCode::SystemNotSupported => 2302,
            ErrorCode::ConfigInvalid => 2500,
            ErrorCode::ConfigMissingField => 2501,
            ErrorCode::PluginActionUnknown => 2700,
            ErrorCode::PluginNotFound => 2701,
            ErrorCode::PluginDisabled => 2702,
            ErrorCode::PluginActionFailed => 2703,
        }
    }

    /// Short user-facing title for the code.
    pub fn title(self) -> &'static str {
        match self {
            ErrorCode::ActionExecutionFailed => "Action Failed",
            ErrorCode::ActionValidationFailed => "Invalid Configuration",
            ErrorCode::ActionTimeout => "Action Timeout",
            ErrorCode::ActionPermissionDenied => "Permission Denied",
            ErrorCode::HotkeyInvalidKey => "Invalid Hotkey",
            ErrorCode::HotkeySendFailed => "Hotkey Failed",
            ErrorCode::HotkeyLibraryUnavailable => "Keyboard Control Unavailable",
            ErrorCode::ProgramNotFound => "Program Not Found",
            ErrorCode::ProgramLaunchFailed => "Launch Failed",
            ErrorCode::ProgramPermissionDenied => "Permission Denied",
            ErrorCode::UrlInvalid => "Invalid URL",
            ErrorCode::UrlOpenFailed => "Failed to Open URL",
            ErrorCode::SystemCommandFailed => "System Command Failed",
            ErrorCode::SystemPermissionDenied => "Permission Denied",
            ErrorCode::SystemNotSupported => "Not Supported",
            ErrorCode::ConfigInvalid => "Invalid Configuration",
            ErrorCode::ConfigMissingField => "Missing Field",
            ErrorCode::PluginActionUnknown => "Unknown Plugin Action",
            ErrorCode::PluginNotFound => "Plugin Not Found",
            ErrorCode::PluginDisabled => "Plugin Disabled",
            ErrorCode::PluginActionFailed => "Plugin Action Failed",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.title(), self.as_u32())
    }
}
