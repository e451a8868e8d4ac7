//! The contract every built-in action implements.

use serde::de::DeserializeOwned;
use serde_json::Value;
use vdock_core::{ActionConfig, ActionResult};

use crate::error::ActionError;

/// A single action bound to its configuration.
///
/// Handlers are built fresh for every invocation. Construction and
/// `describe` have no side effects; everything observable happens in
/// `execute`.
pub trait ActionHandler {
    /// Check the configuration without touching the host.
    fn validate(&self) -> Result<(), ActionError>;

    /// Perform the action. Never panics on bad configuration.
    fn execute(&self) -> ActionResult;

    /// Human-readable summary for display.
    fn describe(&self) -> String;
}

/// Deserialize the typed settings of an action from its config map.
pub(crate) fn parse_settings<T: DeserializeOwned>(config: &ActionConfig) -> Result<T, ActionError> {
    serde_json::from_value(Value::Object(config.clone()))
        .map_err(|e| ActionError::InvalidConfig(e.to_string()))
}

/// Collapse a handler outcome into a result envelope.
pub(crate) fn finish(outcome: Result<ActionResult, ActionError>) -> ActionResult {
    outcome.unwrap_or_else(ActionResult::from)
}

/// Read a string field for `describe`, with a placeholder when absent.
pub(crate) fn describe_field<'a>(config: &'a ActionConfig, key: &str) -> &'a str {
    config.get(key).and_then(Value::as_str).unwrap_or("unknown")
}

/// A boolean field that counts only when it is literally `true`.
pub(crate) fn flag(config: &ActionConfig, key: &str) -> bool {
    config.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// `volume_up` -> `Volume Up`.
pub(crate) fn title_case(snake: &str) -> String {
    snake
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Settings {
        #[allow(dead_code)]
        url: String,
    }

    #[test]
    fn test_parse_settings_reports_missing_field() {
        let config = json!({"other": 1}).as_object().cloned().unwrap();
        let err = parse_settings::<Settings>(&config).unwrap_err();
        assert_eq!(err.to_string(), "Invalid configuration: missing field `url`");
    }

    #[test]
    fn test_parse_settings_reports_wrong_type() {
        let config = json!({"url": 5}).as_object().cloned().unwrap();
        assert!(parse_settings::<Settings>(&config).is_err());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("volume_up"), "Volume Up");
        assert_eq!(title_case("lock_screen"), "Lock Screen");
        assert_eq!(title_case(""), "");
    }
}
