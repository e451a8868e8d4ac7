//! Send a key combination.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use vdock_core::{ActionConfig, ActionResult, ErrorCode};

use crate::error::ActionError;
use crate::handler::{parse_settings, ActionHandler};
use crate::host::{send_chord, Key};
use crate::services::Services;

#[derive(Debug, Deserialize)]
struct HotkeySettings {
    keys: Vec<String>,
    /// Seconds between key events.
    #[serde(default)]
    delay: Option<f64>,
}

/// Presses `keys` in order and releases them in reverse.
pub struct HotkeyAction<'a> {
    config: ActionConfig,
    services: &'a Services,
}

impl<'a> HotkeyAction<'a> {
    pub fn new(config: ActionConfig, services: &'a Services) -> Self {
        Self { config, services }
    }

    fn settings(&self) -> Result<(Vec<Key>, Duration), ActionError> {
        if self.services.input.is_none() {
            return Err(ActionError::InputUnavailable);
        }
        let settings: HotkeySettings = parse_settings(&self.config)?;
        let keys = parse_keys(&settings.keys)?;
        let delay = match settings.delay {
            Some(secs) => seconds(secs, "delay")?,
            None => self.services.composite.key_delay(),
        };
        Ok((keys, delay))
    }
}

impl ActionHandler for HotkeyAction<'_> {
    fn validate(&self) -> Result<(), ActionError> {
        self.settings().map(|_| ())
    }

    fn execute(&self) -> ActionResult {
        let (keys, delay) = match self.settings() {
            Ok(parsed) => parsed,
            Err(e) => return e.into(),
        };
        let combo = join_keys(&keys);
        match press_keys(self.services, &keys, delay) {
            Ok(()) => ActionResult::ok(format!("Sent hotkey: {combo}")),
            Err(e) => ActionResult::failure(format!("Failed to send hotkey: {e}"))
                .with_code(ErrorCode::HotkeySendFailed),
        }
    }

    fn describe(&self) -> String {
        let keys: Vec<&str> = self
            .config
            .get("keys")
            .and_then(Value::as_array)
            .map(|keys| keys.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        format!("Hotkey: {}", keys.join("+"))
    }
}

/// Map key names to keys. The list must be non-empty and contain no blanks.
pub(crate) fn parse_keys(names: &[String]) -> Result<Vec<Key>, ActionError> {
    if names.is_empty() {
        return Err(ActionError::InvalidConfig("keys must not be empty".to_string()));
    }
    if names.iter().any(|name| name.trim().is_empty()) {
        return Err(ActionError::InvalidConfig("keys must not contain blanks".to_string()));
    }
    Ok(names.iter().map(|name| Key::parse(name.trim())).collect())
}

/// Press a chord on a fresh input session.
pub(crate) fn press_keys(
    services: &Services,
    keys: &[Key],
    delay: Duration,
) -> Result<(), ActionError> {
    let device = services.input.as_ref().ok_or(ActionError::InputUnavailable)?;
    let mut session = device.open()?;
    send_chord(session.as_mut(), keys, delay, services.pause.as_ref())?;
    Ok(())
}

pub(crate) fn join_keys(keys: &[Key]) -> String {
    keys.iter().map(Key::to_string).collect::<Vec<_>>().join("+")
}

/// Convert a user-supplied number of seconds into a duration.
pub(crate) fn seconds(secs: f64, field: &str) -> Result<Duration, ActionError> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| ActionError::InvalidConfig(format!("{field} must be a non-negative number")))
}
