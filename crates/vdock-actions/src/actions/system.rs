//! Volume and media control through media keys.

use serde::Deserialize;
use vdock_core::{ActionConfig, ActionResult, ErrorCode};

use crate::actions::hotkey::press_keys;
use crate::error::ActionError;
use crate::handler::{describe_field, parse_settings, title_case, ActionHandler};
use crate::host::{Key, NamedKey};
use crate::services::Services;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SystemOp {
    VolumeUp,
    VolumeDown,
    VolumeMute,
    VolumeSet,
    MediaPlayPause,
    MediaNext,
    MediaPrevious,
    MediaStop,
}

impl SystemOp {
    fn media_key(self) -> Option<NamedKey> {
        match self {
            SystemOp::VolumeUp => Some(NamedKey::VolumeUp),
            SystemOp::VolumeDown => Some(NamedKey::VolumeDown),
            SystemOp::VolumeMute => Some(NamedKey::VolumeMute),
            SystemOp::VolumeSet => None,
            SystemOp::MediaPlayPause => Some(NamedKey::MediaPlayPause),
            SystemOp::MediaNext => Some(NamedKey::MediaNext),
            SystemOp::MediaPrevious => Some(NamedKey::MediaPrevious),
            SystemOp::MediaStop => Some(NamedKey::MediaStop),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SystemSettings {
    action: SystemOp,
}

/// Handles `system` and `system_control` descriptors.
pub struct SystemAction<'a> {
    config: ActionConfig,
    services: &'a Services,
}

impl<'a> SystemAction<'a> {
    pub fn new(config: ActionConfig, services: &'a Services) -> Self {
        Self { config, services }
    }

    fn op(&self) -> Result<SystemOp, ActionError> {
        let settings: SystemSettings = parse_settings(&self.config)?;
        if settings.action != SystemOp::VolumeSet && self.services.input.is_none() {
            return Err(ActionError::InputUnavailable);
        }
        Ok(settings.action)
    }
}

impl ActionHandler for SystemAction<'_> {
    fn validate(&self) -> Result<(), ActionError> {
        self.op().map(|_| ())
    }

    fn execute(&self) -> ActionResult {
        let op = match self.op() {
            Ok(op) => op,
            Err(e) => return e.into(),
        };
        let Some(key) = op.media_key() else {
            return ActionResult::failure(
                "Volume set requires direct audio control. Use volume_up/down instead.",
            )
            .with_code(ErrorCode::SystemNotSupported);
        };

        let keys = [Key::Named(key)];
        let delay = self.services.composite.key_delay();
        match press_keys(self.services, &keys, delay) {
            Ok(()) => ActionResult::ok(format!("Sent hotkey: {}", keys[0])),
            Err(e) => ActionResult::failure(format!("Failed to send hotkey: {e}"))
                .with_code(ErrorCode::HotkeySendFailed),
        }
    }

    fn describe(&self) -> String {
        format!("System: {}", title_case(describe_field(&self.config, "action")))
    }
}
