//! Step-based macros: keystrokes, typing, clicks, pauses and clipboard.
//!
//! Macro steps are a closed language of their own and never go through the
//! action catalog. A failing step is logged and recorded, and the macro keeps
//! going; the macro itself always reports success.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use vdock_core::{ActionConfig, ActionResult};

use crate::actions::hotkey::{join_keys, parse_keys, press_keys};
use crate::error::ActionError;
use crate::handler::ActionHandler;
use crate::host::{send_chord, shortcut, InputSession};
use crate::services::Services;

const STEP_TYPES: [&str; 7] = [
    "hotkey",
    "delay",
    "text",
    "click",
    "clipboard_copy",
    "clipboard_paste",
    "clipboard_set",
];

/// Longest text prefix echoed back in a step message.
const TEXT_PREVIEW: usize = 50;

fn default_delay_ms() -> f64 {
    100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// One step of a macro.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MacroStep {
    Hotkey {
        keys: Vec<String>,
    },
    /// Pause for `delay` milliseconds.
    Delay {
        #[serde(default = "default_delay_ms")]
        delay: f64,
    },
    Text {
        text: String,
    },
    Click {
        #[serde(default)]
        position: Option<Position>,
    },
    ClipboardCopy,
    ClipboardPaste,
    ClipboardSet {
        text: String,
    },
}

pub struct MacroAction<'a> {
    config: ActionConfig,
    services: &'a Services,
}

impl<'a> MacroAction<'a> {
    pub fn new(config: ActionConfig, services: &'a Services) -> Self {
        Self { config, services }
    }

    fn steps(&self) -> Result<&Vec<Value>, ActionError> {
        let steps = self
            .config
            .get("steps")
            .ok_or(ActionError::MissingField("steps"))?
            .as_array()
            .ok_or_else(|| ActionError::InvalidConfig("steps must be a list".to_string()))?;
        if steps.is_empty() {
            return Err(ActionError::InvalidConfig("No macro steps defined".to_string()));
        }
        for (index, step) in steps.iter().enumerate() {
            let step_type = step.get("type").and_then(Value::as_str);
            if !step_type.is_some_and(|t| STEP_TYPES.contains(&t)) {
                return Err(ActionError::InvalidConfig(format!(
                    "step {} has unknown type {}",
                    index + 1,
                    step_type.unwrap_or("<missing>")
                )));
            }
        }
        Ok(steps)
    }

    fn run_step(&self, step: &MacroStep) -> Result<String, ActionError> {
        let key_delay = self.services.composite.key_delay();
        match step {
            MacroStep::Hotkey { keys } => {
                let keys = parse_keys(keys)?;
                press_keys(self.services, &keys, key_delay)?;
                Ok(format!("Sent hotkey: {}", join_keys(&keys)))
            }
            MacroStep::Delay { delay } => {
                let duration = Duration::try_from_secs_f64(delay / 1000.0).map_err(|_| {
                    ActionError::InvalidConfig("delay must be a non-negative number".to_string())
                })?;
                self.services.pause.pause(duration);
                Ok(format!("Delayed {delay}ms"))
            }
            MacroStep::Text { text } => {
                if text.is_empty() {
                    return Err(ActionError::InvalidConfig("No text specified".to_string()));
                }
                self.session()?.text(text)?;
                Ok(format!("Typed text: {}", preview(text)))
            }
            MacroStep::Click { position } => {
                let at = position.map(|p| (p.x, p.y));
                self.session()?.click(at)?;
                Ok(match at {
                    Some((x, y)) => format!("Clicked at ({x}, {y})"),
                    None => "Clicked at current position".to_string(),
                })
            }
            MacroStep::ClipboardCopy => {
                let mut session = self.session()?;
                let pause = self.services.pause.as_ref();
                send_chord(session.as_mut(), &shortcut('c'), key_delay, pause)?;
                Ok("Copied selection".to_string())
            }
            MacroStep::ClipboardPaste => {
                let mut session = self.session()?;
                let pause = self.services.pause.as_ref();
                send_chord(session.as_mut(), &shortcut('v'), key_delay, pause)?;
                Ok("Pasted clipboard".to_string())
            }
            MacroStep::ClipboardSet { text } => {
                self.services.clipboard.set_text(text)?;
                Ok("Clipboard updated".to_string())
            }
        }
    }

    fn session(&self) -> Result<Box<dyn InputSession>, ActionError> {
        let device = self.services.input.as_ref().ok_or(ActionError::InputUnavailable)?;
        Ok(device.open()?)
    }
}

impl ActionHandler for MacroAction<'_> {
    fn validate(&self) -> Result<(), ActionError> {
        self.steps().map(|_| ())
    }

    fn execute(&self) -> ActionResult {
        let steps = match self.steps() {
            Ok(steps) => steps,
            Err(e) => return e.into(),
        };

        let mut results = Vec::with_capacity(steps.len());
        for (index, raw) in steps.iter().enumerate() {
            let step_type = raw.get("type").and_then(Value::as_str).unwrap_or_default();
            let outcome = MacroStep::deserialize(raw)
                .map_err(|e| ActionError::InvalidConfig(e.to_string()))
                .and_then(|step| self.run_step(&step));

            let (success, message) = match outcome {
                Ok(message) => (true, message),
                Err(e) => {
                    tracing::warn!("Macro step {} failed: {}", index + 1, e);
                    (false, e.to_string())
                }
            };
            results.push(json!({
                "step": index + 1,
                "type": step_type,
                "result": {"success": success, "message": message},
            }));
        }

        ActionResult::ok(format!("Macro executed with {} steps", results.len()))
            .with_entry("steps_executed", results.len())
            .with_entry("results", results)
    }

    fn describe(&self) -> String {
        let steps = self
            .config
            .get("steps")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        format!("Macro: {steps} steps")
    }
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(TEXT_PREVIEW) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::Event;
    use crate::services::testing::Harness;

    fn config(value: Value) -> ActionConfig {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_step_parsing() {
        let step: MacroStep = serde_json::from_value(json!({"type": "delay"})).unwrap();
        assert_eq!(step, MacroStep::Delay { delay: 100.0 });

        let step: MacroStep =
            serde_json::from_value(json!({"type": "click", "position": {"x": 5, "y": 9}}))
                .unwrap();
        assert_eq!(
            step,
            MacroStep::Click {
                position: Some(Position { x: 5, y: 9 })
            }
        );

        assert!(serde_json::from_value::<MacroStep>(json!({"type": "text"})).is_err());
    }

    #[test]
    fn test_runs_all_steps_in_order() {
        let harness = Harness::new();
        let action = MacroAction::new(
            config(json!({"steps": [
                {"type": "hotkey", "keys": ["ctrl", "a"]},
                {"type": "delay", "delay": 500},
                {"type": "text", "text": "Hello"},
                {"type": "click"},
                {"type": "clipboard_set", "text": "copied"}
            ]})),
            &harness.services,
        );
        let result = action.execute();

        assert!(result.success);
        assert_eq!(result.message, "Macro executed with 5 steps");
        assert_eq!(result.data["steps_executed"], 5);
        assert_eq!(result.data["results"][1]["result"]["message"], "Delayed 500ms");
        assert_eq!(
            harness.input.events(),
            vec![
                Event::Press("control".into()),
                Event::Press("a".into()),
                Event::Release("a".into()),
                Event::Release("control".into()),
                Event::Text("Hello".into()),
                Event::Click(None),
            ]
        );
        assert_eq!(harness.clipboard.contents.lock().as_deref(), Some("copied"));
        assert!(harness
            .pause
            .calls
            .lock()
            .contains(&Duration::from_millis(500)));
    }

    #[test]
    fn test_failed_step_does_not_fail_macro() {
        let harness = Harness::new().without_input();
        let action = MacroAction::new(
            config(json!({"steps": [
                {"type": "hotkey", "keys": ["ctrl", "c"]},
                {"type": "text", "text": ""},
                {"type": "clipboard_set", "text": "still runs"}
            ]})),
            &harness.services,
        );
        let result = action.execute();

        assert!(result.success);
        assert_eq!(result.message, "Macro executed with 3 steps");
        let results = result.data["results"].as_array().unwrap();
        assert_eq!(results[0]["result"]["success"], false);
        assert_eq!(results[1]["result"]["success"], false);
        assert_eq!(results[2]["result"]["success"], true);
        assert_eq!(results[0]["step"], 1);
        assert_eq!(results[0]["type"], "hotkey");
    }

    #[test]
    fn test_copy_paste_chords() {
        let harness = Harness::new();
        MacroAction::new(
            config(json!({"steps": [{"type": "clipboard_copy"}, {"type": "clipboard_paste"}]})),
            &harness.services,
        )
        .execute();

        let modifier = if cfg!(target_os = "macos") { "meta" } else { "control" };
        let events = harness.input.events();
        assert_eq!(events.len(), 8);
        assert_eq!(events[0], Event::Press(modifier.into()));
        assert_eq!(events[1], Event::Press("c".into()));
        assert_eq!(events[5], Event::Press("v".into()));
    }

    #[test]
    fn test_validation() {
        let harness = Harness::new();
        let invalid = [
            json!({}),
            json!({"steps": []}),
            json!({"steps": "hotkey"}),
            json!({"steps": [{"keys": ["a"]}]}),
            json!({"steps": [{"type": "launch_rocket"}]}),
        ];
        for value in invalid {
            let action = MacroAction::new(config(value.clone()), &harness.services);
            assert!(action.validate().is_err(), "{value}");
        }
    }

    #[test]
    fn test_text_preview() {
        assert_eq!(preview("short"), "short");
        let long = "y".repeat(60);
        assert_eq!(preview(&long), format!("{}...", "y".repeat(50)));
    }
}
