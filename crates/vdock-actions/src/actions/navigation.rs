//! Page navigation. The client performs it; the engine only acknowledges.

use serde_json::Value;
use vdock_core::{ActionConfig, ActionResult};

use crate::error::ActionError;
use crate::handler::{title_case, ActionHandler};

const NAVIGATION_ACTIONS: [&str; 6] = [
    "next_page",
    "previous_page",
    "go_to_page",
    "next_scene",
    "previous_scene",
    "go_to_scene",
];

pub struct NavigationAction {
    config: ActionConfig,
}

impl NavigationAction {
    pub fn new(config: ActionConfig) -> Self {
        Self { config }
    }

    fn action_type(&self) -> &str {
        self.config
            .get("action_type")
            .and_then(Value::as_str)
            .unwrap_or("navigation")
    }
}

impl ActionHandler for NavigationAction {
    fn validate(&self) -> Result<(), ActionError> {
        match self.config.get("action_type") {
            None => Ok(()),
            Some(Value::String(t)) if NAVIGATION_ACTIONS.contains(&t.as_str()) => Ok(()),
            Some(other) => Err(ActionError::InvalidConfig(format!(
                "unknown navigation action {other}"
            ))),
        }
    }

    fn execute(&self) -> ActionResult {
        let action_type = self.action_type();
        ActionResult::ok(format!("Navigation action: {action_type}"))
            .with_entry("action_type", action_type)
            .with_entry("frontend_handled", true)
            .with_entry("config", Value::Object(self.config.clone()))
    }

    fn describe(&self) -> String {
        format!("Navigation: {}", title_case(self.action_type()))
    }
}
