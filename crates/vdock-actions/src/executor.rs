//! Validates, dispatches and runs action descriptors.

use serde_json::Value;
use vdock_core::{catch_panic, ActionConfig, ActionDescriptor, ActionResult, ErrorCode};

use crate::actions::{
    CommandAction, CrossPlatformAction, HotkeyAction, MacroAction, MetricAction, MultiAction,
    NavigationAction, ProgramAction, SystemAction, TimeAction, UrlAction,
};
use crate::catalog::ActionKind;
use crate::error::ActionError;
use crate::handler::ActionHandler;
use crate::services::Services;

/// Entry point for built-in actions.
///
/// `execute_action` never panics and never returns an error: every outcome
/// is an [`ActionResult`].
#[derive(Debug, Clone)]
pub struct ActionExecutor {
    services: Services,
}

impl ActionExecutor {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Run a top-level descriptor.
    pub fn execute_action(&self, descriptor: &ActionDescriptor) -> ActionResult {
        self.execute_at_depth(descriptor, 0)
    }

    /// Parse and run a descriptor given as raw JSON.
    pub fn execute_value(&self, value: &Value) -> ActionResult {
        self.execute_action(&ActionDescriptor::from_value(value))
    }

    /// Whether `action_type` names a built-in action.
    pub fn is_supported(action_type: &str) -> bool {
        ActionKind::from_type(action_type).is_some()
    }

    /// Every type string in the catalog.
    pub fn supported_types() -> Vec<&'static str> {
        ActionKind::ALL.iter().map(|kind| kind.as_str()).collect()
    }

    /// Display text for a descriptor, without executing it.
    pub fn describe_action(&self, descriptor: &ActionDescriptor) -> String {
        let Some(action_type) = descriptor.action_type.as_deref() else {
            return "Unknown action".to_string();
        };
        let Some(kind) = ActionKind::from_type(action_type) else {
            return format!("Unknown action: {action_type}");
        };
        let mut config = descriptor.config.clone();
        kind.normalize(&mut config);
        catch_panic(|| self.build(kind, config, 0).describe())
            .unwrap_or_else(|_| format!("Action: {action_type}"))
    }

    pub(crate) fn execute_at_depth(
        &self,
        descriptor: &ActionDescriptor,
        depth: usize,
    ) -> ActionResult {
        let Some(action_type) = descriptor.action_type.as_deref() else {
            return ActionResult::failure("Action type not specified");
        };
        let Some(kind) = ActionKind::from_type(action_type) else {
            return ActionResult::failure(format!("Unknown action type: {action_type}"));
        };

        let mut config = descriptor.config.clone();
        kind.normalize(&mut config);
        tracing::debug!(action_type, depth, "Executing action");

        let outcome = catch_panic(|| {
            let handler = self.build(kind, config, depth);
            match handler.validate() {
                Ok(()) => handler.execute(),
                Err(e) => invalid_configuration(action_type, &e),
            }
        });

        let mut result = outcome.unwrap_or_else(|panic| {
            tracing::error!(action_type, "Action panicked: {}", panic);
            ActionResult::failure(format!("Error executing action: {panic}"))
        });
        result.normalize();
        result
    }

    fn build<'a>(
        &'a self,
        kind: ActionKind,
        config: ActionConfig,
        depth: usize,
    ) -> Box<dyn ActionHandler + 'a> {
        let services = &self.services;
        match kind {
            ActionKind::Url => Box::new(UrlAction::new(config, services)),
            ActionKind::Program => Box::new(ProgramAction::new(config, services)),
            ActionKind::Command => Box::new(CommandAction::new(config, services)),
            ActionKind::Hotkey => Box::new(HotkeyAction::new(config, services)),
            ActionKind::MultiAction => Box::new(MultiAction::new(config, self, depth)),
            ActionKind::Macro => Box::new(MacroAction::new(config, services)),
            ActionKind::System | ActionKind::SystemControl => {
                Box::new(SystemAction::new(config, services))
            }
            ActionKind::CrossPlatform => Box::new(CrossPlatformAction::new(config, services)),
            ActionKind::Metric(_) => Box::new(MetricAction::new(config, services)),
            ActionKind::Time(_) => Box::new(TimeAction::new(config)),
            ActionKind::NextPage | ActionKind::PreviousPage => {
                Box::new(NavigationAction::new(config))
            }
        }
    }
}

fn invalid_configuration(action_type: &str, err: &ActionError) -> ActionResult {
    // A missing input backend is reported with its own code so clients can
    // tell "fix your config" from "this host cannot do that".
    let code = match err {
        ActionError::InputUnavailable => err.code(),
        _ => ErrorCode::ActionValidationFailed,
    };
    ActionResult::failure(format!("Invalid configuration for {action_type} action"))
        .with_code(code)
        .with_details(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::Harness;
    use serde_json::json;

    fn executor() -> ActionExecutor {
        ActionExecutor::new(Harness::new().services)
    }

    #[test]
    fn test_missing_type() {
        let result = executor().execute_value(&json!({"config": {}}));
        assert!(!result.success);
        assert_eq!(result.message, "Action type not specified");
    }

    #[test]
    fn test_unknown_type() {
        let result = executor().execute_value(&json!({"type": "teleport", "config": {}}));
        assert!(!result.success);
        assert_eq!(result.message, "Unknown action type: teleport");
    }

    #[test]
    fn test_invalid_configuration() {
        let result = executor().execute_value(&json!({"type": "url", "config": {}}));
        assert!(!result.success);
        assert_eq!(result.message, "Invalid configuration for url action");
        assert_eq!(result.error_code, Some(1001));
        assert!(result.details.unwrap().contains("url"));
    }

    #[test]
    fn test_missing_input_backend_has_own_code() {
        let executor = ActionExecutor::new(Harness::new().without_input().services);
        let result = executor.execute_value(&json!({
            "type": "hotkey",
            "config": {"keys": ["ctrl", "c"]}
        }));
        assert!(!result.success);
        assert_eq!(result.message, "Invalid configuration for hotkey action");
        assert_eq!(result.error_code, Some(2002));
    }

    #[test]
    fn test_malformed_configs_never_panic() {
        let executor = executor();
        let garbage = [
            json!(null),
            json!(42),
            json!("string"),
            json!([1, 2, 3]),
            json!({"nested": {"deep": [null]}}),
        ];
        for action_type in ActionExecutor::supported_types() {
            for config in &garbage {
                let result =
                    executor.execute_value(&json!({"type": action_type, "config": config}));
                if !result.success {
                    assert!(!result.message.is_empty(), "{action_type} gave an empty message");
                }
            }
        }
    }

    #[test]
    fn test_normalization_shims() {
        let executor = executor();
        let result = executor.execute_value(&json!({"type": "next_page", "config": {}}));
        assert!(result.success);
        assert_eq!(result.data["action_type"], "next_page");

        let result = executor.execute_value(&json!({
            "type": "time_stopwatch",
            "config": {"action_type": "timer"}
        }));
        assert!(result.success);
        assert_eq!(result.data["display_type"], "stopwatch");
    }

    #[test]
    fn test_system_control_alias() {
        let harness = Harness::new();
        let executor = ActionExecutor::new(harness.services.clone());
        let result = executor.execute_value(&json!({
            "type": "system_control",
            "config": {"action": "volume_up"}
        }));
        assert!(result.success, "{}", result.message);
        assert!(!harness.input.events().is_empty());
    }

    #[test]
    fn test_describe_action() {
        let executor = executor();
        let descriptor = ActionDescriptor::from_value(&json!({
            "type": "url",
            "config": {"url": "example.com"}
        }));
        assert_eq!(executor.describe_action(&descriptor), "Open URL: example.com");

        let descriptor =
            ActionDescriptor::from_value(&json!({"type": "metric_memory", "config": {}}));
        assert_eq!(executor.describe_action(&descriptor), "Metric: Memory");

        let descriptor = ActionDescriptor::from_value(&json!({"type": "bogus"}));
        assert_eq!(executor.describe_action(&descriptor), "Unknown action: bogus");
    }

    #[test]
    fn test_supported_types() {
        let types = ActionExecutor::supported_types();
        assert!(types.contains(&"multi_action"));
        assert!(types.contains(&"system_control"));
        assert!(types.contains(&"metric_battery"));
        assert!(ActionExecutor::is_supported("time_world_clock"));
        assert!(!ActionExecutor::is_supported("plugin"));
    }

    #[test]
    fn test_catalog_order() {
        insta::assert_snapshot!(ActionExecutor::supported_types().join("\n"), @r"
        url
        program
        command
        hotkey
        multi_action
        macro
        system
        system_control
        cross_platform
        metric_cpu_usage
        metric_memory
        metric_disk
        metric_network
        metric_temperature
        metric_battery
        time_world_clock
        time_timer
        time_countdown
        time_stopwatch
        next_page
        previous_page
        ");
    }
}
