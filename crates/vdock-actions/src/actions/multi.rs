//! Run nested descriptors in sequence.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use vdock_core::{ActionConfig, ActionDescriptor, ActionResult};

use crate::actions::hotkey::seconds;
use crate::error::ActionError;
use crate::executor::ActionExecutor;
use crate::handler::{parse_settings, ActionHandler};

#[derive(Debug, Deserialize)]
struct MultiSettings {
    actions: Vec<Value>,
    /// Seconds between steps.
    #[serde(default)]
    delay: Option<f64>,
    #[serde(default)]
    stop_on_error: bool,
}

/// Executes `actions` one after another through the executor.
///
/// Each step re-enters the executor one level deeper. The whole nested tree
/// is checked against the depth budget before the first step runs.
pub struct MultiAction<'a> {
    config: ActionConfig,
    executor: &'a ActionExecutor,
    depth: usize,
}

impl<'a> MultiAction<'a> {
    pub fn new(config: ActionConfig, executor: &'a ActionExecutor, depth: usize) -> Self {
        Self {
            config,
            executor,
            depth,
        }
    }

    fn settings(&self) -> Result<(MultiSettings, Duration), ActionError> {
        let settings: MultiSettings = parse_settings(&self.config)?;
        let delay = match settings.delay {
            Some(secs) => seconds(secs, "delay")?,
            None => self.executor.services().composite.default_delay(),
        };

        let max = self.executor.services().composite.max_depth;
        let levels = nesting_levels(&settings.actions);
        if self.depth + levels > max {
            return Err(ActionError::DepthExceeded {
                depth: self.depth + levels,
                max,
            });
        }
        Ok((settings, delay))
    }
}

impl ActionHandler for MultiAction<'_> {
    fn validate(&self) -> Result<(), ActionError> {
        self.settings().map(|_| ())
    }

    fn execute(&self) -> ActionResult {
        let (settings, delay) = match self.settings() {
            Ok(parsed) => parsed,
            Err(e) => return e.into(),
        };
        let pause = &self.executor.services().pause;
        let total = settings.actions.len();
        let mut results = Vec::with_capacity(total);
        let mut succeeded = 0;

        for (index, step) in settings.actions.iter().enumerate() {
            let descriptor = ActionDescriptor::from_value(step);
            let result = self.executor.execute_at_depth(&descriptor, self.depth + 1);
            results.push(json!({
                "index": index,
                "success": result.success,
                "message": result.message,
            }));

            if result.success {
                succeeded += 1;
            } else if settings.stop_on_error {
                return ActionResult::failure(format!(
                    "Multi-action stopped at step {}: {}",
                    index + 1,
                    result.message
                ))
                .with_entry("results", results);
            }

            if index + 1 < total {
                pause.pause(delay);
            }
        }

        let message = format!("Executed {total} actions, {succeeded} succeeded");
        let result = if succeeded == total {
            ActionResult::ok(message)
        } else {
            ActionResult::failure(message)
        };
        result.with_entry("results", results)
    }

    fn describe(&self) -> String {
        let steps = self
            .config
            .get("actions")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        format!("Multi-action: {steps} steps")
    }
}

/// Number of multi-action levels in a step list, counting the list's owner
/// as one. Walks the tree with an explicit stack.
fn nesting_levels(actions: &[Value]) -> usize {
    let mut deepest = 1;
    let mut stack: Vec<(&[Value], usize)> = vec![(actions, 1)];

    while let Some((steps, level)) = stack.pop() {
        deepest = deepest.max(level);
        for step in steps {
            if step.get("type").and_then(Value::as_str) != Some("multi_action") {
                continue;
            }
            if let Some(nested) = step
                .get("config")
                .and_then(|config| config.get("actions"))
                .and_then(Value::as_array)
            {
                stack.push((nested.as_slice(), level + 1));
            }
        }
    }
    deepest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MockPause;
    use crate::services::testing::Harness;
    use std::sync::Arc;

    fn executor_with(harness: &Harness) -> ActionExecutor {
        ActionExecutor::new(harness.services.clone())
    }

    fn ok_step() -> Value {
        json!({"type": "next_page", "config": {}})
    }

    fn bad_step() -> Value {
        json!({"type": "teleport", "config": {}})
    }

    fn nested(levels: usize) -> Value {
        let mut descriptor = json!({"type": "multi_action", "config": {"actions": [ok_step()]}});
        for _ in 1..levels {
            descriptor = json!({"type": "multi_action", "config": {"actions": [descriptor]}});
        }
        descriptor
    }

    #[test]
    fn test_all_steps_succeed() {
        let harness = Harness::new();
        let result = executor_with(&harness).execute_value(&json!({
            "type": "multi_action",
            "config": {"actions": [ok_step(), ok_step(), ok_step()]}
        }));
        assert!(result.success);
        assert_eq!(result.message, "Executed 3 actions, 3 succeeded");
        assert_eq!(result.data["results"].as_array().unwrap().len(), 3);
        assert_eq!(result.data["results"][2]["index"], 2);
    }

    #[test]
    fn test_pauses_between_steps_only() {
        let mut pause = MockPause::new();
        pause
            .expect_pause()
            .withf(|d| *d == Duration::from_millis(250))
            .times(2)
            .return_const(());
        let services = Harness::new().services.with_pause(Arc::new(pause));
        let executor = ActionExecutor::new(services);

        let result = executor.execute_value(&json!({
            "type": "multi_action",
            "config": {"actions": [ok_step(), ok_step(), ok_step()], "delay": 0.25}
        }));
        assert!(result.success);
    }

    #[test]
    fn test_default_delay() {
        let harness = Harness::new();
        executor_with(&harness).execute_value(&json!({
            "type": "multi_action",
            "config": {"actions": [ok_step(), ok_step()]}
        }));
        assert_eq!(
            *harness.pause.calls.lock(),
            vec![Duration::from_millis(100)]
        );
    }

    #[test]
    fn test_continue_on_error() {
        let harness = Harness::new();
        let result = executor_with(&harness).execute_value(&json!({
            "type": "multi_action",
            "config": {"actions": [ok_step(), bad_step(), ok_step()]}
        }));
        assert!(!result.success);
        assert_eq!(result.message, "Executed 3 actions, 2 succeeded");
        assert_eq!(result.data["results"][1]["success"], false);
        assert_eq!(harness.pauses(), 2);
    }

    #[test]
    fn test_stop_on_error() {
        let harness = Harness::new();
        let result = executor_with(&harness).execute_value(&json!({
            "type": "multi_action",
            "config": {
                "actions": [ok_step(), bad_step(), ok_step()],
                "stop_on_error": true
            }
        }));
        assert!(!result.success);
        assert_eq!(
            result.message,
            "Multi-action stopped at step 2: Unknown action type: teleport"
        );
        assert_eq!(result.data["results"].as_array().unwrap().len(), 2);
        assert_eq!(harness.pauses(), 1);
    }

    #[test]
    fn test_empty_list_succeeds() {
        let harness = Harness::new();
        let result = executor_with(&harness)
            .execute_value(&json!({"type": "multi_action", "config": {"actions": []}}));
        assert!(result.success);
        assert_eq!(result.message, "Executed 0 actions, 0 succeeded");
        assert_eq!(harness.pauses(), 0);
    }

    #[test]
    fn test_depth_budget() {
        let harness = Harness::new();
        let executor = executor_with(&harness);

        let result = executor.execute_value(&nested(8));
        assert!(result.success, "{}", result.message);

        let result = executor.execute_value(&nested(9));
        assert!(!result.success);
        assert_eq!(result.message, "Invalid configuration for multi_action action");
        assert_eq!(
            result.details.as_deref(),
            Some("Nesting depth 9 exceeds the maximum of 8")
        );
    }

    #[test]
    fn test_far_too_deep_rejected() {
        let harness = Harness::new();
        let result = executor_with(&harness).execute_value(&nested(64));
        assert!(!result.success);
    }

    #[test]
    fn test_nesting_levels() {
        assert_eq!(nesting_levels(&[ok_step()]), 1);
        assert_eq!(nesting_levels(&[ok_step(), nested(3)]), 4);
        assert_eq!(
            nesting_levels(&[json!({"type": "multi_action", "config": "garbage"})]),
            1
        );
    }

    #[test]
    fn test_validation() {
        let harness = Harness::new();
        let executor = executor_with(&harness);
        for config in [json!({}), json!({"actions": "x"}), json!({"actions": [], "delay": -1})] {
            let action = MultiAction::new(config.as_object().cloned().unwrap(), &executor, 0);
            assert!(action.validate().is_err(), "{config}");
        }
    }

    #[test]
    fn test_describe() {
        let harness = Harness::new();
        let executor = executor_with(&harness);
        let config = json!({"actions": [ok_step(), ok_step()]});
        let action = MultiAction::new(config.as_object().cloned().unwrap(), &executor, 0);
        assert_eq!(action.describe(), "Multi-action: 2 steps");
    }
}
