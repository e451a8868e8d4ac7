//! The request-handling boundary: one descriptor in, one result out.

use std::sync::Arc;

use serde_json::{json, Value};
use vdock_actions::{ActionExecutor, Services};
use vdock_core::{
    ActionConfig, ActionDescriptor, ActionResult, EngineConfig, ErrorCode, SharedCommandPolicy,
};
use vdock_plugin_api::{Plugin, PluginManager, PluginResult};

/// Descriptor type that addresses a plugin action through `config.action_id`.
const PLUGIN_TYPE: &str = "plugin";

/// Routes descriptors to the built-in executor or to plugins.
///
/// Built-in types take precedence over plugin action ids with the same name.
pub struct Engine {
    executor: ActionExecutor,
    plugins: PluginManager,
    commands: SharedCommandPolicy,
}

impl Engine {
    /// Build an engine on the host's real services. Plugins are not loaded
    /// until [`Engine::load_plugins`] is called.
    pub fn new(config: EngineConfig) -> Self {
        let commands = config.commands.into_shared();
        let services = Services::system(commands.clone(), config.composite);
        Self {
            executor: ActionExecutor::new(services),
            plugins: PluginManager::new(config.plugins),
            commands,
        }
    }

    pub fn load_plugins(&self) -> Vec<String> {
        let loaded = self.plugins.load_plugins();
        tracing::info!("Plugins loaded: {}", loaded.len());
        loaded
    }

    /// Register an in-process plugin.
    pub fn register_plugin(&self, plugin: Arc<dyn Plugin>) -> PluginResult<String> {
        self.plugins.register(plugin)
    }

    pub fn executor(&self) -> &ActionExecutor {
        &self.executor
    }

    pub fn plugins(&self) -> &PluginManager {
        &self.plugins
    }

    /// The live command policy. Changes apply to the next command action.
    pub fn command_policy(&self) -> &SharedCommandPolicy {
        &self.commands
    }

    /// Run a descriptor.
    pub fn handle(&self, descriptor: &ActionDescriptor) -> ActionResult {
        match descriptor.action_type.as_deref() {
            Some(PLUGIN_TYPE) => self.handle_plugin(&descriptor.config),
            Some(action_type)
                if !ActionExecutor::is_supported(action_type)
                    && self.plugins.has_action(action_type) =>
            {
                self.plugins
                    .execute_plugin_action(action_type, &descriptor.config)
            }
            _ => self.executor.execute_action(descriptor),
        }
    }

    /// Run a descriptor given as raw JSON.
    pub fn handle_value(&self, value: &Value) -> ActionResult {
        self.handle(&ActionDescriptor::from_value(value))
    }

    fn handle_plugin(&self, config: &ActionConfig) -> ActionResult {
        let Some(action_id) = config.get("action_id").and_then(Value::as_str) else {
            return ActionResult::failure("Invalid configuration for plugin action")
                .with_code(ErrorCode::ActionValidationFailed)
                .with_details("Missing required field: action_id");
        };
        let mut config = config.clone();
        let action_id = action_id.to_string();
        config.remove("action_id");
        self.plugins.execute_plugin_action(&action_id, &config)
    }

    /// Display text for a descriptor.
    pub fn describe(&self, descriptor: &ActionDescriptor) -> String {
        match descriptor.action_type.as_deref() {
            Some(PLUGIN_TYPE) => {
                let action_id = descriptor
                    .config
                    .get("action_id")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown");
                format!("Plugin: {action_id}")
            }
            Some(action_type)
                if !ActionExecutor::is_supported(action_type)
                    && self.plugins.has_action(action_type) =>
            {
                format!("Plugin: {action_type}")
            }
            _ => self.executor.describe_action(descriptor),
        }
    }

    /// Built-in types followed by plugin action ids.
    pub fn supported_types(&self) -> Vec<String> {
        let mut types: Vec<String> = ActionExecutor::supported_types()
            .into_iter()
            .map(String::from)
            .collect();
        for info in self.plugins.plugins() {
            for id in info.action_ids {
                if self.plugins.has_action(&id) && !types.contains(&id) {
                    types.push(id);
                }
            }
        }
        types
    }

    /// Liveness summary.
    pub fn status(&self) -> Value {
        json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "plugins_loaded": self.plugins.plugins().len(),
            "commands_enabled": self.commands.read().enabled,
        })
    }

    /// Clean up every plugin.
    pub fn shutdown(&self) {
        self.plugins.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::path::PathBuf;
    use vdock_core::PluginsConfig;
    use vdock_plugin_api::PluginInfo;

    /// Records the configs it was called with.
    #[derive(Default)]
    struct EchoPlugin {
        calls: Mutex<Vec<(String, ActionConfig)>>,
    }

    impl Plugin for EchoPlugin {
        fn info(&self) -> PluginInfo {
            PluginInfo {
                id: "echo".to_string(),
                name: "Echo".to_string(),
                version: "1.0.0".to_string(),
                author: String::new(),
                description: String::new(),
                action_ids: vec!["echo_say".to_string(), "next_page".to_string()],
            }
        }

        fn initialize(&self) -> PluginResult<bool> {
            Ok(true)
        }

        fn cleanup(&self) -> PluginResult<()> {
            Ok(())
        }

        fn execute_action(
            &self,
            action_id: &str,
            config: &ActionConfig,
        ) -> PluginResult<ActionResult> {
            self.calls
                .lock()
                .push((action_id.to_string(), config.clone()));
            Ok(ActionResult::ok(format!("echo {action_id}")))
        }

        fn action_schema(&self, _action_id: &str) -> PluginResult<Option<Value>> {
            Ok(None)
        }
    }

    fn engine() -> Engine {
        let mut config = EngineConfig::default();
        config.plugins = PluginsConfig {
            enabled: true,
            directory: PathBuf::from("/nonexistent/vdock/plugins"),
        };
        Engine::new(config)
    }

    fn engine_with_echo() -> (Engine, Arc<EchoPlugin>) {
        let engine = engine();
        let plugin = Arc::new(EchoPlugin::default());
        engine.register_plugin(plugin.clone()).unwrap();
        (engine, plugin)
    }

    #[test]
    fn test_builtin_dispatch() {
        let result = engine().handle_value(&json!({"type": "next_page", "config": {}}));
        assert!(result.success);
        assert_eq!(result.message, "Navigation action: next_page");
    }

    #[test]
    fn test_plugin_type_routes_by_action_id() {
        let (engine, plugin) = engine_with_echo();
        let result = engine.handle_value(&json!({
            "type": "plugin",
            "config": {"action_id": "echo_say", "text": "hi"}
        }));
        assert!(result.success);
        assert_eq!(result.message, "echo echo_say");

        let calls = plugin.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.get("text"), Some(&json!("hi")));
        assert!(calls[0].1.get("action_id").is_none());
    }

    #[test]
    fn test_bare_plugin_action_id() {
        let (engine, _plugin) = engine_with_echo();
        let result = engine.handle_value(&json!({"type": "echo_say", "config": {}}));
        assert_eq!(result.message, "echo echo_say");
    }

    #[test]
    fn test_builtin_wins_over_plugin() {
        let (engine, plugin) = engine_with_echo();
        let result = engine.handle_value(&json!({"type": "next_page", "config": {}}));
        assert_eq!(result.message, "Navigation action: next_page");
        assert!(plugin.calls.lock().is_empty());
    }

    #[test]
    fn test_plugin_type_without_action_id() {
        let result = engine().handle_value(&json!({"type": "plugin", "config": {}}));
        assert!(!result.success);
        assert_eq!(result.error_code, Some(1001));
    }

    #[test]
    fn test_unknown_action_wire_shape() {
        let result = engine().handle_value(&json!({"type": "teleport", "config": {}}));
        insta::assert_snapshot!(
            result.to_value().to_string(),
            @r#"{"success":false,"message":"Unknown action type: teleport","data":{}}"#
        );
    }

    #[test]
    fn test_disabled_commands_wire_shape() {
        let result =
            engine().handle_value(&json!({"type": "command", "config": {"command": "ls"}}));
        insta::assert_snapshot!(
            result.to_value().to_string(),
            @r#"{"success":false,"message":"Invalid configuration for command action","data":{},"error_code":1001,"details":"Command execution is disabled"}"#
        );
    }

    #[test]
    fn test_policy_is_live() {
        let engine = engine();
        engine.command_policy().write().enabled = true;
        engine.command_policy().write().allowlist = vec!["shutdown".to_string()];
        let result = engine.handle_value(&json!({"type": "command", "config": {"command": "ls"}}));
        assert_eq!(
            result.details.as_deref(),
            Some("Command 'ls' is not in the allow-list")
        );
    }

    #[test]
    fn test_describe_and_types() {
        let (engine, _plugin) = engine_with_echo();
        let descriptor = ActionDescriptor::from_value(&json!({
            "type": "plugin",
            "config": {"action_id": "echo_say"}
        }));
        assert_eq!(engine.describe(&descriptor), "Plugin: echo_say");

        let types = engine.supported_types();
        assert!(types.contains(&"echo_say".to_string()));
        assert_eq!(types.iter().filter(|t| *t == "next_page").count(), 1);
        assert_eq!(engine.status()["plugins_loaded"], 1);
    }
}
