//! The plugin capability and its self-reported metadata.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vdock_core::{ActionConfig, ActionResult};

use crate::error::{PluginError, PluginResult};

/// Metadata a plugin reports about itself when it is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub description: String,

    /// Action ids this plugin answers to.
    #[serde(default, rename = "actions", alias = "action_ids")]
    pub action_ids: Vec<String>,
}

impl PluginInfo {
    pub(crate) fn validate(&self) -> PluginResult<()> {
        if self.id.trim().is_empty() {
            return Err(PluginError::InvalidInfo("id must not be empty".to_string()));
        }
        if self.action_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(PluginError::InvalidInfo(format!(
                "plugin {} declares an empty action id",
                self.id
            )));
        }
        Ok(())
    }
}

/// An action provider that extends the built-in catalog.
///
/// Implementations must be shareable across threads; the manager calls
/// them without holding its registry lock.
#[cfg_attr(test, mockall::automock)]
pub trait Plugin: Send + Sync {
    fn info(&self) -> PluginInfo;

    /// Prepare the plugin. Returning `false` rejects it.
    fn initialize(&self) -> PluginResult<bool>;

    fn cleanup(&self) -> PluginResult<()>;

    fn execute_action(&self, action_id: &str, config: &ActionConfig) -> PluginResult<ActionResult>;

    /// JSON schema describing the config of `action_id`, if the plugin has one.
    fn action_schema(&self, action_id: &str) -> PluginResult<Option<Value>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_info_wire_names() {
        let info: PluginInfo = serde_json::from_value(json!({
            "id": "obs",
            "name": "OBS",
            "action_ids": ["obs_record"]
        }))
        .unwrap();
        assert_eq!(info.action_ids, vec!["obs_record"]);
        assert_eq!(info.version, "");

        let wire = serde_json::to_value(&info).unwrap();
        assert_eq!(wire["actions"], json!(["obs_record"]));
        assert!(wire.get("action_ids").is_none());
    }

    #[test]
    fn test_info_validation() {
        let mut info = PluginInfo {
            id: "obs".to_string(),
            name: "OBS".to_string(),
            version: "1.0.0".to_string(),
            author: String::new(),
            description: String::new(),
            action_ids: vec!["obs_record".to_string()],
        };
        assert!(info.validate().is_ok());

        info.action_ids.push(" ".to_string());
        assert!(info.validate().is_err());

        info.action_ids.pop();
        info.id = String::new();
        assert!(info.validate().is_err());
    }
}
