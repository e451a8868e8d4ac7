//! Action descriptors: the `{type, config}` unit submitted for execution.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-action configuration map. Its schema depends on the action type.
pub type ActionConfig = Map<String, Value>;

/// A declarative request to perform an action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,

    #[serde(default)]
    pub config: ActionConfig,
}

impl ActionDescriptor {
    pub fn new(action_type: impl Into<String>, config: ActionConfig) -> Self {
        Self {
            action_type: Some(action_type.into()),
            config,
        }
    }

    /// Build a descriptor from arbitrary JSON without failing.
    ///
    /// A missing, empty or non-string `type` yields `None`; a missing or
    /// non-object `config` yields an empty map.
    pub fn from_value(value: &Value) -> Self {
        let action_type = value
            .get("type")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let config = value
            .get("config")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Self {
            action_type,
            config,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        if let Some(t) = &self.action_type {
            obj.insert("type".to_string(), Value::String(t.clone()));
        }
        obj.insert("config".to_string(), Value::Object(self.config.clone()));
        Value::Object(obj)
    }
}
