//! Plugins written in Lua.
//!
//! Each plugin file runs in its own Lua state with the `vdock` host API
//! installed. The file must leave a global `Plugin` table behind:
//!
//! ```lua
//! Plugin = {
//!     info = { id = "obs", name = "OBS", version = "1.0.0", actions = { "obs_record" } },
//! }
//!
//! function Plugin:execute_action(action_id, config)
//!     return { success = true, message = "Recording" }
//! end
//! ```
//!
//! `info` may instead be provided by a `get_info` method. `initialize`,
//! `cleanup` and `get_action_schema` are optional.

mod convert;
mod host;

use std::fs;
use std::path::Path;

use mlua::{Function, Lua, Table, Value};
use parking_lot::Mutex;
use serde_json::Value as Json;
use vdock_core::{ActionConfig, ActionResult};

use crate::error::{PluginError, PluginResult};
use crate::plugin::{Plugin, PluginInfo};

pub use convert::{json_to_lua_value, lua_value_to_json};
pub use host::register_vdock_api;

/// Global the plugin file must define.
const ENTRY_TABLE: &str = "Plugin";

struct LuaState {
    lua: Lua,
    entry: Table,
}

/// A plugin backed by one Lua state.
///
/// Calls are serialized through a mutex; a plugin never runs on two
/// threads at once.
pub struct LuaPlugin {
    state: Mutex<LuaState>,
    info: PluginInfo,
}

impl LuaPlugin {
    /// Load and run a plugin file.
    pub fn load(path: &Path) -> PluginResult<Self> {
        let code = fs::read_to_string(path).map_err(|source| PluginError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(&code, &path.display().to_string())
    }

    /// Load a plugin from source text. `name` labels it in errors and logs.
    pub fn from_source(code: &str, name: &str) -> PluginResult<Self> {
        let lua = Lua::new();
        register_vdock_api(&lua, name)?;
        lua.load(code).set_name(name).exec()?;

        let entry = match lua.globals().get::<Value>(ENTRY_TABLE)? {
            Value::Table(table) => table,
            _ => return Err(PluginError::MissingEntry(name.to_string())),
        };
        if !matches!(entry.get::<Value>("execute_action")?, Value::Function(_)) {
            return Err(PluginError::MissingCapability("execute_action"));
        }

        let info = read_info(&entry)?;
        Ok(Self {
            state: Mutex::new(LuaState { lua, entry }),
            info,
        })
    }

    /// Call `Plugin:<name>(arg)`. Returns `None` when the method is absent.
    fn call_method(&self, name: &str, arg: Option<&str>) -> PluginResult<Option<Value>> {
        let state = self.state.lock();
        let Some(method) = method(&state.entry, name)? else {
            return Ok(None);
        };
        let value = match arg {
            Some(arg) => method.call::<Value>((state.entry.clone(), arg))?,
            None => method.call::<Value>(state.entry.clone())?,
        };
        Ok(Some(value))
    }
}

fn method(entry: &Table, name: &str) -> PluginResult<Option<Function>> {
    match entry.get::<Value>(name)? {
        Value::Function(f) => Ok(Some(f)),
        Value::Nil => Ok(None),
        _ => Err(PluginError::MissingCapability("callable methods")),
    }
}

fn read_info(entry: &Table) -> PluginResult<PluginInfo> {
    let raw = match entry.get::<Value>("info")? {
        Value::Table(table) => Value::Table(table),
        _ => match method(entry, "get_info")? {
            Some(get_info) => get_info.call::<Value>(entry.clone())?,
            None => return Err(PluginError::MissingCapability("info")),
        },
    };

    let mut json = lua_value_to_json(raw)?;
    // An empty Lua table reads as an object.
    for key in ["actions", "action_ids"] {
        if json.get(key).is_some_and(|v| v.as_object().is_some_and(|m| m.is_empty())) {
            json[key] = Json::Array(Vec::new());
        }
    }

    let info: PluginInfo =
        serde_json::from_value(json).map_err(|e| PluginError::InvalidInfo(e.to_string()))?;
    info.validate()?;
    Ok(info)
}

impl Plugin for LuaPlugin {
    fn info(&self) -> PluginInfo {
        self.info.clone()
    }

    fn initialize(&self) -> PluginResult<bool> {
        match self.call_method("initialize", None)? {
            None => Ok(true),
            Some(value) => Ok(matches!(value, Value::Boolean(true))),
        }
    }

    fn cleanup(&self) -> PluginResult<()> {
        self.call_method("cleanup", None)?;
        Ok(())
    }

    fn execute_action(&self, action_id: &str, config: &ActionConfig) -> PluginResult<ActionResult> {
        let returned = {
            let state = self.state.lock();
            let config = json_to_lua_value(&state.lua, &Json::Object(config.clone()))?;
            let Some(method) = method(&state.entry, "execute_action")? else {
                return Err(PluginError::MissingCapability("execute_action"));
            };
            method.call::<Value>((state.entry.clone(), action_id, config))?
        };

        let json = lua_value_to_json(returned)?;
        ActionResult::from_value(json.clone()).ok_or_else(|| {
            PluginError::InvalidResult(format!("expected a table with a boolean success, got {json}"))
        })
    }

    fn action_schema(&self, action_id: &str) -> PluginResult<Option<Json>> {
        match self.call_method("get_action_schema", Some(action_id))? {
            None | Some(Value::Nil) => Ok(None),
            Some(value) => Ok(Some(lua_value_to_json(value)?)),
        }
    }
}
