//! Plugin registry, discovery and routing of plugin actions.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use vdock_core::{catch_panic, ActionConfig, ActionResult, ErrorCode, PluginsConfig};

use crate::error::{PluginError, PluginResult};
use crate::lua::LuaPlugin;
use crate::plugin::{Plugin, PluginInfo};

/// Extension of plugin files in the plugin directory.
const PLUGIN_EXTENSION: &str = "lua";

/// One action offered by a plugin, as listed to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginAction {
    pub id: String,
    pub schema: Option<Value>,
}

struct LoadedPlugin {
    plugin: Arc<dyn Plugin>,
    info: PluginInfo,
    enabled: bool,
}

/// Both maps live under one lock so the action index never points at a
/// plugin that is gone.
#[derive(Default)]
struct Registry {
    plugins: BTreeMap<String, LoadedPlugin>,
    /// action id -> plugin id
    actions: HashMap<String, String>,
}

/// Loads plugins and routes plugin actions to them.
///
/// Plugins run with the full privileges of the host process. Loading a
/// plugin is equivalent to running its code.
pub struct PluginManager {
    config: PluginsConfig,
    registry: RwLock<Registry>,
}

impl PluginManager {
    pub fn new(config: PluginsConfig) -> Self {
        Self {
            config,
            registry: RwLock::new(Registry::default()),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    /// Load every plugin file in the plugin directory.
    ///
    /// Files are taken in name order; names starting with `_` are skipped.
    /// A file that fails to load is logged and skipped. Returns the ids of
    /// the plugins that were loaded.
    pub fn load_plugins(&self) -> Vec<String> {
        if !self.config.enabled {
            tracing::debug!("Plugins disabled");
            return Vec::new();
        }
        let dir = &self.config.directory;
        if !dir.is_dir() {
            tracing::debug!("Plugin directory {} does not exist", dir.display());
            return Vec::new();
        }

        let files = match plugin_files(dir) {
            Ok(files) => files,
            Err(e) => {
                tracing::error!("Failed to read plugin directory {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        let mut loaded = Vec::new();
        for path in files {
            match self.load_file(&path) {
                Ok(id) => loaded.push(id),
                Err(e) => tracing::error!("Error loading plugin {}: {}", path.display(), e),
            }
        }
        loaded
    }

    fn load_file(&self, path: &Path) -> PluginResult<String> {
        let plugin = catch_panic(|| LuaPlugin::load(path)).map_err(PluginError::Panicked)??;
        self.register(Arc::new(plugin))
    }

    /// Initialize and register a plugin, returning its id.
    ///
    /// A plugin with the same id replaces the earlier one, which is cleaned
    /// up. Action ids already owned by another plugin are taken over.
    pub fn register(&self, plugin: Arc<dyn Plugin>) -> PluginResult<String> {
        let info = catch_panic(|| plugin.info()).map_err(PluginError::Panicked)?;
        info.validate()?;

        let initialized = catch_panic(|| plugin.initialize()).map_err(PluginError::Panicked)??;
        if !initialized {
            return Err(PluginError::InitializeFailed(info.id.clone()));
        }

        let id = info.id.clone();
        let replaced = {
            let mut registry = self.registry.write();
            let replaced = registry.plugins.remove(&id);
            if replaced.is_some() {
                tracing::warn!("Plugin {} was already loaded, replacing it", id);
                registry.actions.retain(|_, owner| owner != &id);
            }

            for action_id in &info.action_ids {
                if let Some(previous) = registry.actions.insert(action_id.clone(), id.clone()) {
                    if previous != id {
                        tracing::warn!(
                            "Action {} from plugin {} is now handled by plugin {}",
                            action_id,
                            previous,
                            id
                        );
                    }
                }
            }

            tracing::info!("Loaded plugin: {} v{}", info.name, info.version);
            registry.plugins.insert(
                id.clone(),
                LoadedPlugin {
                    plugin,
                    info,
                    enabled: true,
                },
            );
            replaced
        };

        if let Some(old) = replaced {
            cleanup_plugin(&id, old.plugin.as_ref());
        }
        Ok(id)
    }

    /// Info of every loaded plugin, ordered by id.
    pub fn plugins(&self) -> Vec<PluginInfo> {
        self.registry
            .read()
            .plugins
            .values()
            .map(|loaded| loaded.info.clone())
            .collect()
    }

    /// Actions currently routed to `plugin_id`, with their schemas.
    pub fn plugin_actions(&self, plugin_id: &str) -> Option<Vec<PluginAction>> {
        let action_ids: Vec<String> = {
            let registry = self.registry.read();
            let loaded = registry.plugins.get(plugin_id)?;
            loaded
                .info
                .action_ids
                .iter()
                .filter(|action| registry.actions.get(*action).map(String::as_str) == Some(plugin_id))
                .cloned()
                .collect()
        };

        Some(
            action_ids
                .into_iter()
                .map(|id| PluginAction {
                    schema: self.get_action_schema(&id),
                    id,
                })
                .collect(),
        )
    }

    /// Whether `action_id` is routed to some plugin.
    pub fn has_action(&self, action_id: &str) -> bool {
        self.registry.read().actions.contains_key(action_id)
    }

    pub fn is_enabled(&self, plugin_id: &str) -> Option<bool> {
        self.registry.read().plugins.get(plugin_id).map(|p| p.enabled)
    }

    pub fn enable(&self, plugin_id: &str) -> PluginResult<()> {
        self.set_enabled(plugin_id, true)
    }

    /// Stop routing actions to a plugin. The plugin itself is not notified.
    pub fn disable(&self, plugin_id: &str) -> PluginResult<()> {
        self.set_enabled(plugin_id, false)
    }

    fn set_enabled(&self, plugin_id: &str, enabled: bool) -> PluginResult<()> {
        let mut registry = self.registry.write();
        let loaded = registry
            .plugins
            .get_mut(plugin_id)
            .ok_or_else(|| PluginError::NotFound(plugin_id.to_string()))?;
        loaded.enabled = enabled;
        Ok(())
    }

    /// Run a plugin action. Never panics; every failure is a result.
    pub fn execute_plugin_action(&self, action_id: &str, config: &ActionConfig) -> ActionResult {
        let plugin = {
            let registry = self.registry.read();
            let Some(plugin_id) = registry.actions.get(action_id) else {
                return ActionResult::failure(format!("Unknown plugin action: {action_id}"))
                    .with_code(ErrorCode::PluginActionUnknown);
            };
            let Some(loaded) = registry.plugins.get(plugin_id) else {
                return ActionResult::failure(format!("Plugin not found: {plugin_id}"))
                    .with_code(ErrorCode::PluginNotFound);
            };
            if !loaded.enabled {
                return ActionResult::failure(format!("Plugin is disabled: {plugin_id}"))
                    .with_code(ErrorCode::PluginDisabled);
            }
            loaded.plugin.clone()
        };

        tracing::debug!(action_id, "Executing plugin action");
        let error = match catch_panic(|| plugin.execute_action(action_id, config)) {
            Ok(Ok(mut result)) => {
                result.normalize();
                return result;
            }
            Ok(Err(e)) => e.to_string(),
            Err(panic) => {
                tracing::error!(action_id, "Plugin action panicked: {}", panic);
                panic
            }
        };
        ActionResult::failure(format!("Plugin action error: {error}"))
            .with_code(ErrorCode::PluginActionFailed)
    }

    /// Config schema of a plugin action; `None` on any failure.
    pub fn get_action_schema(&self, action_id: &str) -> Option<Value> {
        let plugin = {
            let registry = self.registry.read();
            let plugin_id = registry.actions.get(action_id)?;
            registry.plugins.get(plugin_id)?.plugin.clone()
        };
        match catch_panic(|| plugin.action_schema(action_id)) {
            Ok(Ok(schema)) => schema,
            Ok(Err(e)) => {
                tracing::debug!(action_id, "Schema lookup failed: {}", e);
                None
            }
            Err(_) => None,
        }
    }

    /// Clean up every plugin. Failures are logged and do not stop the others.
    pub fn cleanup(&self) {
        let plugins: Vec<(String, Arc<dyn Plugin>)> = self
            .registry
            .read()
            .plugins
            .iter()
            .map(|(id, loaded)| (id.clone(), loaded.plugin.clone()))
            .collect();
        for (id, plugin) in plugins {
            cleanup_plugin(&id, plugin.as_ref());
        }
    }

    /// Clean up and drop every plugin, then scan the directory again.
    pub fn reload(&self) -> Vec<String> {
        self.cleanup();
        {
            let mut registry = self.registry.write();
            registry.plugins.clear();
            registry.actions.clear();
        }
        self.load_plugins()
    }
}

fn cleanup_plugin(id: &str, plugin: &dyn Plugin) {
    match catch_panic(|| plugin.cleanup()) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("Error cleaning up plugin {}: {}", id, e),
        Err(panic) => tracing::error!("Plugin {} panicked during cleanup: {}", id, panic),
    }
}

fn plugin_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_plugin = path.extension().is_some_and(|ext| ext == PLUGIN_EXTENSION);
        let hidden = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with('_'));
        if path.is_file() && is_plugin && !hidden {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
