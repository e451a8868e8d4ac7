//! Configuration types.
//!
//! Loaded from `<config_dir>/vdock/config.toml`. Every section has defaults so
//! a missing file or a partial file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::error::ConfigError;

/// Command policy shared with the engine.
///
/// The engine only ever reads it; whoever owns the handle may update it at
/// runtime and the next validation sees the change.
pub type SharedCommandPolicy = Arc<RwLock<CommandPolicy>>;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub commands: CommandPolicy,

    #[serde(default)]
    pub plugins: PluginsConfig,

    #[serde(default)]
    pub composite: CompositeConfig,
}

/// Gate around arbitrary command execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandPolicy {
    /// Master switch. Commands never run while this is false.
    pub enabled: bool,

    /// Require `confirmed: true` on the descriptor before running.
    pub require_confirmation: bool,

    /// Permitted leading command tokens. Empty means any program.
    pub allowlist: Vec<String>,

    /// Wall-clock limit for a single command.
    pub timeout_secs: u64,
}

impl Default for CommandPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            require_confirmation: true,
            allowlist: Vec::new(),
            timeout_secs: 30,
        }
    }
}

impl CommandPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether `program` passes the allow-list. An empty list allows everything.
    pub fn allows(&self, program: &str) -> bool {
        self.allowlist.is_empty() || self.allowlist.iter().any(|allowed| allowed == program)
    }

    pub fn into_shared(self) -> SharedCommandPolicy {
        Arc::new(RwLock::new(self))
    }
}

/// Plugin discovery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    pub enabled: bool,

    /// Directory scanned for `*.lua` plugin files.
    pub directory: PathBuf,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: config_dir()
                .map(|dir| dir.join("plugins"))
                .unwrap_or_else(|| PathBuf::from("plugins")),
        }
    }
}

/// Timing and nesting limits for composite actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeConfig {
    /// Maximum nesting of multi-actions inside multi-actions.
    pub max_depth: usize,

    /// Pause between multi-action steps when the descriptor sets none.
    pub default_delay_ms: u64,

    /// Pause between individual key events of a hotkey.
    pub key_delay_ms: u64,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            default_delay_ms: 100,
            key_delay_ms: 50,
        }
    }
}

impl CompositeConfig {
    pub fn default_delay(&self) -> Duration {
        Duration::from_millis(self.default_delay_ms)
    }

    pub fn key_delay(&self) -> Duration {
        Duration::from_millis(self.key_delay_ms)
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)?;
        config.check()?;
        tracing::info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file does not
    /// exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("No config at {} - using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Apply `VDOCK_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("VDOCK_ENABLE_PLUGINS").and_then(|v| parse_flag(&v)) {
            self.plugins.enabled = v;
        }
        if let Some(dir) = lookup("VDOCK_PLUGINS_DIR").filter(|d| !d.is_empty()) {
            self.plugins.directory = PathBuf::from(dir);
        }
        if let Some(v) = lookup("VDOCK_ENABLE_COMMANDS").and_then(|v| parse_flag(&v)) {
            self.commands.enabled = v;
        }
        if let Some(v) = lookup("VDOCK_REQUIRE_COMMAND_CONFIRMATION").and_then(|v| parse_flag(&v)) {
            self.commands.require_confirmation = v;
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.composite.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                key: "composite.max_depth".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.commands.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "commands.timeout_secs".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Get the config directory path.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("vdock"))
}

/// Get the path to config.toml.
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}
