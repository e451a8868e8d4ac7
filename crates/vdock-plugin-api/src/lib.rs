//! Plugin support for the VDock action engine.
//!
//! This crate provides:
//! - The [`Plugin`] capability and the [`PluginInfo`] it reports
//! - [`PluginManager`], which discovers, registers and routes plugin actions
//! - Lua plugins, one isolated Lua state per plugin file

pub mod error;
pub mod lua;
pub mod manager;
pub mod plugin;

pub use error::{PluginError, PluginResult};
pub use lua::LuaPlugin;
pub use manager::{PluginAction, PluginManager};
pub use plugin::{Plugin, PluginInfo};
