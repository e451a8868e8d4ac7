//! Core types for the VDock action engine.
//!
//! This crate contains shared data structures that are used across all VDock crates:
//! - Action descriptors and the uniform result envelope
//! - Error codes surfaced to clients
//! - Engine configuration
//! - Process execution with a wall-clock timeout
//! - Panic isolation around foreign code

mod config;
mod descriptor;
mod error;
mod panic;
mod process;
mod result;

pub use config::{
    config_dir, config_file_path, CommandPolicy, CompositeConfig, EngineConfig, PluginsConfig,
    SharedCommandPolicy,
};
pub use descriptor::{ActionConfig, ActionDescriptor};
pub use error::{ConfigError, ProcessError};
pub use panic::{catch_panic, panic_message};
pub use process::{run_with_timeout, ProcessOutput};
pub use result::{ActionResult, ErrorCode};
