//! VDock action engine.
//!
//! [`Engine`] accepts action descriptors and returns result envelopes,
//! routing built-in types to the action executor and everything else to
//! loaded plugins.

pub mod cli;
pub mod engine;
pub mod logging;

pub use engine::Engine;
