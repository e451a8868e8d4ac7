//! VDock action handlers.
//!
//! A descriptor names an action type and carries a JSON config. The
//! [`ActionExecutor`] looks the type up in the built-in catalog, validates
//! the config with the matching handler and runs it, always producing an
//! [`vdock_core::ActionResult`].
//!
//! Handlers touch the host only through [`Services`]: keyboard input,
//! clipboard, launching, metrics and pauses are all injectable, so every
//! action can be exercised without side effects.

pub mod actions;
mod catalog;
mod error;
mod executor;
mod handler;
pub mod host;
mod services;

pub use catalog::ActionKind;
pub use error::{ActionError, InputError};
pub use executor::ActionExecutor;
pub use handler::ActionHandler;
pub use services::Services;
