//! Built-in action handlers.

mod command;
mod cross_platform;
mod hotkey;
mod macro_action;
mod metric;
mod multi;
mod navigation;
mod program;
mod system;
pub(crate) mod time;
mod url;

pub use command::{split_command, CommandAction};
pub use cross_platform::CrossPlatformAction;
pub use hotkey::HotkeyAction;
pub use macro_action::{MacroAction, MacroStep};
pub use metric::MetricAction;
pub use multi::MultiAction;
pub use navigation::NavigationAction;
pub use program::ProgramAction;
pub use system::SystemAction;
pub use time::{ClockMode, TimeAction};
pub use url::UrlAction;
