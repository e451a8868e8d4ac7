//! Host services the actions drive: input injection, clipboard, launcher,
//! metrics and pauses. Each sits behind a trait so tests can substitute it.

mod clipboard;
mod input;
mod launcher;
mod metrics;
#[cfg(feature = "native-input")]
mod native;
mod pause;

pub use clipboard::{ClipboardAccess, SystemClipboard};
pub use input::{send_chord, shortcut, InputDevice, InputSession, Key, KeyDirection, NamedKey};
pub use launcher::{Launcher, SystemLauncher};
pub use metrics::{MetricKind, MetricReading, MetricsSource, NoMetrics};
#[cfg(feature = "native-input")]
pub use native::EnigoInput;
pub use pause::{Pause, ThreadSleep};

#[cfg(test)]
pub use pause::MockPause;

#[cfg(test)]
pub(crate) mod testing {
    pub use super::input::testing::{Event, RecordingInput};
    pub use super::launcher::testing::{Launch, RecordingLauncher};
}
