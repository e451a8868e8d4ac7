//! Host services shared by every handler the executor builds.

use std::sync::Arc;

use vdock_core::{CompositeConfig, SharedCommandPolicy};

use crate::host::{
    ClipboardAccess, InputDevice, Launcher, MetricsSource, NoMetrics, Pause, SystemClipboard,
    SystemLauncher, ThreadSleep,
};

/// Everything an action may touch on the host.
#[derive(Clone)]
pub struct Services {
    /// Command gate, read on every validation.
    pub commands: SharedCommandPolicy,
    pub composite: CompositeConfig,
    /// `None` when no keyboard backend is available.
    pub input: Option<Arc<dyn InputDevice>>,
    pub clipboard: Arc<dyn ClipboardAccess>,
    pub launcher: Arc<dyn Launcher>,
    pub metrics: Arc<dyn MetricsSource>,
    pub pause: Arc<dyn Pause>,
}

impl Services {
    /// Services backed by the real host.
    pub fn system(commands: SharedCommandPolicy, composite: CompositeConfig) -> Self {
        Self {
            commands,
            composite,
            input: native_input(),
            clipboard: Arc::new(SystemClipboard),
            launcher: Arc::new(SystemLauncher),
            metrics: Arc::new(NoMetrics),
            pause: Arc::new(ThreadSleep),
        }
    }

    pub fn with_input(mut self, input: Option<Arc<dyn InputDevice>>) -> Self {
        self.input = input;
        self
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardAccess>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_launcher(mut self, launcher: Arc<dyn Launcher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSource>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_pause(mut self, pause: Arc<dyn Pause>) -> Self {
        self.pause = pause;
        self
    }
}

#[cfg(feature = "native-input")]
fn native_input() -> Option<Arc<dyn InputDevice>> {
    Some(Arc::new(crate::host::EnigoInput))
}

#[cfg(not(feature = "native-input"))]
fn native_input() -> Option<Arc<dyn InputDevice>> {
    tracing::info!("Built without native-input; keyboard actions are unavailable");
    None
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("commands", &*self.commands.read())
            .field("composite", &self.composite)
            .field("input", &self.input.is_some())
            .finish_non_exhaustive()
    }
}
