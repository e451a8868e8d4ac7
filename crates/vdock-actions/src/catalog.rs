//! The static catalog of built-in action types.

use serde_json::Value;
use vdock_core::ActionConfig;

use crate::actions::time::ClockMode;
use crate::host::MetricKind;

/// Every built-in action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Url,
    Program,
    Command,
    Hotkey,
    MultiAction,
    Macro,
    System,
    /// Alias of `System`.
    SystemControl,
    CrossPlatform,
    Metric(MetricKind),
    Time(ClockMode),
    NextPage,
    PreviousPage,
}

impl ActionKind {
    pub const ALL: [ActionKind; 21] = [
        ActionKind::Url,
        ActionKind::Program,
        ActionKind::Command,
        ActionKind::Hotkey,
        ActionKind::MultiAction,
        ActionKind::Macro,
        ActionKind::System,
        ActionKind::SystemControl,
        ActionKind::CrossPlatform,
        ActionKind::Metric(MetricKind::CpuUsage),
        ActionKind::Metric(MetricKind::Memory),
        ActionKind::Metric(MetricKind::Disk),
        ActionKind::Metric(MetricKind::Network),
        ActionKind::Metric(MetricKind::Temperature),
        ActionKind::Metric(MetricKind::Battery),
        ActionKind::Time(ClockMode::WorldClock),
        ActionKind::Time(ClockMode::Timer),
        ActionKind::Time(ClockMode::Countdown),
        ActionKind::Time(ClockMode::Stopwatch),
        ActionKind::NextPage,
        ActionKind::PreviousPage,
    ];

    /// Look up a type string.
    pub fn from_type(action_type: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == action_type)
    }

    /// The canonical type string.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Url => "url",
            ActionKind::Program => "program",
            ActionKind::Command => "command",
            ActionKind::Hotkey => "hotkey",
            ActionKind::MultiAction => "multi_action",
            ActionKind::Macro => "macro",
            ActionKind::System => "system",
            ActionKind::SystemControl => "system_control",
            ActionKind::CrossPlatform => "cross_platform",
            ActionKind::Metric(MetricKind::CpuUsage) => "metric_cpu_usage",
            ActionKind::Metric(MetricKind::Memory) => "metric_memory",
            ActionKind::Metric(MetricKind::Disk) => "metric_disk",
            ActionKind::Metric(MetricKind::Network) => "metric_network",
            ActionKind::Metric(MetricKind::Temperature) => "metric_temperature",
            ActionKind::Metric(MetricKind::Battery) => "metric_battery",
            ActionKind::Time(ClockMode::WorldClock) => "time_world_clock",
            ActionKind::Time(ClockMode::Timer) => "time_timer",
            ActionKind::Time(ClockMode::Countdown) => "time_countdown",
            ActionKind::Time(ClockMode::Stopwatch) => "time_stopwatch",
            ActionKind::NextPage => "next_page",
            ActionKind::PreviousPage => "previous_page",
        }
    }

    /// Inject the fields a prefixed type implies into its config.
    pub fn normalize(self, config: &mut ActionConfig) {
        let (key, value) = match self {
            ActionKind::Metric(metric) => ("metric_type", metric.as_str()),
            ActionKind::Time(mode) => ("action_type", mode.as_str()),
            ActionKind::NextPage => ("action_type", "next_page"),
            ActionKind::PreviousPage => ("action_type", "previous_page"),
            _ => return,
        };
        config.insert(key.to_string(), Value::String(value.to_string()));
    }
}
