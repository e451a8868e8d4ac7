//! Report a system metric from the configured metrics source.

use serde::Deserialize;
use serde_json::Value;
use vdock_core::{ActionConfig, ActionResult};

use crate::error::ActionError;
use crate::handler::{describe_field, finish, parse_settings, title_case, ActionHandler};
use crate::host::MetricKind;
use crate::services::Services;

fn default_refresh() -> Value {
    Value::from(2)
}

#[derive(Debug, Deserialize)]
struct MetricSettings {
    metric_type: String,
    /// Seconds between client refreshes, echoed back untouched.
    #[serde(default = "default_refresh")]
    refresh_interval: Value,
}

pub struct MetricAction<'a> {
    config: ActionConfig,
    services: &'a Services,
}

impl<'a> MetricAction<'a> {
    pub fn new(config: ActionConfig, services: &'a Services) -> Self {
        Self { config, services }
    }

    fn settings(&self) -> Result<(MetricKind, Value), ActionError> {
        let settings: MetricSettings = parse_settings(&self.config)?;
        let kind = MetricKind::parse(&settings.metric_type).ok_or_else(|| {
            ActionError::InvalidConfig(format!("unknown metric type {}", settings.metric_type))
        })?;
        Ok((kind, settings.refresh_interval))
    }

    fn run(&self) -> Result<ActionResult, ActionError> {
        let (kind, refresh_interval) = self.settings()?;
        let reading = self
            .services
            .metrics
            .read(kind)
            .map_err(|e| ActionError::Metrics(format!("{} metrics error: {e}", kind.label())))?;

        Ok(
            ActionResult::ok(format!("{}: {}{}", kind.label(), reading.value, reading.unit))
                .with_entry("metric_type", kind.as_str())
                .with_entry("value", reading.value)
                .with_entry("unit", reading.unit)
                .with_entry("status", reading.status)
                .with_entry("details", reading.details)
                .with_entry("refresh_interval", refresh_interval),
        )
    }
}

impl ActionHandler for MetricAction<'_> {
    fn validate(&self) -> Result<(), ActionError> {
        self.settings().map(|_| ())
    }

    fn execute(&self) -> ActionResult {
        finish(self.run())
    }

    fn describe(&self) -> String {
        let metric = describe_field(&self.config, "metric_type");
        format!("Metric: {}", title_case(metric.strip_prefix("metric_").unwrap_or(metric)))
    }
}
