//! System metric readings consumed by metric actions.

use serde_json::{Map, Value};

/// Metric families understood by the metric action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    CpuUsage,
    Memory,
    Disk,
    Network,
    Temperature,
    Battery,
}

impl MetricKind {
    pub const ALL: [MetricKind; 6] = [
        MetricKind::CpuUsage,
        MetricKind::Memory,
        MetricKind::Disk,
        MetricKind::Network,
        MetricKind::Temperature,
        MetricKind::Battery,
    ];

    /// Parse `cpu_usage` or `metric_cpu_usage`.
    pub fn parse(name: &str) -> Option<Self> {
        let base = name.strip_prefix("metric_").unwrap_or(name);
        Self::ALL.into_iter().find(|kind| kind.as_str() == base)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::CpuUsage => "cpu_usage",
            MetricKind::Memory => "memory",
            MetricKind::Disk => "disk",
            MetricKind::Network => "network",
            MetricKind::Temperature => "temperature",
            MetricKind::Battery => "battery",
        }
    }

    /// Short label used in the result message.
    pub fn label(self) -> &'static str {
        match self {
            MetricKind::CpuUsage => "CPU",
            MetricKind::Memory => "RAM",
            MetricKind::Disk => "Disk",
            MetricKind::Network => "Network",
            MetricKind::Temperature => "Temp",
            MetricKind::Battery => "Battery",
        }
    }
}

/// One reading from a metrics source.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricReading {
    pub value: f64,
    pub unit: String,
    /// `normal`, `warning` or `critical`.
    pub status: String,
    pub details: Map<String, Value>,
}

impl MetricReading {
    /// A percentage reading with status derived from 80/95 thresholds.
    pub fn percent(value: f64) -> Self {
        let status = if value < 80.0 {
            "normal"
        } else if value < 95.0 {
            "warning"
        } else {
            "critical"
        };
        Self {
            value,
            unit: "%".to_string(),
            status: status.to_string(),
            details: Map::new(),
        }
    }
}

/// Provider of system metrics. Collection itself lives outside the engine.
pub trait MetricsSource: Send + Sync {
    fn read(&self, kind: MetricKind) -> Result<MetricReading, String>;
}

/// Source used when no collector is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMetrics;

impl MetricsSource for NoMetrics {
    fn read(&self, kind: MetricKind) -> Result<MetricReading, String> {
        Err(format!("no collector configured for {}", kind.as_str()))
    }
}
