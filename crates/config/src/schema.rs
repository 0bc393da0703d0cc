use netdash_core::SampleRate;
use serde::{Deserialize, Serialize};

/// Root configuration structure parsed from `netdash.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Global settings for the sampling loop.
    pub global: GlobalConfig,
    /// Display elements, in the order they are reported.
    pub elements: Vec<DisplayElementConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            global: GlobalConfig::default(),
            elements: vec![
                DisplayElementConfig {
                    half_life: Some(1.0),
                    ..DisplayElementConfig::new("CPU", DisplayKind::Counter, ["host.cpu"])
                },
                DisplayElementConfig {
                    sample_count: 5,
                    sample_rate: SampleRate::PerSecond,
                    ..DisplayElementConfig::new(
                        "Memory",
                        DisplayKind::Counter,
                        ["host.memory_used"],
                    )
                },
                DisplayElementConfig {
                    half_life: Some(2.0),
                    ..DisplayElementConfig::new(
                        "Network",
                        DisplayKind::Counter,
                        ["host.net_rx", "host.net_tx"],
                    )
                },
                DisplayElementConfig {
                    sample_count: 60,
                    ..DisplayElementConfig::new(
                        "Traffic",
                        DisplayKind::StackedAreaGraph,
                        ["host.net_rx", "host.net_tx"],
                    )
                },
            ],
        }
    }
}

/// Global loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Interval between frame ticks (milliseconds).
    pub frame_interval_ms: u64,
    /// Interval between host telemetry samples (milliseconds).
    pub sample_interval_ms: u64,
    /// Interval between log reports of every element (milliseconds).
    pub report_interval_ms: u64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 100,
            sample_interval_ms: 500,
            report_interval_ms: 1_000,
        }
    }
}

/// How a display element presents its metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayKind {
    /// A single smoothed number.
    #[default]
    Counter,
    LineGraph,
    StackedAreaGraph,
}

/// Config block for a single display element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayElementConfig {
    pub label: String,
    #[serde(default)]
    pub kind: DisplayKind,
    /// Qualified metric names, e.g. `"network.bytes_sent"`.
    pub metrics: Vec<String>,
    #[serde(default)]
    pub sample_rate: SampleRate,
    /// Samples retained for graphs and simple-moving-average counters.
    #[serde(default)]
    pub sample_count: usize,
    /// Exponential smoothing half-life in seconds (counters only).
    #[serde(default)]
    pub half_life: Option<f64>,
    #[serde(default = "default_significant_digits")]
    pub significant_digits: u8,
}

fn default_significant_digits() -> u8 {
    3
}

impl DisplayElementConfig {
    pub fn new<I, S>(label: impl Into<String>, kind: DisplayKind, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            kind,
            metrics: metrics.into_iter().map(Into::into).collect(),
            sample_rate: SampleRate::default(),
            sample_count: 0,
            half_life: None,
            significant_digits: default_significant_digits(),
        }
    }
}
