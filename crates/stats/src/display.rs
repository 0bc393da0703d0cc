use crate::cema::DecayConstant;
use crate::requirements::StatHistoryRequirements;
use netdash_config::DisplayElementConfig;
pub use netdash_config::DisplayKind;
use netdash_core::{MetricId, MetricRegistry, Result, SampleRate, StatsError, Units};

/// A display element resolved against the metric registry.
///
/// Counters with a decay constant show an exponential moving average;
/// everything else reads the last `sample_count` samples at `sample_rate`.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayElement {
    pub label: String,
    pub kind: DisplayKind,
    pub metrics: Vec<MetricId>,
    pub sample_rate: SampleRate,
    pub sample_count: usize,
    pub decay_constant: Option<DecayConstant>,
    pub significant_digits: u8,
}

impl DisplayElement {
    /// Resolve metric names and validate the element's settings.
    pub fn from_config(config: &DisplayElementConfig, registry: &MetricRegistry) -> Result<Self> {
        let invalid = |reason: &str| {
            StatsError::Config(format!("display element '{}': {reason}", config.label))
        };

        if config.metrics.is_empty() {
            return Err(invalid("lists no metrics"));
        }
        let metrics = config
            .metrics
            .iter()
            .map(|name| registry.lookup(name))
            .collect::<Result<Vec<_>>>()?;

        let decay_constant = config
            .half_life
            .map(DecayConstant::from_half_life)
            .transpose()?;

        match config.kind {
            DisplayKind::Counter => {
                if decay_constant.is_none() && config.sample_count == 0 {
                    return Err(invalid("counters need a half_life or a sample_count"));
                }
            }
            DisplayKind::LineGraph | DisplayKind::StackedAreaGraph => {
                if decay_constant.is_some() {
                    return Err(invalid("half_life only applies to counters"));
                }
                if config.sample_count == 0 {
                    return Err(invalid("graphs need a sample_count"));
                }
            }
        }

        Ok(Self {
            label: config.label.clone(),
            kind: config.kind,
            metrics,
            sample_rate: config.sample_rate,
            sample_count: config.sample_count,
            decay_constant,
            significant_digits: config.significant_digits,
        })
    }

    pub fn resolve_all(
        configs: &[DisplayElementConfig],
        registry: &MetricRegistry,
    ) -> Result<Vec<Self>> {
        configs
            .iter()
            .map(|config| Self::from_config(config, registry))
            .collect()
    }

    /// History this element needs for each of its metrics.
    pub fn requirements(&self) -> StatHistoryRequirements {
        let mut requirements = StatHistoryRequirements::new();
        match self.decay_constant {
            // Only counters carry a decay constant.
            Some(decay) => requirements.require_decay_constant(decay),
            None => requirements.require_sample_count(self.sample_rate, self.sample_count),
        }
        requirements
    }

    /// `true` when every metric of the element is shown as a percentage.
    pub fn display_as_percentage(&self) -> bool {
        !self.metrics.is_empty() && self.metrics.iter().all(MetricId::display_as_percentage)
    }

    /// Units of the displayed value, taken from the first metric.
    pub fn display_units(&self) -> Units {
        self.metrics
            .first()
            .map(MetricId::display_units)
            .unwrap_or_default()
    }
}
