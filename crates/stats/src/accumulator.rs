use crate::requirements::MultiStatHistoryRequirements;
use netdash_core::{MetricId, MetricKind, SampleRate};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Accumulation {
    sum: f64,
    /// Gauge samples only.
    count: u32,
}

/// Buffers raw samples between two collections at one [`SampleRate`].
///
/// Metrics arrive whenever their source reports them; the accumulator sums
/// them until the rate's clock collects, putting every metric on the same
/// sampling grid.
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    sample_rate: SampleRate,
    stats: HashMap<MetricId, Accumulation>,
    /// Kept materialised so per-frame aggregation never allocates.
    required_metrics: Vec<MetricId>,
    last_accumulation_time: f64,
    last_collection_time: f64,
}

impl StatsAccumulator {
    pub fn new(sample_rate: SampleRate) -> Self {
        Self {
            sample_rate,
            stats: HashMap::new(),
            required_metrics: Vec::new(),
            last_accumulation_time: f64::NEG_INFINITY,
            last_collection_time: f64::NEG_INFINITY,
        }
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Metrics tracked at this rate, in id order.
    pub fn required_metrics(&self) -> &[MetricId] {
        &self.required_metrics
    }

    /// Add a raw sample. Metrics that are not required are ignored.
    pub fn accumulate(&mut self, metric: MetricId, value: f64) {
        let Some(stat) = self.stats.get_mut(&metric) else {
            return;
        };
        stat.sum += value;
        if metric.kind() == MetricKind::Gauge {
            stat.count += 1;
        }
    }

    /// Drain the value accumulated for `metric` since its last collection:
    /// the sum for counters, the mean for gauges (zero when no sample
    /// arrived). `None` if the metric is not required at this rate.
    pub fn collect(&mut self, metric: MetricId) -> Option<f64> {
        let stat = self.stats.get_mut(&metric)?;
        let value = match metric.kind() {
            MetricKind::Counter => stat.sum,
            MetricKind::Gauge => stat.sum / f64::from(stat.count.max(1)),
        };
        *stat = Accumulation::default();
        Some(value)
    }

    /// Track exactly the metrics that need samples at this rate.
    ///
    /// Entries still required keep their pending sums; new ones start at
    /// zero.
    pub fn update_requirements(&mut self, requirements: &MultiStatHistoryRequirements) {
        let rate = self.sample_rate;
        let before = self.stats.len();
        self.stats.retain(|&metric, _| {
            requirements
                .get(metric)
                .is_some_and(|required| required.is_required_at(rate))
        });
        let dropped = before - self.stats.len();

        for (metric, required) in requirements.iter() {
            if required.is_required_at(rate) {
                self.stats.entry(metric).or_default();
            }
        }

        self.required_metrics.clear();
        self.required_metrics.extend(self.stats.keys().copied());
        self.required_metrics.sort_unstable();

        debug!(
            ?rate,
            required = self.required_metrics.len(),
            dropped,
            "updated accumulator requirements"
        );
    }

    /// `true` when a sample arrived after the last collection.
    pub fn has_accumulated_stats(&self) -> bool {
        self.last_accumulation_time > self.last_collection_time
    }

    pub fn last_accumulation_time(&self) -> f64 {
        self.last_accumulation_time
    }

    pub fn set_last_accumulation_time(&mut self, time: f64) {
        self.last_accumulation_time = time;
    }

    pub fn last_collection_time(&self) -> f64 {
        self.last_collection_time
    }

    pub fn set_last_collection_time(&mut self, time: f64) {
        self.last_collection_time = time;
    }
}
