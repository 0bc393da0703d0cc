use crate::accumulator::StatsAccumulator;
use crate::history::StatHistory;
use crate::requirements::MultiStatHistoryRequirements;
use netdash_core::{DenseEnumMap, MetricId, MetricKind, RingBuffer, SampleRate};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

/// Every metric's [`StatHistory`] plus the collection timestamps of each
/// sample rate.
#[derive(Debug, Clone, Default)]
pub struct MultiStatHistory {
    data: HashMap<MetricId, StatHistory>,
    /// One slot more than the deepest history, so the time spanned by `n`
    /// samples is known from `n + 1` timestamps.
    timestamps: DenseEnumMap<SampleRate, RingBuffer<f64>>,
}

impl MultiStatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &HashMap<MetricId, StatHistory> {
        &self.data
    }

    pub fn get(&self, metric: MetricId) -> Option<&StatHistory> {
        self.data.get(&metric)
    }

    pub fn timestamps(&self, rate: SampleRate) -> &RingBuffer<f64> {
        &self.timestamps[rate]
    }

    /// Reshape storage to `requirements`, keeping every retained sample and
    /// average that is still needed.
    ///
    /// Must not run between an accumulation and its collection.
    pub fn update_requirements(&mut self, requirements: &MultiStatHistoryRequirements) {
        let before = self.data.len();
        self.data.retain(|&metric, _| requirements.get(metric).is_some());
        let removed = before - self.data.len();

        let mut added = 0;
        for (metric, required) in requirements.iter() {
            match self.data.entry(metric) {
                Entry::Occupied(entry) => entry.into_mut().update_requirements(required),
                Entry::Vacant(entry) => {
                    entry.insert(StatHistory::new(required));
                    added += 1;
                }
            }
        }

        for (rate, timestamps) in self.timestamps.iter_mut() {
            timestamps.set_capacity(requirements.max_sample_count(rate) + 1);
        }

        debug!(
            metrics = self.data.len(),
            added, removed, "updated stat history requirements"
        );
    }

    /// Close the current period at `rate`: stamp `time`, then drain every
    /// metric the accumulator tracks into its history.
    pub fn collect(&mut self, rate: SampleRate, accumulator: &mut StatsAccumulator, time: f64) {
        debug_assert_eq!(accumulator.sample_rate(), rate);

        self.timestamps[rate].push_back(time);

        for i in 0..accumulator.required_metrics().len() {
            let metric = accumulator.required_metrics()[i];
            let Some(value) = accumulator.collect(metric) else {
                continue;
            };
            if let Some(history) = self.data.get_mut(&metric) {
                history.update(metric, rate, value, time);
            }
        }

        accumulator.set_last_collection_time(time);
    }

    /// Mean of the newest `max_sample_count` samples of `metric` at `rate`.
    ///
    /// Gauges give the arithmetic mean. Counters give a rate: the sum of the
    /// samples divided by the time from the start of the oldest one to
    /// `time`. `None` signals insufficient data: no gauge sample, or fewer
    /// than two timestamps for a counter.
    pub fn get_simple_moving_average(
        &self,
        metric: MetricId,
        rate: SampleRate,
        max_sample_count: usize,
        time: f64,
    ) -> Option<f64> {
        let samples = self.data.get(&metric)?.samples(rate);
        match metric.kind() {
            MetricKind::Counter => {
                let timestamps = &self.timestamps[rate];
                let count = max_sample_count
                    .min(samples.len())
                    .min(timestamps.len().saturating_sub(1));
                if count == 0 {
                    return None;
                }
                let start = *timestamps.at(-(count as isize) - 1).ok()?;
                let elapsed = time - start;
                (elapsed > 0.0).then(|| samples.sum_last_n(count) / elapsed)
            }
            MetricKind::Gauge => {
                let count = max_sample_count.min(samples.len());
                (count > 0).then(|| samples.sum_last_n(count) / count as f64)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cema::DecayConstant;
    use crate::requirements::StatHistoryRequirements;
    use netdash_core::{MetricRegistry, NetworkMetric};

    fn needs(rate: SampleRate, count: usize) -> StatHistoryRequirements {
        let mut requirements = StatHistoryRequirements::new();
        requirements.require_sample_count(rate, count);
        requirements
    }

    fn setup(
        metrics: &[(MetricId, StatHistoryRequirements)],
    ) -> (MultiStatHistory, StatsAccumulator, MultiStatHistoryRequirements) {
        let mut requirements = MultiStatHistoryRequirements::new();
        for (metric, needed) in metrics {
            requirements.require(*metric, needed);
        }
        let mut history = MultiStatHistory::new();
        history.update_requirements(&requirements);
        let mut accumulator = StatsAccumulator::new(SampleRate::PerFrame);
        accumulator.update_requirements(&requirements);
        (history, accumulator, requirements)
    }

    #[test]
    fn gauge_end_to_end() {
        let registry = MetricRegistry::with_builtin_families().unwrap();
        let objects = registry.id_of(NetworkMetric::NetworkObjects).unwrap();
        let (mut history, mut accumulator, _) =
            setup(&[(objects, needs(SampleRate::PerFrame, 3))]);

        for (time, value) in [(0.0, 10.0), (1.0, 20.0), (2.0, 30.0), (3.0, 40.0)] {
            accumulator.accumulate(objects, value);
            accumulator.set_last_accumulation_time(time);
            history.collect(SampleRate::PerFrame, &mut accumulator, time);
        }

        let samples = history.get(objects).unwrap().samples(SampleRate::PerFrame);
        assert_eq!(samples.sum_last_n(3), 90.0);
        assert_eq!(samples.average(), Some(30.0));
        assert_eq!(history.timestamps(SampleRate::PerFrame).most_recent(), Some(&3.0));
        assert!(!accumulator.has_accumulated_stats());
        assert_eq!(
            history.get_simple_moving_average(objects, SampleRate::PerFrame, 2, 3.0),
            Some(35.0)
        );
    }

    #[test]
    fn counter_average_is_a_rate() {
        let registry = MetricRegistry::with_builtin_families().unwrap();
        let sent = registry.id_of(NetworkMetric::BytesSent).unwrap();
        let (mut history, mut accumulator, _) = setup(&[(sent, needs(SampleRate::PerFrame, 4))]);

        let rate = |h: &MultiStatHistory, n, t| {
            h.get_simple_moving_average(sent, SampleRate::PerFrame, n, t)
        };

        accumulator.accumulate(sent, 100.0);
        history.collect(SampleRate::PerFrame, &mut accumulator, 0.0);
        assert_eq!(rate(&history, 4, 0.0), None);

        for (time, amount) in [(0.5, 100.0), (1.0, 300.0), (1.5, 200.0)] {
            accumulator.accumulate(sent, amount);
            history.collect(SampleRate::PerFrame, &mut accumulator, time);
        }

        // Last three periods: 600 bytes over 1.5 s.
        assert_eq!(rate(&history, 4, 1.5), Some(400.0));
        // Last period only: 200 bytes over 0.5 s.
        assert_eq!(rate(&history, 1, 1.5), Some(400.0));
        assert_eq!(rate(&history, 2, 1.5), Some(500.0));
        assert_eq!(rate(&history, 0, 1.5), None);
    }

    #[test]
    fn unknown_metric_has_no_average() {
        let registry = MetricRegistry::with_builtin_families().unwrap();
        let sent = registry.id_of(NetworkMetric::BytesSent).unwrap();
        let history = MultiStatHistory::new();
        assert_eq!(
            history.get_simple_moving_average(sent, SampleRate::PerFrame, 5, 1.0),
            None
        );
    }

    #[test]
    fn reconfiguration_adds_drops_and_preserves() {
        let registry = MetricRegistry::with_builtin_families().unwrap();
        let sent = registry.id_of(NetworkMetric::BytesSent).unwrap();
        let rtt = registry.id_of(NetworkMetric::RoundTripTime).unwrap();
        let clients = registry.id_of(NetworkMetric::ConnectedClients).unwrap();
        let decay = DecayConstant::new(0.5).unwrap();

        let mut smoothed = needs(SampleRate::PerFrame, 2);
        smoothed.require_decay_constant(decay);
        let (mut history, mut accumulator, _) =
            setup(&[(sent, needs(SampleRate::PerFrame, 2)), (rtt, smoothed.clone())]);
        assert_eq!(history.timestamps(SampleRate::PerFrame).capacity(), 3);

        for time in [0.0, 1.0] {
            accumulator.accumulate(rtt, 0.1 + time);
            history.collect(SampleRate::PerFrame, &mut accumulator, time);
        }
        let before = history.get(rtt).unwrap().average(decay).unwrap().clone();

        let mut requirements = MultiStatHistoryRequirements::new();
        smoothed.require_sample_count(SampleRate::PerFrame, 6);
        requirements.require(rtt, &smoothed);
        requirements.require(clients, &needs(SampleRate::PerSecond, 10));
        history.update_requirements(&requirements);

        assert!(history.get(sent).is_none());
        assert!(history.get(clients).is_some());
        let rtt_history = history.get(rtt).unwrap();
        assert_eq!(rtt_history.average(decay), Some(&before));
        assert_eq!(rtt_history.samples(SampleRate::PerFrame).len(), 2);
        assert_eq!(history.timestamps(SampleRate::PerFrame).capacity(), 7);
        assert_eq!(history.timestamps(SampleRate::PerFrame).len(), 2);
        assert_eq!(history.timestamps(SampleRate::PerSecond).capacity(), 11);
    }
}
