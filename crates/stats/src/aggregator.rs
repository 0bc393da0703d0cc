use crate::accumulator::StatsAccumulator;
use netdash_core::{MetricKind, MetricSnapshot};

/// Copy every metric `accumulator` requires out of `snapshot`.
///
/// Counters missing from the snapshot fall back to their event count, since
/// some metrics are only ever recorded as discrete events. Gauges missing
/// from the snapshot contribute nothing.
pub fn aggregate(snapshot: &impl MetricSnapshot, accumulator: &mut StatsAccumulator, time: f64) {
    for i in 0..accumulator.required_metrics().len() {
        let metric = accumulator.required_metrics()[i];
        let value = match metric.kind() {
            MetricKind::Counter => Some(
                snapshot
                    .counter(metric)
                    .map(|amount| amount as f64)
                    .unwrap_or_else(|| snapshot.event_count(metric).unwrap_or(0) as f64),
            ),
            MetricKind::Gauge => snapshot.gauge(metric),
        };
        if let Some(value) = value {
            accumulator.accumulate(metric, value);
        }
    }
    accumulator.set_last_accumulation_time(time);
}
