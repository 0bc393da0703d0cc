use crate::metric::MetricId;
use std::collections::HashMap;

/// Read-only view of the raw metrics recorded since the last drain.
///
/// Counter values are amounts accumulated over the snapshot's window, not
/// running totals.
pub trait MetricSnapshot {
    fn counter(&self, id: MetricId) -> Option<i64>;

    fn gauge(&self, id: MetricId) -> Option<f64>;

    /// Number of discrete events recorded for `id`, for metrics that are
    /// only ever reported as events.
    fn event_count(&self, _id: MetricId) -> Option<u64> {
        None
    }
}

/// A plain in-memory [`MetricSnapshot`] filled by a telemetry source.
#[derive(Debug, Clone, Default)]
pub struct MetricCollection {
    counters: HashMap<MetricId, i64>,
    gauges: HashMap<MetricId, f64>,
    events: HashMap<MetricId, u64>,
}

impl MetricCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to counter `id`.
    pub fn add_counter(&mut self, id: MetricId, amount: i64) {
        *self.counters.entry(id).or_default() += amount;
    }

    /// Overwrite gauge `id` with its latest reading.
    pub fn set_gauge(&mut self, id: MetricId, value: f64) {
        self.gauges.insert(id, value);
    }

    pub fn record_event(&mut self, id: MetricId) {
        *self.events.entry(id).or_default() += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty() && self.gauges.is_empty() && self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.counters.clear();
        self.gauges.clear();
        self.events.clear();
    }
}

impl MetricSnapshot for MetricCollection {
    fn counter(&self, id: MetricId) -> Option<i64> {
        self.counters.get(&id).copied()
    }

    fn gauge(&self, id: MetricId) -> Option<f64> {
        self.gauges.get(&id).copied()
    }

    fn event_count(&self, id: MetricId) -> Option<u64> {
        self.events.get(&id).copied()
    }
}
