use crate::accumulator::StatsAccumulator;
use crate::aggregator;
use crate::display::DisplayElement;
use crate::moving_average::MovingAverage;
use crate::multi_history::MultiStatHistory;
use crate::requirements::MultiStatHistoryRequirements;
use netdash_core::{DenseEnumMap, MetricId, MetricSnapshot, Result, RingBuffer, SampleRate};
use tracing::debug;

/// Smoothing applied to the measured interval between frame ticks.
const FRAME_INTERVAL_SMOOTHING: f64 = 0.1;

/// Drives the pipeline for a set of display elements.
///
/// Snapshots are aggregated whenever they arrive; each frame tick collects
/// the per-frame accumulator and, once a second has passed, the per-second
/// one. Everything runs on the caller's thread with a caller-supplied clock.
#[derive(Debug)]
pub struct StatsMonitor {
    elements: Vec<DisplayElement>,
    history: MultiStatHistory,
    accumulators: DenseEnumMap<SampleRate, StatsAccumulator>,
    last_per_second_collection: Option<f64>,
    last_tick: Option<f64>,
    frame_interval: MovingAverage,
}

impl StatsMonitor {
    pub fn new(elements: Vec<DisplayElement>) -> Result<Self> {
        let mut monitor = Self {
            elements: Vec::new(),
            history: MultiStatHistory::new(),
            accumulators: DenseEnumMap::from_fn(StatsAccumulator::new),
            last_per_second_collection: None,
            last_tick: None,
            frame_interval: MovingAverage::new(FRAME_INTERVAL_SMOOTHING)?,
        };
        monitor.configure(elements);
        Ok(monitor)
    }

    /// Replace the display elements, reshaping history and accumulators
    /// without losing data that is still required.
    pub fn configure(&mut self, elements: Vec<DisplayElement>) {
        let requirements = MultiStatHistoryRequirements::from_configuration(&elements);
        self.history.update_requirements(&requirements);
        for (_, accumulator) in self.accumulators.iter_mut() {
            accumulator.update_requirements(&requirements);
        }
        debug!(
            elements = elements.len(),
            metrics = requirements.len(),
            "applied display configuration"
        );
        self.elements = elements;
    }

    /// Feed a raw snapshot into every accumulator.
    pub fn aggregate(&mut self, snapshot: &impl MetricSnapshot, time: f64) {
        for (_, accumulator) in self.accumulators.iter_mut() {
            aggregator::aggregate(snapshot, accumulator, time);
        }
    }

    /// Frame clock tick. Returns `true` if a per-frame sample was collected.
    pub fn tick(&mut self, time: f64) -> bool {
        if let Some(last) = self.last_tick {
            self.frame_interval.add_sample(time - last);
        }
        self.last_tick = Some(time);

        let collected = self.collect_if_pending(SampleRate::PerFrame, time);

        match self.last_per_second_collection {
            None => self.last_per_second_collection = Some(time),
            Some(last) if time - last >= 1.0 => {
                self.collect_if_pending(SampleRate::PerSecond, time);
                self.last_per_second_collection = Some(time);
            }
            Some(_) => {}
        }

        collected
    }

    /// Aggregate `snapshot` and tick in one step.
    pub fn update(&mut self, snapshot: &impl MetricSnapshot, time: f64) -> bool {
        self.aggregate(snapshot, time);
        self.tick(time)
    }

    fn collect_if_pending(&mut self, rate: SampleRate, time: f64) -> bool {
        let accumulator = &mut self.accumulators[rate];
        if !accumulator.has_accumulated_stats() {
            return false;
        }
        self.history.collect(rate, accumulator, time);
        true
    }

    pub fn elements(&self) -> &[DisplayElement] {
        &self.elements
    }

    pub fn history(&self) -> &MultiStatHistory {
        &self.history
    }

    pub fn accumulator(&self, rate: SampleRate) -> &StatsAccumulator {
        &self.accumulators[rate]
    }

    /// Smoothed seconds between frame ticks.
    pub fn average_frame_interval(&self) -> Option<f64> {
        self.frame_interval.value()
    }

    /// Value an element displays at `time`: the sum over its metrics, scaled
    /// to percent when every metric is a percentage. `None` when no metric
    /// has enough data.
    pub fn element_value(&self, element: &DisplayElement, time: f64) -> Option<f64> {
        let total = element
            .metrics
            .iter()
            .filter_map(|&metric| self.metric_value(element, metric, time))
            .fold(None, |sum: Option<f64>, value| Some(sum.unwrap_or(0.0) + value))?;

        Some(if element.display_as_percentage() {
            total * 100.0
        } else {
            total
        })
    }

    fn metric_value(&self, element: &DisplayElement, metric: MetricId, time: f64) -> Option<f64> {
        match element.decay_constant {
            Some(decay) => self
                .history
                .get(metric)?
                .average(decay)?
                .value(metric.kind(), time),
            None => self.history.get_simple_moving_average(
                metric,
                element.sample_rate,
                element.sample_count,
                time,
            ),
        }
    }

    /// Retained samples of each of the element's metrics, for graphs.
    pub fn element_series<'a>(
        &'a self,
        element: &'a DisplayElement,
    ) -> impl Iterator<Item = (MetricId, &'a RingBuffer<f64>)> + 'a {
        element.metrics.iter().filter_map(move |&metric| {
            let history = self.history.get(metric)?;
            Some((metric, history.samples(element.sample_rate)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cema::DecayConstant;
    use crate::display::DisplayKind;
    use netdash_core::{HostMetric, MetricCollection, MetricRegistry, NetworkMetric};

    struct Fixture {
        registry: MetricRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                registry: MetricRegistry::with_builtin_families().unwrap(),
            }
        }

        fn id(&self, member: NetworkMetric) -> MetricId {
            self.registry.id_of(member).unwrap()
        }
    }

    fn graph(metric: MetricId, rate: SampleRate, count: usize) -> DisplayElement {
        DisplayElement {
            label: "graph".into(),
            kind: DisplayKind::LineGraph,
            metrics: vec![metric],
            sample_rate: rate,
            sample_count: count,
            decay_constant: None,
            significant_digits: 3,
        }
    }

    fn smoothed(metrics: Vec<MetricId>, half_life: f64) -> DisplayElement {
        DisplayElement {
            label: "smoothed".into(),
            kind: DisplayKind::Counter,
            metrics,
            sample_rate: SampleRate::PerFrame,
            sample_count: 0,
            decay_constant: Some(DecayConstant::from_half_life(half_life).unwrap()),
            significant_digits: 3,
        }
    }

    #[test]
    fn frames_without_data_are_not_samples() {
        let f = Fixture::new();
        let objects = f.id(NetworkMetric::NetworkObjects);
        let mut monitor = StatsMonitor::new(vec![graph(objects, SampleRate::PerFrame, 8)]).unwrap();

        let mut snapshot = MetricCollection::new();
        snapshot.set_gauge(objects, 4.0);
        assert!(monitor.update(&snapshot, 0.0));
        assert!(!monitor.tick(0.1));
        assert!(monitor.update(&snapshot, 0.2));

        let samples = monitor.history().get(objects).unwrap().samples(SampleRate::PerFrame);
        assert_eq!(samples.iter().copied().collect::<Vec<_>>(), vec![4.0, 4.0]);
        assert!((monitor.average_frame_interval().unwrap() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn per_second_collection_spans_a_second() {
        let f = Fixture::new();
        let sent = f.id(NetworkMetric::BytesSent);
        let element = graph(sent, SampleRate::PerSecond, 4);
        let mut monitor = StatsMonitor::new(vec![element.clone()]).unwrap();

        let mut snapshot = MetricCollection::new();
        snapshot.add_counter(sent, 50);
        for frame in 0..=20 {
            monitor.update(&snapshot, f64::from(frame) * 0.25);
        }

        // Collections at t = 1, 2, 3, 4, 5; each second carries four frames.
        let samples = monitor.history().get(sent).unwrap().samples(SampleRate::PerSecond);
        assert_eq!(samples.iter().copied().collect::<Vec<_>>(), vec![200.0; 4]);
        assert_eq!(monitor.element_value(&element, 5.0), Some(200.0));
        assert_eq!(monitor.element_series(&element).count(), 1);
    }

    #[test]
    fn smoothed_counter_sums_metrics() {
        let f = Fixture::new();
        let sent = f.id(NetworkMetric::BytesSent);
        let received = f.id(NetworkMetric::BytesReceived);
        let element = smoothed(vec![sent, received], 0.001);
        let mut monitor = StatsMonitor::new(vec![element.clone()]).unwrap();
        assert_eq!(monitor.element_value(&element, 0.0), None);

        let mut snapshot = MetricCollection::new();
        snapshot.add_counter(sent, 10);
        snapshot.add_counter(received, 30);
        monitor.update(&snapshot, 0.0);
        monitor.update(&snapshot, 1.0);

        // Short half-life: the estimate is the latest rate, 10 + 30 per second.
        let value = monitor.element_value(&element, 1.0).unwrap();
        assert!((value - 40.0).abs() < 1e-6);
    }

    #[test]
    fn percentage_elements_scale() {
        let f = Fixture::new();
        let cpu = f.registry.id_of(HostMetric::CpuUsage).unwrap();
        let element = smoothed(vec![cpu], 1.0);
        let mut monitor = StatsMonitor::new(vec![element.clone()]).unwrap();

        let mut snapshot = MetricCollection::new();
        snapshot.set_gauge(cpu, 0.25);
        monitor.update(&snapshot, 0.0);
        assert_eq!(monitor.element_value(&element, 0.0), Some(25.0));
    }

    #[test]
    fn reconfigure_preserves_shared_metric() {
        let f = Fixture::new();
        let rtt = f.id(NetworkMetric::RoundTripTime);
        let element = smoothed(vec![rtt], 2.0);
        let mut monitor = StatsMonitor::new(vec![element.clone()]).unwrap();

        let mut snapshot = MetricCollection::new();
        for (time, value) in [(0.0, 0.05), (0.5, 0.07), (1.0, 0.06)] {
            snapshot.set_gauge(rtt, value);
            monitor.update(&snapshot, time);
        }
        let before = monitor.element_value(&element, 1.0);

        monitor.configure(vec![element.clone(), graph(rtt, SampleRate::PerFrame, 10)]);
        assert_eq!(monitor.element_value(&element, 1.0), before);
        assert_eq!(monitor.elements().len(), 2);
        assert_eq!(monitor.accumulator(SampleRate::PerFrame).required_metrics(), &[rtt]);

        monitor.configure(Vec::new());
        assert!(monitor.history().data().is_empty());
        assert_eq!(monitor.element_value(&element, 1.0), None);
    }
}
