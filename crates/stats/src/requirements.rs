use crate::cema::DecayConstant;
use crate::display::DisplayElement;
use netdash_core::{DenseEnumMap, MetricId, SampleRate};
use std::collections::{BTreeSet, HashMap};

/// History one metric must retain: the decay constants of its exponential
/// averages and a minimum sample count per [`SampleRate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatHistoryRequirements {
    decay_constants: BTreeSet<DecayConstant>,
    sample_counts: DenseEnumMap<SampleRate, usize>,
}

impl StatHistoryRequirements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the retained sample count at `rate` to at least `count`.
    pub fn require_sample_count(&mut self, rate: SampleRate, count: usize) {
        let current = &mut self.sample_counts[rate];
        *current = (*current).max(count);
    }

    pub fn require_decay_constant(&mut self, decay_constant: DecayConstant) {
        self.decay_constants.insert(decay_constant);
    }

    /// Pointwise maximum of sample counts, union of decay constants.
    pub fn merge(&mut self, other: &Self) {
        for (rate, &count) in other.sample_counts.iter() {
            self.require_sample_count(rate, count);
        }
        self.decay_constants.extend(other.decay_constants.iter().copied());
    }

    /// Decay constants in ascending order.
    pub fn decay_constants(&self) -> impl ExactSizeIterator<Item = DecayConstant> + '_ {
        self.decay_constants.iter().copied()
    }

    pub fn sample_count(&self, rate: SampleRate) -> usize {
        self.sample_counts[rate]
    }

    /// Whether samples must be collected for this metric at `rate`.
    ///
    /// Exponential averages only consume per-frame samples, so any decay
    /// constant makes the metric required at [`SampleRate::PerFrame`].
    pub fn is_required_at(&self, rate: SampleRate) -> bool {
        self.sample_counts[rate] > 0
            || (rate == SampleRate::PerFrame && !self.decay_constants.is_empty())
    }
}

/// Requirements of every metric referenced by the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiStatHistoryRequirements {
    data: HashMap<MetricId, StatHistoryRequirements>,
}

impl MultiStatHistoryRequirements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the requirements of every element, per metric.
    ///
    /// Two elements watching the same metric share one history sized for
    /// the more demanding of the two.
    pub fn from_configuration(elements: &[DisplayElement]) -> Self {
        let mut requirements = Self::new();
        for element in elements {
            requirements.add_element(element);
        }
        requirements
    }

    pub fn add_element(&mut self, element: &DisplayElement) {
        let needed = element.requirements();
        for &metric in &element.metrics {
            self.require(metric, &needed);
        }
    }

    pub fn require(&mut self, metric: MetricId, requirements: &StatHistoryRequirements) {
        self.data.entry(metric).or_default().merge(requirements);
    }

    pub fn get(&self, metric: MetricId) -> Option<&StatHistoryRequirements> {
        self.data.get(&metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricId, &StatHistoryRequirements)> + '_ {
        self.data.iter().map(|(&metric, requirements)| (metric, requirements))
    }

    /// Largest sample count any metric needs at `rate`.
    pub fn max_sample_count(&self, rate: SampleRate) -> usize {
        self.data
            .values()
            .map(|requirements| requirements.sample_count(rate))
            .max()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayKind;
    use netdash_core::{MetricRegistry, NetworkMetric};

    fn decay(value: f64) -> DecayConstant {
        DecayConstant::new(value).unwrap()
    }

    fn element(metric: MetricId, rate: SampleRate, count: usize) -> DisplayElement {
        DisplayElement {
            label: format!("{count} samples"),
            kind: DisplayKind::LineGraph,
            metrics: vec![metric],
            sample_rate: rate,
            sample_count: count,
            decay_constant: None,
            significant_digits: 3,
        }
    }

    #[test]
    fn merge_takes_max_and_union() {
        let mut a = StatHistoryRequirements::new();
        a.require_sample_count(SampleRate::PerFrame, 5);
        a.require_decay_constant(decay(0.1));

        let mut b = StatHistoryRequirements::new();
        b.require_sample_count(SampleRate::PerFrame, 12);
        b.require_sample_count(SampleRate::PerSecond, 3);
        b.require_decay_constant(decay(0.1));
        b.require_decay_constant(decay(0.5));

        a.merge(&b);
        assert_eq!(a.sample_count(SampleRate::PerFrame), 12);
        assert_eq!(a.sample_count(SampleRate::PerSecond), 3);
        assert_eq!(
            a.decay_constants().collect::<Vec<_>>(),
            vec![decay(0.1), decay(0.5)]
        );
    }

    #[test]
    fn widgets_on_same_metric_share_history() {
        let registry = MetricRegistry::with_builtin_families().unwrap();
        let sent = registry.id_of(NetworkMetric::BytesSent).unwrap();
        let rtt = registry.id_of(NetworkMetric::RoundTripTime).unwrap();

        let mut smoothed = element(sent, SampleRate::PerFrame, 0);
        smoothed.kind = DisplayKind::Counter;
        smoothed.metrics.push(rtt);
        smoothed.decay_constant = Some(decay(0.25));

        let elements = vec![
            element(sent, SampleRate::PerFrame, 5),
            element(sent, SampleRate::PerFrame, 12),
            element(rtt, SampleRate::PerSecond, 30),
            smoothed,
        ];
        let requirements = MultiStatHistoryRequirements::from_configuration(&elements);

        assert_eq!(requirements.len(), 2);
        let sent_req = requirements.get(sent).unwrap();
        assert_eq!(sent_req.sample_count(SampleRate::PerFrame), 12);
        assert_eq!(sent_req.decay_constants().count(), 1);

        let rtt_req = requirements.get(rtt).unwrap();
        assert!(rtt_req.is_required_at(SampleRate::PerFrame));
        assert!(rtt_req.is_required_at(SampleRate::PerSecond));
        assert!(!sent_req.is_required_at(SampleRate::PerSecond));

        assert_eq!(requirements.max_sample_count(SampleRate::PerFrame), 12);
        assert_eq!(requirements.max_sample_count(SampleRate::PerSecond), 30);
    }
}
