use crate::cema::{ContinuousExponentialMovingAverage, DecayConstant};
use crate::requirements::StatHistoryRequirements;
use netdash_core::{DenseEnumMap, MetricId, RingBuffer, SampleRate};

/// Rolling storage for one metric: a ring buffer per sample rate and one
/// exponential average per required decay constant.
#[derive(Debug, Clone)]
pub struct StatHistory {
    averages: Vec<ContinuousExponentialMovingAverage>,
    samples: DenseEnumMap<SampleRate, RingBuffer<f64>>,
}

impl StatHistory {
    pub fn new(requirements: &StatHistoryRequirements) -> Self {
        Self {
            averages: requirements
                .decay_constants()
                .map(ContinuousExponentialMovingAverage::with_decay)
                .collect(),
            samples: DenseEnumMap::from_fn(|rate| RingBuffer::new(requirements.sample_count(rate))),
        }
    }

    /// Record `value` collected at `rate`; per-frame values also feed every
    /// exponential average, using the update rule of the metric's kind.
    pub fn update(&mut self, metric: MetricId, rate: SampleRate, value: f64, time: f64) {
        self.samples[rate].push_back(value);
        if rate == SampleRate::PerFrame {
            for average in &mut self.averages {
                average.add_sample(metric.kind(), value, time);
            }
        }
    }

    /// Apply new requirements without discarding what is still needed.
    ///
    /// Ring buffers keep their newest samples. Averages whose decay constant
    /// is still required carry over their value and timestamp; new ones
    /// start empty; the rest are dropped.
    pub fn update_requirements(&mut self, requirements: &StatHistoryRequirements) {
        let previous = std::mem::take(&mut self.averages);
        self.averages = requirements
            .decay_constants()
            .map(|decay| {
                previous
                    .iter()
                    .find(|average| average.decay_constant() == decay)
                    .map(|old| {
                        ContinuousExponentialMovingAverage::with_state(
                            decay,
                            old.last_value(),
                            old.last_time(),
                        )
                    })
                    .unwrap_or_else(|| ContinuousExponentialMovingAverage::with_decay(decay))
            })
            .collect();

        for (rate, buffer) in self.samples.iter_mut() {
            buffer.set_capacity(requirements.sample_count(rate));
        }
    }

    pub fn samples(&self, rate: SampleRate) -> &RingBuffer<f64> {
        &self.samples[rate]
    }

    /// Exponential averages in ascending decay-constant order.
    pub fn averages(&self) -> &[ContinuousExponentialMovingAverage] {
        &self.averages
    }

    pub fn average(
        &self,
        decay_constant: DecayConstant,
    ) -> Option<&ContinuousExponentialMovingAverage> {
        self.averages
            .iter()
            .find(|average| average.decay_constant() == decay_constant)
    }
}
