//! Exponential smoothing over irregularly spaced samples.

use netdash_core::{MetricKind, Result, StatsError};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Rate `λ` at which old information loses weight, per second.
///
/// Always finite and non-negative, which gives it a total order.
#[derive(Debug, Clone, Copy)]
pub struct DecayConstant(f64);

impl DecayConstant {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(StatsError::InvalidDecayConstant(value));
        }
        // Fold -0.0 into 0.0 so equal constants hash alike.
        Ok(Self(value + 0.0))
    }

    /// `ln(2) / half_life`: after `half_life` seconds a sample keeps half
    /// its weight.
    pub fn from_half_life(half_life: f64) -> Result<Self> {
        if !(half_life.is_finite() && half_life > 0.0) {
            return Err(StatsError::InvalidSmoothing(format!(
                "half-life {half_life} must be a positive number of seconds"
            )));
        }
        Self::new(std::f64::consts::LN_2 / half_life)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for DecayConstant {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for DecayConstant {}

impl Hash for DecayConstant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for DecayConstant {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DecayConstant {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Exponential moving average generalised to irregular sample spacing.
///
/// A sample arriving `dt` seconds after the previous one gets weight
/// `1 - e^(-λ·dt)`. Equally spaced samples reduce to a classic EMA; widely
/// spaced ones let the old estimate decay further before blending.
///
/// Gauges blend their readings directly. Counters first turn the amount
/// into a rate over the time since the previous sample, so the estimate of
/// a counter is always per second.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousExponentialMovingAverage {
    decay_constant: DecayConstant,
    last_value: f64,
    /// `-∞` until the first sample, which therefore gets full weight.
    last_time: f64,
}

impl ContinuousExponentialMovingAverage {
    /// Fails with [`StatsError::InvalidDecayConstant`] for negative or
    /// non-finite `decay_constant`.
    pub fn new(decay_constant: f64) -> Result<Self> {
        Ok(Self::with_decay(DecayConstant::new(decay_constant)?))
    }

    pub fn with_decay(decay_constant: DecayConstant) -> Self {
        Self {
            decay_constant,
            last_value: 0.0,
            last_time: f64::NEG_INFINITY,
        }
    }

    /// Rebuild an average from previously accumulated state.
    pub fn with_state(decay_constant: DecayConstant, last_value: f64, last_time: f64) -> Self {
        Self {
            decay_constant,
            last_value,
            last_time,
        }
    }

    pub fn decay_constant(&self) -> DecayConstant {
        self.decay_constant
    }

    pub fn last_value(&self) -> f64 {
        self.last_value
    }

    pub fn last_time(&self) -> f64 {
        self.last_time
    }

    pub fn has_samples(&self) -> bool {
        self.last_time != f64::NEG_INFINITY
    }

    pub fn add_sample(&mut self, kind: MetricKind, value: f64, time: f64) {
        match kind {
            MetricKind::Counter => self.add_sample_for_counter(value, time),
            MetricKind::Gauge => self.add_sample_for_gauge(value, time),
        }
    }

    pub fn add_sample_for_gauge(&mut self, value: f64, time: f64) {
        let weight = if self.has_samples() {
            1.0 - self.retention(time)
        } else {
            1.0
        };
        self.last_value += weight * (value - self.last_value);
        self.last_time = time;
    }

    /// Blend `amount` accumulated since the previous sample as a rate.
    ///
    /// The first sample only establishes the time origin (its rate over an
    /// unbounded interval is zero). Samples at a non-increasing time carry
    /// no interval to divide by and are skipped.
    pub fn add_sample_for_counter(&mut self, amount: f64, time: f64) {
        let elapsed = time - self.last_time;
        if elapsed <= 0.0 {
            debug!(time, last_time = self.last_time, "skipping counter sample with no elapsed time");
            return;
        }
        self.add_sample_for_gauge(amount / elapsed, time);
    }

    /// Latest gauge estimate, or `None` before the first sample.
    pub fn gauge_value(&self) -> Option<f64> {
        self.has_samples().then_some(self.last_value)
    }

    /// Latest rate estimate decayed forward to `time`, without mutating.
    pub fn counter_value(&self, time: f64) -> Option<f64> {
        self.has_samples().then(|| self.last_value * self.retention(time))
    }

    pub fn value(&self, kind: MetricKind, time: f64) -> Option<f64> {
        match kind {
            MetricKind::Counter => self.counter_value(time),
            MetricKind::Gauge => self.gauge_value(),
        }
    }

    /// Share of the current estimate still weighted at `time`.
    fn retention(&self, time: f64) -> f64 {
        let elapsed = (time - self.last_time).max(0.0);
        (-self.decay_constant.value() * elapsed).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn first_gauge_sample_is_exact() {
        let mut cema = ContinuousExponentialMovingAverage::new(0.3).unwrap();
        assert_eq!(cema.gauge_value(), None);
        cema.add_sample_for_gauge(42.5, 7.0);
        assert_eq!(cema.gauge_value(), Some(42.5));
        assert_eq!(cema.last_time(), 7.0);
    }

    #[test]
    fn equal_spacing_matches_discrete_ema() {
        let lambda = 0.5_f64;
        let alpha = 1.0 - (-lambda).exp();
        let mut cema = ContinuousExponentialMovingAverage::new(lambda).unwrap();
        let mut expected = 0.0;
        for (i, x) in [4.0, 8.0, 2.0, 6.0].into_iter().enumerate() {
            cema.add_sample_for_gauge(x, i as f64);
            expected = if i == 0 { x } else { expected + alpha * (x - expected) };
        }
        assert!(close(cema.gauge_value().unwrap(), expected));
    }

    #[test]
    fn wider_gaps_weigh_new_samples_more() {
        let mut near = ContinuousExponentialMovingAverage::new(1.0).unwrap();
        let mut far = near.clone();
        near.add_sample_for_gauge(0.0, 0.0);
        far.add_sample_for_gauge(0.0, 0.0);
        near.add_sample_for_gauge(10.0, 0.1);
        far.add_sample_for_gauge(10.0, 5.0);
        assert!(far.gauge_value().unwrap() > near.gauge_value().unwrap());
    }

    #[test]
    fn counter_samples_become_rates() {
        let mut cema = ContinuousExponentialMovingAverage::new(0.0).unwrap();
        cema.add_sample_for_counter(100.0, 0.0);
        assert_eq!(cema.counter_value(0.0), Some(0.0));

        // Fast decay: the second sample's rate dominates.
        let mut cema = ContinuousExponentialMovingAverage::new(1_000.0).unwrap();
        cema.add_sample_for_counter(0.0, 0.0);
        cema.add_sample_for_counter(500.0, 0.5);
        assert!(close(cema.last_value(), 1000.0));
    }

    #[test]
    fn counter_sample_without_elapsed_time_is_skipped() {
        let mut cema = ContinuousExponentialMovingAverage::new(1.0).unwrap();
        cema.add_sample_for_gauge(3.0, 2.0);
        cema.add_sample_for_counter(50.0, 2.0);
        assert_eq!(cema.last_value(), 3.0);
        assert_eq!(cema.last_time(), 2.0);
    }

    #[test]
    fn counter_value_decays_strictly() {
        let decay = DecayConstant::new(0.5).unwrap();
        let cema = ContinuousExponentialMovingAverage::with_state(decay, 10.0, 1.0);
        let readings: Vec<f64> = [1.5, 2.0, 3.0, 10.0]
            .iter()
            .map(|&t| cema.counter_value(t).unwrap())
            .collect();
        assert!(readings.windows(2).all(|pair| pair[1] < pair[0]));
        assert_eq!(cema.counter_value(1.0), Some(10.0));
        // Reading does not mutate.
        assert_eq!(cema.last_value(), 10.0);
    }

    #[test]
    fn negative_decay_rejected() {
        assert!(matches!(
            ContinuousExponentialMovingAverage::new(-0.1),
            Err(StatsError::InvalidDecayConstant(_))
        ));
        assert!(ContinuousExponentialMovingAverage::new(f64::NAN).is_err());
        assert!(ContinuousExponentialMovingAverage::new(0.0).is_ok());
    }

    #[test]
    fn decay_constant_from_half_life() {
        let decay = DecayConstant::from_half_life(2.0).unwrap();
        assert!(close(decay.value(), std::f64::consts::LN_2 / 2.0));
        assert!(DecayConstant::from_half_life(0.0).is_err());
        assert_eq!(DecayConstant::new(-0.0).unwrap(), DecayConstant::new(0.0).unwrap());

        let mut cema = ContinuousExponentialMovingAverage::with_decay(decay);
        cema.add_sample_for_gauge(1.0, 0.0);
        assert!(close(cema.counter_value(2.0).unwrap(), 0.5));
    }
}
