use netdash_core::{Result, StatsError};

/// Discrete exponential moving average over equally spaced samples.
///
/// Each sample moves the estimate `smoothing` of the way towards it; the
/// first sample is taken as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverage {
    smoothing: f64,
    value: Option<f64>,
}

impl MovingAverage {
    /// `smoothing` must lie in `(0, 1]`.
    pub fn new(smoothing: f64) -> Result<Self> {
        if !(smoothing > 0.0 && smoothing <= 1.0) {
            return Err(StatsError::InvalidSmoothing(format!(
                "smoothing factor {smoothing} is outside (0, 1]"
            )));
        }
        Ok(Self {
            smoothing,
            value: None,
        })
    }

    /// Smoothing equivalent to an `n`-sample window: `2 / (n + 1)`.
    pub fn with_sample_count(sample_count: usize) -> Result<Self> {
        if sample_count == 0 {
            return Err(StatsError::InvalidSmoothing(
                "sample count must be at least 1".into(),
            ));
        }
        Self::new(2.0 / (sample_count as f64 + 1.0))
    }

    pub fn add_sample(&mut self, sample: f64) {
        self.value = Some(match self.value {
            None => sample,
            Some(value) => value + self.smoothing * (sample - value),
        });
    }

    /// Current estimate, or `None` before the first sample.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}
