use crate::enum_map::DenseEnum;
use serde::{Deserialize, Serialize};

/// Cadence at which a rolling window is resampled.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SampleRate {
    /// One sample per frame tick.
    #[default]
    PerFrame,
    /// One sample per elapsed second.
    PerSecond,
}

impl DenseEnum for SampleRate {
    const COUNT: usize = 2;

    fn all() -> &'static [Self] {
        &[SampleRate::PerFrame, SampleRate::PerSecond]
    }

    fn to_index(self) -> usize {
        match self {
            SampleRate::PerFrame => 0,
            SampleRate::PerSecond => 1,
        }
    }
}
