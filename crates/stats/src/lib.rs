//! Rolling-window statistics for the live network-stats dashboard.
//!
//! Data flow per frame: a raw [`MetricSnapshot`](netdash_core::MetricSnapshot)
//! is aggregated into one [`StatsAccumulator`] per sample rate; on each rate's
//! clock tick [`MultiStatHistory::collect`] drains the accumulator into every
//! metric's [`StatHistory`]; display elements read sample windows and
//! exponential averages on demand.

pub mod accumulator;
pub mod aggregator;
pub mod cema;
pub mod display;
pub mod history;
pub mod monitor;
pub mod moving_average;
pub mod multi_history;
pub mod requirements;

pub use accumulator::StatsAccumulator;
pub use aggregator::aggregate;
pub use cema::{ContinuousExponentialMovingAverage, DecayConstant};
pub use display::{DisplayElement, DisplayKind};
pub use history::StatHistory;
pub use monitor::StatsMonitor;
pub use moving_average::MovingAverage;
pub use multi_history::MultiStatHistory;
pub use requirements::{MultiStatHistoryRequirements, StatHistoryRequirements};
