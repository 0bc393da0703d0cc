pub mod enum_map;
pub mod error;
pub mod families;
pub mod metric;
pub mod registry;
pub mod ring_buffer;
pub mod sample_rate;
pub mod snapshot;
pub mod units;

pub use enum_map::{validate_dense, DenseEnum, DenseEnumMap};
pub use error::{Result, StatsError};
pub use families::{HostMetric, NetworkMetric};
pub use metric::{MetricDescriptor, MetricFamily, MetricId, MetricKind};
pub use registry::MetricRegistry;
pub use ring_buffer::RingBuffer;
pub use sample_rate::SampleRate;
pub use snapshot::{MetricCollection, MetricSnapshot};
pub use units::{format_value, Units};
