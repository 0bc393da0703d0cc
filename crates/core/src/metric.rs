use crate::enum_map::DenseEnum;
use crate::units::Units;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// How a metric's samples combine over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Accumulates amounts (bytes sent); aggregated as sums and rates.
    Counter,
    /// Reports an instantaneous value (objects alive); aggregated as averages.
    Gauge,
}

/// Static description of one member of a metric family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricDescriptor {
    /// Machine name, unique within the family (`"bytes_sent"`).
    pub name: &'static str,
    /// Human-readable label.
    pub display_name: &'static str,
    pub kind: MetricKind,
    pub units: Units,
    /// Shown multiplied by 100 with a `%` suffix.
    pub display_as_percentage: bool,
}

impl MetricDescriptor {
    pub const fn counter(name: &'static str, display_name: &'static str, units: Units) -> Self {
        Self {
            name,
            display_name,
            kind: MetricKind::Counter,
            units,
            display_as_percentage: false,
        }
    }

    pub const fn gauge(name: &'static str, display_name: &'static str, units: Units) -> Self {
        Self {
            name,
            display_name,
            kind: MetricKind::Gauge,
            units,
            display_as_percentage: false,
        }
    }

    #[must_use]
    pub const fn as_percentage(mut self) -> Self {
        self.display_as_percentage = true;
        self
    }
}

/// A closed enum whose members are metrics, registered as one family in a
/// [`MetricRegistry`](crate::registry::MetricRegistry).
pub trait MetricFamily: DenseEnum {
    /// Family name, used as the prefix in `family.metric` lookups.
    const NAME: &'static str;

    fn descriptor(self) -> MetricDescriptor;
}

/// Identifies one statistic: the family's type index plus the member's
/// enum value.
///
/// Kind, units and the percentage flag ride along as derived metadata;
/// equality, ordering and hashing only look at `(type_index, enum_value)`.
#[derive(Debug, Clone, Copy)]
pub struct MetricId {
    type_index: u16,
    enum_value: u16,
    kind: MetricKind,
    units: Units,
    display_as_percentage: bool,
}

impl MetricId {
    pub(crate) fn new(type_index: u16, enum_value: u16, descriptor: &MetricDescriptor) -> Self {
        Self {
            type_index,
            enum_value,
            kind: descriptor.kind,
            units: descriptor.units,
            display_as_percentage: descriptor.display_as_percentage,
        }
    }

    pub fn type_index(&self) -> u16 {
        self.type_index
    }

    pub fn enum_value(&self) -> u16 {
        self.enum_value
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn units(&self) -> Units {
        self.units
    }

    /// Units of the value shown to the user: counters are shown as rates.
    pub fn display_units(&self) -> Units {
        match self.kind {
            MetricKind::Counter => self.units.per_second(),
            MetricKind::Gauge => self.units,
        }
    }

    pub fn display_as_percentage(&self) -> bool {
        self.display_as_percentage
    }

    fn key(&self) -> (u16, u16) {
        (self.type_index, self.enum_value)
    }
}

impl PartialEq for MetricId {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for MetricId {}

impl Hash for MetricId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for MetricId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MetricId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}
