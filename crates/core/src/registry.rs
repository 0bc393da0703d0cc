use crate::enum_map::{validate_dense, DenseEnum};
use crate::error::{Result, StatsError};
use crate::families::{HostMetric, NetworkMetric};
use crate::metric::{MetricDescriptor, MetricFamily, MetricId};
use std::collections::HashMap;
use tracing::debug;

/// Table of every metric family known to the process.
///
/// Built once at startup and passed by reference to whatever needs to
/// resolve names or ids; there is no global registration.
#[derive(Debug, Default)]
pub struct MetricRegistry {
    families: Vec<FamilyEntry>,
    family_index: HashMap<&'static str, u16>,
}

#[derive(Debug)]
struct FamilyEntry {
    name: &'static str,
    ids: Vec<MetricId>,
    descriptors: Vec<MetricDescriptor>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the `network` and `host` families.
    pub fn with_builtin_families() -> Result<Self> {
        let mut registry = Self::new();
        registry.register::<NetworkMetric>()?;
        registry.register::<HostMetric>()?;
        Ok(registry)
    }

    /// Add family `F`, assigning it the next type index.
    ///
    /// Fails if `F` is not dense-from-zero, reuses a registered family name,
    /// or lists the same member name twice.
    pub fn register<F: MetricFamily>(&mut self) -> Result<()> {
        validate_dense::<F>()?;

        if self.family_index.contains_key(F::NAME) {
            return Err(StatsError::Registry(format!(
                "metric family '{}' registered twice",
                F::NAME
            )));
        }
        let type_index = u16::try_from(self.families.len())
            .map_err(|_| StatsError::Registry("too many metric families".into()))?;

        let mut ids = Vec::with_capacity(F::COUNT);
        let mut descriptors: Vec<MetricDescriptor> = Vec::with_capacity(F::COUNT);
        for &member in F::all() {
            let descriptor = member.descriptor();
            if descriptors.iter().any(|d| d.name == descriptor.name) {
                return Err(StatsError::Registry(format!(
                    "metric '{}.{}' declared twice",
                    F::NAME,
                    descriptor.name
                )));
            }
            let enum_value = u16::try_from(member.to_index()).map_err(|_| {
                StatsError::Registry(format!("metric family '{}' is too large", F::NAME))
            })?;
            ids.push(MetricId::new(type_index, enum_value, &descriptor));
            descriptors.push(descriptor);
        }

        debug!(family = F::NAME, type_index, metrics = ids.len(), "registered metric family");
        self.family_index.insert(F::NAME, type_index);
        self.families.push(FamilyEntry {
            name: F::NAME,
            ids,
            descriptors,
        });
        Ok(())
    }

    /// Id of a typed family member, if its family is registered.
    pub fn id_of<F: MetricFamily>(&self, member: F) -> Option<MetricId> {
        let type_index = *self.family_index.get(F::NAME)?;
        self.families[usize::from(type_index)]
            .ids
            .get(member.to_index())
            .copied()
    }

    /// Resolve a `family.metric` name such as `"network.bytes_sent"`.
    pub fn lookup(&self, qualified_name: &str) -> Result<MetricId> {
        let unknown = || StatsError::UnknownMetric(qualified_name.to_string());
        let (family, metric) = qualified_name.split_once('.').ok_or_else(unknown)?;
        let family = &self.families[usize::from(*self.family_index.get(family).ok_or_else(unknown)?)];
        family
            .descriptors
            .iter()
            .position(|d| d.name == metric)
            .map(|i| family.ids[i])
            .ok_or_else(unknown)
    }

    pub fn descriptor(&self, id: MetricId) -> Option<&MetricDescriptor> {
        self.families
            .get(usize::from(id.type_index()))?
            .descriptors
            .get(usize::from(id.enum_value()))
    }

    /// `family.metric` name of `id`.
    pub fn name_of(&self, id: MetricId) -> Option<String> {
        let family = self.families.get(usize::from(id.type_index()))?;
        let descriptor = family.descriptors.get(usize::from(id.enum_value()))?;
        Some(format!("{}.{}", family.name, descriptor.name))
    }

    pub fn display_name_of(&self, id: MetricId) -> Option<&'static str> {
        self.descriptor(id).map(|d| d.display_name)
    }

    /// Every registered metric, in `(type_index, enum_value)` order.
    pub fn metrics(&self) -> impl Iterator<Item = MetricId> + '_ {
        self.families.iter().flat_map(|f| f.ids.iter().copied())
    }
}
