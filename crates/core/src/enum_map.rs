use crate::error::{Result, StatsError};
use std::fmt;
use std::ops::{Index, IndexMut};

/// A small closed enum whose members map onto the dense index range
/// `0..COUNT`.
///
/// Implementors write `to_index` by hand; [`validate_dense`] checks the
/// mapping once at startup instead of trusting casts at every lookup.
pub trait DenseEnum: Copy + Eq + fmt::Debug + 'static {
    /// Number of members.
    const COUNT: usize;

    /// Every member, in index order.
    fn all() -> &'static [Self];

    /// Dense index of this member, in `0..COUNT`.
    fn to_index(self) -> usize;

    fn from_index(index: usize) -> Option<Self> {
        Self::all().get(index).copied()
    }
}

/// Check that `K::all()` lists exactly `K::COUNT` members and that member
/// `i` reports index `i` (continuous from zero, no gaps or duplicates).
pub fn validate_dense<K: DenseEnum>() -> Result<()> {
    let all = K::all();
    if all.len() != K::COUNT {
        return Err(StatsError::Registry(format!(
            "{} lists {} members but declares COUNT = {}",
            std::any::type_name::<K>(),
            all.len(),
            K::COUNT
        )));
    }
    for (expected, member) in all.iter().enumerate() {
        let actual = member.to_index();
        if actual != expected {
            return Err(StatsError::Registry(format!(
                "{}::{member:?} maps to index {actual}, expected {expected}",
                std::any::type_name::<K>(),
            )));
        }
    }
    Ok(())
}

/// Array-backed map with one slot per member of a [`DenseEnum`].
///
/// Every key is always present, so lookups cannot fail and never hash.
#[derive(Clone, PartialEq)]
pub struct DenseEnumMap<K: DenseEnum, V> {
    values: Vec<V>,
    _keys: std::marker::PhantomData<K>,
}

impl<K: DenseEnum, V> DenseEnumMap<K, V> {
    /// Build a map by calling `init` once per key, in index order.
    pub fn from_fn(mut init: impl FnMut(K) -> V) -> Self {
        Self {
            values: K::all().iter().map(|&key| init(key)).collect(),
            _keys: std::marker::PhantomData,
        }
    }

    pub fn get(&self, key: K) -> &V {
        &self.values[key.to_index()]
    }

    pub fn get_mut(&mut self, key: K) -> &mut V {
        &mut self.values[key.to_index()]
    }

    /// Iterate `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        K::all().iter().copied().zip(self.values.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut V)> + '_ {
        K::all().iter().copied().zip(self.values.iter_mut())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.values.iter()
    }
}

impl<K: DenseEnum, V: Default> Default for DenseEnumMap<K, V> {
    fn default() -> Self {
        Self::from_fn(|_| V::default())
    }
}

impl<K: DenseEnum, V> Index<K> for DenseEnumMap<K, V> {
    type Output = V;

    fn index(&self, key: K) -> &V {
        self.get(key)
    }
}

impl<K: DenseEnum, V> IndexMut<K> for DenseEnumMap<K, V> {
    fn index_mut(&mut self, key: K) -> &mut V {
        self.get_mut(key)
    }
}

impl<K: DenseEnum, V: fmt::Debug> fmt::Debug for DenseEnumMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
