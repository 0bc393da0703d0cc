use crate::error::{Result, StatsError};
use std::ops::Index;

/// Fixed-capacity circular buffer addressed oldest-to-newest.
///
/// Logical index `0` is the least-recent value and `len() - 1` the most
/// recent. Once full, each push overwrites the oldest slot. A capacity of
/// zero is valid: the buffer then silently drops every push.
#[derive(Debug, Clone, PartialEq)]
pub struct RingBuffer<T> {
    slots: Vec<T>,
    begin: usize,
    len: usize,
}

impl<T: Default> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(T::default).take(capacity).collect(),
            begin: 0,
            len: 0,
        }
    }

    /// Resize in place, keeping the newest `min(len, capacity)` values.
    ///
    /// After the call logical index `0` is the least-recent retained value;
    /// slots gained by growing stay empty until pushed.
    pub fn set_capacity(&mut self, capacity: usize) {
        if capacity == self.slots.len() {
            return;
        }
        let keep = self.len.min(capacity);
        let skip = self.len - keep;

        let mut slots: Vec<T> = std::iter::repeat_with(T::default).take(capacity).collect();
        for (dst, logical) in (skip..self.len).enumerate() {
            let src = self.physical(logical);
            slots[dst] = std::mem::take(&mut self.slots[src]);
        }

        self.slots = slots;
        self.begin = 0;
        self.len = keep;
    }
}

impl<T> RingBuffer<T> {
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Append `value` as the most-recent element.
    pub fn push_back(&mut self, value: T) {
        let capacity = self.slots.len();
        if capacity == 0 {
            return;
        }
        if self.len < capacity {
            let slot = (self.begin + self.len) % capacity;
            self.slots[slot] = value;
            self.len += 1;
        } else {
            self.slots[self.begin] = value;
            self.begin = (self.begin + 1) % capacity;
        }
    }

    /// Forget every value without releasing the backing storage.
    pub fn clear(&mut self) {
        self.begin = 0;
        self.len = 0;
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        (index < self.len).then(|| &self.slots[self.physical(index)])
    }

    /// Signed access: `-1` is the most recent value, `-len()` the oldest.
    pub fn at(&self, index: isize) -> Result<&T> {
        let resolved = if index < 0 {
            self.len as isize + index
        } else {
            index
        };
        if resolved < 0 || resolved as usize >= self.len {
            return Err(StatsError::IndexOutOfRange {
                index,
                length: self.len,
            });
        }
        Ok(&self.slots[self.physical(resolved as usize)])
    }

    pub fn least_recent(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn most_recent(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|last| self.get(last))
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        (0..self.len).map(move |i| &self.slots[self.physical(i)])
    }

    fn physical(&self, logical: usize) -> usize {
        (self.begin + logical) % self.slots.len()
    }
}

impl<T: Default> Default for RingBuffer<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T> Index<usize> for RingBuffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!(
                "index {index} out of range for ring buffer of length {}",
                self.len
            ),
        }
    }
}

// ── Reductions over logical order ─────────────────────────────────────────────

impl RingBuffer<f64> {
    pub fn sum(&self) -> f64 {
        self.iter().sum()
    }

    /// Sum of the newest `n` values; `n` is clamped to `len()`.
    pub fn sum_last_n(&self, n: usize) -> f64 {
        self.iter().rev().take(n).sum()
    }

    pub fn max(&self) -> Option<f64> {
        self.iter().copied().reduce(f64::max)
    }

    pub fn min(&self) -> Option<f64> {
        self.iter().copied().reduce(f64::min)
    }

    /// Arithmetic mean, or `None` when empty.
    pub fn average(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.sum() / self.len as f64)
    }
}
