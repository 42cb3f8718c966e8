//! [`Coarena`]: a sparse arena keyed by native entity handles.
//!
//! Unlike a generational arena, a `Coarena` never allocates keys. The
//! native module decides every handle; the coarena only mirrors which
//! slots are occupied on the host side and what wrapper sits there.

use tether_core::ArenaKey;

/// Sparse arena mapping native handles to host values.
///
/// Invariants:
/// - `slots[k.index()]` is `Some((k, _))` iff `k` is live in the arena.
/// - `slots.len()` only shrinks through [`clear`](Self::clear).
/// - `len` equals the number of occupied slots.
///
/// Every lookup compares the full key, so a handle from a previous
/// occupant of a slot reads as absent.
#[derive(Clone, Debug)]
pub struct Coarena<K, T> {
    slots: Vec<Option<(K, T)>>,
    len: usize,
}

impl<K, T> Default for Coarena<K, T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            len: 0,
        }
    }
}

impl<K: ArenaKey, T> Coarena<K, T> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty arena with room for `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            len: 0,
        }
    }

    /// Insert `value` at `key`'s slot, growing storage as needed.
    ///
    /// Returns the value previously stored in that slot, whichever key it
    /// was stored under.
    pub fn set(&mut self, key: K, value: T) -> Option<T> {
        let index = key.index();
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        let previous = self.slots[index].replace((key, value));
        if previous.is_none() {
            self.len += 1;
        }
        previous.map(|(_, v)| v)
    }

    /// The value stored under `key`, if the slot is occupied by that exact key.
    pub fn get(&self, key: K) -> Option<&T> {
        match self.slots.get(key.index()) {
            Some(Some((k, v))) if *k == key => Some(v),
            _ => None,
        }
    }

    /// Mutable access to the value stored under `key`.
    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        match self.slots.get_mut(key.index()) {
            Some(Some((k, v))) if *k == key => Some(v),
            _ => None,
        }
    }

    /// Whether `key` is live in the arena.
    pub fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Clear `key`'s slot and return its value.
    ///
    /// No-op for out-of-range indices, empty slots, and generation
    /// mismatches.
    pub fn delete(&mut self, key: K) -> Option<T> {
        let slot = self.slots.get_mut(key.index())?;
        if !matches!(slot, Some((k, _)) if *k == key) {
            return None;
        }
        self.len -= 1;
        slot.take().map(|(_, v)| v)
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots ever allocated (occupied or not).
    pub fn slot_capacity(&self) -> usize {
        self.slots.len()
    }

    /// Drop every value and reset the count. Storage is released.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.len = 0;
    }

    /// Occupied slots in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|(k, v)| (*k, v)))
    }

    /// Values of occupied slots in ascending index order.
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Call `f` with each occupied slot in ascending index order.
    pub fn for_each(&self, mut f: impl FnMut(K, &T)) {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }

    /// Snapshot of every stored value, in ascending index order.
    pub fn get_all(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.values().cloned().collect()
    }
}
