//! Generational slot table used by every reference collection.
//!
//! Slots are reused through a free list with a bumped generation, so
//! stale handles are rejected. A slot whose generation would wrap is
//! retired instead of recycled.

use tether_core::Handle;

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    data: Option<T>,
}

/// A slot+generation table mapping [`Handle`]s to owned values.
#[derive(Debug)]
pub struct SlotTable<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    len: usize,
}

impl<T> SlotTable<T> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Insert a value and return its handle. Freed slots are reused first.
    pub fn insert(&mut self, value: T) -> Handle {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.data = Some(value);
            Handle::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                data: Some(value),
            });
            Handle::new(index, 0)
        }
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.data.as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.data.as_mut()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    /// Remove the value behind a handle. Stale handles return `None`.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        let value = slot.data.take()?;
        self.len -= 1;
        slot.generation = slot.generation.wrapping_add(1);
        // A wrapped generation would resurrect handles from generation 0.
        if slot.generation != 0 {
            self.free_list.push(handle.index());
        }
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots ever created. Every live index is below this.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Live entries in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.data
                .as_ref()
                .map(|v| (Handle::new(i as u32, slot.generation), v))
        })
    }

    /// Mutable live entries in ascending index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| {
            let generation = slot.generation;
            slot.data
                .as_mut()
                .map(|v| (Handle::new(i as u32, generation), v))
        })
    }

    /// Handles of every live entry.
    pub fn handles(&self) -> Vec<Handle> {
        self.iter().map(|(h, _)| h).collect()
    }
}

impl<T> Default for SlotTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_round_trip() {
        let mut table = SlotTable::new();
        let h = table.insert(42i32);
        assert_eq!(table.get(h), Some(&42));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn reuse_bumps_generation() {
        let mut table = SlotTable::new();
        let a = table.insert(1i32);
        table.remove(a);
        let b = table.insert(2);
        assert_eq!(a.index(), b.index());
        assert_eq!(b.generation(), a.generation() + 1);
        assert_eq!(table.get(a), None);
        assert_eq!(table.get(b), Some(&2));
    }

    #[test]
    fn double_remove_returns_none() {
        let mut table = SlotTable::new();
        let h = table.insert(1i32);
        assert_eq!(table.remove(h), Some(1));
        assert_eq!(table.remove(h), None);
        assert!(table.is_empty());
    }

    #[test]
    fn iter_skips_holes() {
        let mut table = SlotTable::new();
        let a = table.insert('a');
        let b = table.insert('b');
        let c = table.insert('c');
        table.remove(b);
        let live: Vec<_> = table.iter().map(|(h, v)| (h, *v)).collect();
        assert_eq!(live, vec![(a, 'a'), (c, 'c')]);
        assert_eq!(table.slot_count(), 3);
    }
}
