//! Simulated growable linear memory.
//!
//! Native structures address memory through *logical* offsets that stay
//! valid forever. Physically, every growth reallocates the backing vector
//! and relocates the contents one page further in, so a physical offset
//! taken before growth points at poisoned (NaN) words afterwards. The
//! [`MemoryEpoch`] advances with every growth.

use std::cell::RefCell;
use std::rc::Rc;

use tether_core::{LinearMemory, MemoryEpoch};

/// Default page size, in `f32` words.
pub const DEFAULT_PAGE_WORDS: usize = 256;

#[derive(Debug)]
struct Heap {
    words: Vec<f32>,
    /// Physical position of logical offset 0.
    base: usize,
    /// Logical words handed out so far.
    used: usize,
    /// Logical words available before the next growth.
    capacity: usize,
    epoch: u64,
    page_words: usize,
}

impl Heap {
    fn grow(&mut self, pages: usize) {
        let new_capacity = self.capacity + pages * self.page_words;
        let new_base = self.base + self.page_words;
        let mut words = vec![f32::NAN; new_base + new_capacity];
        words[new_base..new_base + self.used]
            .copy_from_slice(&self.words[self.base..self.base + self.used]);
        self.words = words;
        self.base = new_base;
        self.capacity = new_capacity;
        self.epoch += 1;
    }
}

/// Handle to a shared simulated linear memory. Clones share the memory.
#[derive(Clone, Debug)]
pub struct RefMemory(Rc<RefCell<Heap>>);

impl RefMemory {
    pub fn new() -> Self {
        Self::with_page_words(DEFAULT_PAGE_WORDS)
    }

    /// A memory growing `page_words` at a time. Tiny pages make growth
    /// (and therefore view invalidation) frequent.
    pub fn with_page_words(page_words: usize) -> Self {
        let page_words = page_words.max(1);
        Self(Rc::new(RefCell::new(Heap {
            words: vec![f32::NAN; page_words],
            base: 0,
            used: 0,
            capacity: page_words,
            epoch: 0,
            page_words,
        })))
    }

    /// Reserve `len` words and return their logical offset, growing the
    /// memory if needed.
    pub fn alloc(&self, len: usize) -> usize {
        let mut heap = self.0.borrow_mut();
        if heap.used + len > heap.capacity {
            let missing = heap.used + len - heap.capacity;
            let pages = missing.div_ceil(heap.page_words);
            heap.grow(pages);
        }
        let offset = heap.used;
        heap.used += len;
        offset
    }

    /// Force `pages` pages of growth.
    pub fn grow_pages(&self, pages: usize) {
        self.0.borrow_mut().grow(pages);
    }

    /// Copy `data` to logical offset `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range was never allocated.
    pub fn write(&self, offset: usize, data: &[f32]) {
        let mut heap = self.0.borrow_mut();
        assert!(offset + data.len() <= heap.used, "write past allocation");
        let start = heap.base + offset;
        heap.words[start..start + data.len()].copy_from_slice(data);
    }

    /// Physical position of a logical offset under the current epoch.
    pub fn physical(&self, offset: usize) -> usize {
        self.0.borrow().base + offset
    }

    /// Logical words handed out so far.
    pub fn used(&self) -> usize {
        self.0.borrow().used
    }
}

impl Default for RefMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearMemory for RefMemory {
    fn epoch(&self) -> MemoryEpoch {
        MemoryEpoch(self.0.borrow().epoch)
    }

    fn with_words<T>(&self, f: impl FnOnce(&[f32]) -> T) -> T {
        f(&self.0.borrow().words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_relocates_and_bumps_epoch() {
        let mem = RefMemory::with_page_words(4);
        let a = mem.alloc(3);
        mem.write(a, &[1.0, 2.0, 3.0]);
        let before = mem.physical(a);
        assert_eq!(mem.epoch(), MemoryEpoch(0));

        let b = mem.alloc(4);
        assert_eq!(b, 3);
        assert_eq!(mem.epoch(), MemoryEpoch(1));

        let after = mem.physical(a);
        assert_ne!(before, after);
        mem.with_words(|w| {
            assert_eq!(&w[after..after + 3], &[1.0, 2.0, 3.0]);
            assert!(w[before].is_nan());
        });
    }

    #[test]
    fn alloc_within_capacity_keeps_epoch() {
        let mem = RefMemory::with_page_words(16);
        mem.alloc(8);
        mem.alloc(8);
        assert_eq!(mem.epoch(), MemoryEpoch(0));
        mem.grow_pages(1);
        assert_eq!(mem.epoch(), MemoryEpoch(1));
        assert_eq!(mem.used(), 16);
    }
}
