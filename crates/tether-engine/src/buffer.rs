//! Epoch-checked view of a native transform buffer.
//!
//! After every step the native module packs one fixed-stride record per
//! entity into its linear memory. A [`StateBufferView`] remembers where
//! that region lives and decodes single fields out of it without copying
//! the buffer and without allocating.
//!
//! # Validity
//!
//! A read is served from the buffer only if all of the following hold:
//!
//! - the entity was not created, written, or removed since the last
//!   [`refresh`](StateBufferView::refresh) (it is not *stale*);
//! - the borrowed region belongs to the memory's current epoch (otherwise
//!   the view is re-borrowed from the native module first);
//! - the entity's record lies inside the packed length.
//!
//! Anything else is a miss, and the caller reads through the native
//! per-entity accessor instead.

use std::marker::PhantomData;

use indexmap::IndexSet;
use tracing::trace;

use tether_core::raw::RawStateSource;
use tether_core::{Dim, LinearMemory, Packed, RawBufferView, StateField};

/// A borrowed, lazily re-borrowed view of one collection's packed state.
#[derive(Debug)]
pub struct StateBufferView<D: Dim> {
    borrowed: Option<RawBufferView>,
    /// Indices whose packed record may not match native state.
    stale: IndexSet<usize>,
    _dim: PhantomData<D>,
}

impl<D: Dim> Default for StateBufferView<D> {
    fn default() -> Self {
        Self {
            borrowed: None,
            stale: IndexSet::new(),
            _dim: PhantomData,
        }
    }
}

impl<D: Dim> StateBufferView<D> {
    /// An empty view. The first read borrows from the native module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt the region packed by the step that just completed.
    ///
    /// Every entity becomes fresh again.
    pub fn refresh(&mut self, view: Option<RawBufferView>) {
        self.borrowed = view;
        self.stale.clear();
    }

    /// Drop the borrow. The next read re-borrows.
    pub fn invalidate(&mut self) {
        self.borrowed = None;
    }

    /// Route reads of `index` through the native accessor until the next
    /// refresh.
    pub fn mark_stale(&mut self, index: usize) {
        self.stale.insert(index);
    }

    /// Whether reads of `index` currently bypass the buffer.
    pub fn is_stale(&self, index: usize) -> bool {
        self.stale.contains(&index)
    }

    /// The currently borrowed region, if any.
    pub fn borrowed(&self) -> Option<RawBufferView> {
        self.borrowed
    }

    /// Decode `field` of the entity at `index` into `out`.
    ///
    /// Returns `false` on a miss, leaving `out` untouched.
    pub fn read<M, S, P>(
        &mut self,
        memory: &M,
        source: &S,
        index: usize,
        field: StateField,
        out: &mut P,
    ) -> bool
    where
        M: LinearMemory,
        S: RawStateSource + ?Sized,
        P: Packed,
    {
        if self.stale.contains(&index) {
            return false;
        }

        let epoch = memory.epoch();
        if !self.borrowed.is_some_and(|b| b.is_current(epoch)) {
            trace!(%epoch, "re-borrowing transform buffer");
            self.borrowed = source.transform_buffer_view();
        }
        let Some(view) = self.borrowed else {
            return false;
        };
        if !view.is_current(epoch) {
            return false;
        }

        let start = D::LAYOUT.offset_of(index, field);
        if start + P::LEN > view.len {
            return false;
        }
        let at = view.offset + start;
        memory.with_words(|words| match words.get(at..at + P::LEN) {
            Some(src) => {
                out.unpack(src);
                true
            }
            None => false,
        })
    }
}
