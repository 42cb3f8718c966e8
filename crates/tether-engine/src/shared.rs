//! State shared between an entity set and the wrappers it hands out.

use std::cell::{Ref, RefCell, RefMut};

use tracing::{debug, trace};

use tether_core::raw::RawStateSource;
use tether_core::{ArenaKey, LinearMemory, NativeError, Packed, StateField};

use crate::buffer::StateBufferView;
use crate::error::{PhysicsError, RawKind};

/// The native collection of one entity set plus its buffer view.
///
/// Held behind an `Rc` by the set and by every wrapper, so wrappers
/// observe `free` as [`PhysicsError::Released`] instead of dangling.
pub(crate) struct SetCore<M, R: RawStateSource> {
    kind: RawKind,
    memory: M,
    raw: RefCell<Option<R>>,
    view: RefCell<StateBufferView<R::Dim>>,
}

impl<M: LinearMemory, R: RawStateSource> SetCore<M, R> {
    pub(crate) fn new(kind: RawKind, memory: M, raw: R) -> Self {
        Self {
            kind,
            memory,
            raw: RefCell::new(Some(raw)),
            view: RefCell::new(StateBufferView::new()),
        }
    }

    pub(crate) fn raw(&self) -> Result<Ref<'_, R>, PhysicsError> {
        let guard = self
            .raw
            .try_borrow()
            .map_err(|_| PhysicsError::Busy { object: self.kind })?;
        Ref::filter_map(guard, Option::as_ref)
            .map_err(|_| PhysicsError::Released { object: self.kind })
    }

    pub(crate) fn raw_mut(&self) -> Result<RefMut<'_, R>, PhysicsError> {
        let guard = self
            .raw
            .try_borrow_mut()
            .map_err(|_| PhysicsError::Busy { object: self.kind })?;
        RefMut::filter_map(guard, Option::as_mut)
            .map_err(|_| PhysicsError::Released { object: self.kind })
    }

    /// Read one field, from the buffer when possible and through
    /// `fallback` otherwise.
    pub(crate) fn read<P: Packed>(
        &self,
        handle: R::Handle,
        field: StateField,
        out: &mut P,
        fallback: impl FnOnce(&R, R::Handle) -> Result<P, NativeError>,
    ) -> Result<(), PhysicsError> {
        let raw = self.raw()?;
        let hit = self
            .view
            .borrow_mut()
            .read(&self.memory, &*raw, handle.index(), field, out);
        if !hit {
            trace!(?handle, ?field, "buffer miss, reading through native accessor");
            *out = fallback(&*raw, handle)?;
        }
        Ok(())
    }

    /// Run a native mutation of `handle`, then route its reads through the
    /// native accessor until the next step.
    pub(crate) fn write<T>(
        &self,
        handle: R::Handle,
        f: impl FnOnce(&mut R) -> Result<T, NativeError>,
    ) -> Result<T, PhysicsError> {
        let out = f(&mut *self.raw_mut()?)?;
        self.mark_stale(handle);
        Ok(out)
    }

    pub(crate) fn mark_stale(&self, handle: R::Handle) {
        self.view.borrow_mut().mark_stale(handle.index());
    }

    pub(crate) fn invalidate_view(&self) {
        self.view.borrow_mut().invalidate();
    }

    /// Adopt the native collection's freshly packed buffer.
    pub(crate) fn sync_view(&self) -> Result<(), PhysicsError> {
        let packed = self.raw()?.transform_buffer_view();
        debug!(object = %self.kind, ?packed, "refreshed buffer view");
        self.view.borrow_mut().refresh(packed);
        Ok(())
    }

    /// Drop the native collection. Later access reports `Released`.
    pub(crate) fn release(&self) -> Result<(), PhysicsError> {
        self.raw
            .try_borrow_mut()
            .map_err(|_| PhysicsError::Busy { object: self.kind })?
            .take();
        self.invalidate_view();
        Ok(())
    }

    pub(crate) fn is_released(&self) -> bool {
        self.raw.try_borrow().is_ok_and(|r| r.is_none())
    }

    #[cfg(test)]
    pub(crate) fn is_stale(&self, handle: R::Handle) -> bool {
        self.view.borrow().is_stale(handle.index())
    }
}
