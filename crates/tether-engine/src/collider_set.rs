//! [`ColliderSet`]: host registry of native colliders.

use std::cell::{Ref, RefMut};
use std::rc::Rc;

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::debug;

use tether_arena::Coarena;
use tether_core::raw::RawColliderSet;
use tether_core::{Backend, ColliderDesc, ColliderHandle, RigidBodyHandle};

use crate::collider::{Collider, ColliderCore};
use crate::error::{PhysicsError, RawKind};
use crate::island::IslandManager;
use crate::rigid_body_set::RigidBodySet;
use crate::shared::SetCore;

/// Owns a native collider set and hands out [`Collider`] wrappers.
///
/// Besides the wrappers it keeps a parent → colliders index so that
/// removing a body can unmap the colliders the native module removes with
/// it.
pub struct ColliderSet<B: Backend> {
    core: Rc<ColliderCore<B>>,
    colliders: Coarena<ColliderHandle, Collider<B>>,
    attached: IndexMap<RigidBodyHandle, SmallVec<[ColliderHandle; 4]>>,
}

impl<B: Backend> ColliderSet<B> {
    /// Allocate an empty native set.
    pub fn new(backend: &B) -> Self {
        Self::from_raw(backend.memory(), backend.new_collider_set())
    }

    /// Adopt an existing native set, registering every collider it holds.
    pub fn from_raw(memory: B::Memory, raw: B::Colliders) -> Self {
        let mut handles = Vec::with_capacity(raw.len());
        raw.for_each_handle(&mut |h| handles.push(h));
        let parents: Vec<_> = handles
            .iter()
            .map(|h| raw.parent(*h).ok().flatten())
            .collect();

        let core = Rc::new(SetCore::new(RawKind::ColliderSet, memory, raw));
        let mut set = Self {
            core,
            colliders: Coarena::with_capacity(handles.len()),
            attached: IndexMap::new(),
        };
        for (handle, parent) in handles.into_iter().zip(parents) {
            set.register(handle, parent, 0);
        }
        set
    }

    /// Create a collider, optionally attached to `parent`, and return its
    /// wrapper.
    pub fn create_collider(
        &mut self,
        desc: &ColliderDesc<B::Dim>,
        parent: Option<RigidBodyHandle>,
        bodies: &mut RigidBodySet<B>,
    ) -> Result<Collider<B>, PhysicsError> {
        let handle = {
            let mut body_raw = bodies.raw_mut()?;
            self.core
                .raw_mut()?
                .create_collider(desc, parent, &mut body_raw)?
        };
        self.core.invalidate_view();
        self.core.mark_stale(handle);

        let collider = self.register(handle, parent, desc.user_data);
        debug!(%handle, ?parent, "created collider");
        Ok(collider)
    }

    /// Remove a collider. Returns the removed wrapper, or `None` if the
    /// native set does not know `handle`.
    pub fn remove(
        &mut self,
        handle: ColliderHandle,
        islands: &mut IslandManager<B>,
        bodies: &mut RigidBodySet<B>,
        wake_up: bool,
    ) -> Result<Option<Collider<B>>, PhysicsError> {
        if !self.core.raw()?.contains(handle) {
            return Ok(None);
        }
        {
            let mut body_raw = bodies.raw_mut()?;
            self.core
                .raw_mut()?
                .remove(handle, islands.raw_mut()?, &mut body_raw, wake_up)?;
        }
        debug!(%handle, "removed collider");
        Ok(self.unmap(handle))
    }

    /// Forget a collider the native module already removed.
    pub fn unmap(&mut self, handle: ColliderHandle) -> Option<Collider<B>> {
        let collider = self.colliders.delete(handle)?;
        self.core.mark_stale(handle);
        if let Some(parent) = collider.attached_to() {
            if let Some(list) = self.attached.get_mut(&parent) {
                list.retain(|h| *h != handle);
                if list.is_empty() {
                    self.attached.swap_remove(&parent);
                }
            }
        }
        Some(collider)
    }

    /// Forget every collider attached to `body`.
    pub fn unmap_attached_to(&mut self, body: RigidBodyHandle) {
        let Some(children) = self.attached.swap_remove(&body) else {
            return;
        };
        for handle in children {
            self.colliders.delete(handle);
            self.core.mark_stale(handle);
        }
    }

    /// The wrapper for `handle`, if live.
    pub fn get(&self, handle: ColliderHandle) -> Option<&Collider<B>> {
        self.colliders.get(handle)
    }

    /// Whether `handle` names a registered collider.
    pub fn contains(&self, handle: ColliderHandle) -> bool {
        self.colliders.contains(handle)
    }

    /// Number of registered colliders.
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// Whether no collider is registered.
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Call `f` with every registered collider, in handle-index order.
    pub fn for_each(&self, mut f: impl FnMut(&Collider<B>)) {
        self.colliders.for_each(|_, collider| f(collider));
    }

    /// Every registered collider, in handle-index order.
    pub fn iter(&self) -> impl Iterator<Item = (ColliderHandle, &Collider<B>)> + '_ {
        self.colliders.iter()
    }

    /// A snapshot of every registered wrapper.
    pub fn get_all(&self) -> Vec<Collider<B>> {
        self.colliders.get_all()
    }

    /// Handles of the colliders recorded as attached to `body`.
    pub fn attached_to(&self, body: RigidBodyHandle) -> &[ColliderHandle] {
        self.attached
            .get(&body)
            .map(SmallVec::as_slice)
            .unwrap_or(&[])
    }

    /// Adopt the buffer the native set packed during the last step.
    pub fn sync_buffer_view(&self) -> Result<(), PhysicsError> {
        self.core.sync_view()
    }

    /// Release the native set. Every wrapper handed out so far reports
    /// [`PhysicsError::Released`] from then on.
    pub fn free(&mut self) -> Result<(), PhysicsError> {
        if self.core.is_released() {
            return Ok(());
        }
        self.core.release()?;
        self.colliders.clear();
        self.attached.clear();
        debug!("freed collider set");
        Ok(())
    }

    fn register(
        &mut self,
        handle: ColliderHandle,
        parent: Option<RigidBodyHandle>,
        user_data: u128,
    ) -> Collider<B> {
        let collider = Collider::new(handle, Rc::clone(&self.core), parent, user_data);
        self.colliders.set(handle, collider.clone());
        if let Some(parent) = parent {
            self.attached.entry(parent).or_default().push(handle);
        }
        collider
    }

    pub(crate) fn raw(&self) -> Result<Ref<'_, B::Colliders>, PhysicsError> {
        self.core.raw()
    }

    pub(crate) fn raw_mut(&self) -> Result<RefMut<'_, B::Colliders>, PhysicsError> {
        self.core.raw_mut()
    }
}
