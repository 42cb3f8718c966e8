//! [`RigidBodySet`]: host registry of native rigid bodies.

use std::cell::RefMut;
use std::rc::Rc;

use tracing::debug;

use tether_arena::Coarena;
use tether_core::raw::RawRigidBodySet;
use tether_core::{Backend, RigidBodyDesc, RigidBodyHandle};

use crate::collider_set::ColliderSet;
use crate::error::{PhysicsError, RawKind};
use crate::island::IslandManager;
use crate::joint::{ImpulseJointSet, MultibodyJointSet};
use crate::rigid_body::{BodyCore, RigidBody};
use crate::shared::SetCore;

/// Owns a native rigid-body set and hands out [`RigidBody`] wrappers.
///
/// The set keeps one wrapper per live body, indexed by handle, and the
/// view over the body transform buffer that every wrapper reads through.
pub struct RigidBodySet<B: Backend> {
    core: Rc<BodyCore<B>>,
    bodies: Coarena<RigidBodyHandle, RigidBody<B>>,
}

impl<B: Backend> RigidBodySet<B> {
    /// Allocate an empty native set.
    pub fn new(backend: &B) -> Self {
        Self::from_raw(backend.memory(), backend.new_rigid_body_set())
    }

    /// Adopt an existing native set.
    ///
    /// A wrapper is registered for every body the native set already
    /// holds. Their `user_data` is zero since it never crosses the
    /// boundary.
    pub fn from_raw(memory: B::Memory, raw: B::Bodies) -> Self {
        let mut handles = Vec::with_capacity(raw.len());
        raw.for_each_handle(&mut |h| handles.push(h));

        let core = Rc::new(SetCore::new(RawKind::RigidBodySet, memory, raw));
        let mut bodies = Coarena::with_capacity(handles.len());
        for handle in handles {
            bodies.set(handle, RigidBody::new(handle, Rc::clone(&core), 0));
        }
        Self { core, bodies }
    }

    /// Create a body and return its wrapper.
    ///
    /// The new body is not in the last packed buffer, so its reads go
    /// through the native accessor until the next step.
    pub fn create_rigid_body(
        &mut self,
        desc: &RigidBodyDesc<B::Dim>,
    ) -> Result<RigidBody<B>, PhysicsError> {
        let handle = self.core.raw_mut()?.create_rigid_body(desc)?;
        // Creation may have grown linear memory.
        self.core.invalidate_view();
        self.core.mark_stale(handle);

        let body = RigidBody::new(handle, Rc::clone(&self.core), desc.user_data);
        self.bodies.set(handle, body.clone());
        debug!(%handle, body_type = ?desc.body_type, "created rigid body");
        Ok(body)
    }

    /// Remove a body along with its colliders and joints.
    ///
    /// Returns the removed wrapper, or `None` if the native set does not
    /// know `handle`.
    pub fn remove(
        &mut self,
        handle: RigidBodyHandle,
        islands: &mut IslandManager<B>,
        colliders: &mut ColliderSet<B>,
        impulse_joints: &mut ImpulseJointSet<B>,
        multibody_joints: &mut MultibodyJointSet<B>,
    ) -> Result<Option<RigidBody<B>>, PhysicsError> {
        if !self.core.raw()?.contains(handle) {
            return Ok(None);
        }
        // Every collaborator must still be live before anything is unmapped.
        islands.raw()?;
        colliders.raw()?;
        impulse_joints.raw_mut()?;
        multibody_joints.raw_mut()?;

        colliders.unmap_attached_to(handle);
        impulse_joints.unmap_attached_to(handle);
        multibody_joints.unmap_attached_to(handle);

        {
            let mut raw = self.core.raw_mut()?;
            let mut collider_raw = colliders.raw_mut()?;
            raw.remove(
                handle,
                islands.raw_mut()?,
                &mut collider_raw,
                impulse_joints.raw_mut()?,
                multibody_joints.raw_mut()?,
            )?;
        }
        debug!(%handle, "removed rigid body");
        Ok(self.unmap(handle))
    }

    /// Forget a body the native module already removed.
    pub fn unmap(&mut self, handle: RigidBodyHandle) -> Option<RigidBody<B>> {
        self.core.mark_stale(handle);
        self.bodies.delete(handle)
    }

    /// The wrapper for `handle`, if live.
    pub fn get(&self, handle: RigidBodyHandle) -> Option<&RigidBody<B>> {
        self.bodies.get(handle)
    }

    /// Whether `handle` names a registered body.
    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    /// Number of registered bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether no body is registered.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Call `f` with every registered body, in handle-index order.
    pub fn for_each(&self, mut f: impl FnMut(&RigidBody<B>)) {
        self.bodies.for_each(|_, body| f(body));
    }

    /// Every registered body, in handle-index order.
    pub fn iter(&self) -> impl Iterator<Item = (RigidBodyHandle, &RigidBody<B>)> + '_ {
        self.bodies.iter()
    }

    /// A snapshot of every registered wrapper.
    pub fn get_all(&self) -> Vec<RigidBody<B>> {
        self.bodies.get_all()
    }

    /// Call `f` with every body the island manager reports as active.
    pub fn for_each_active_rigid_body(
        &self,
        islands: &IslandManager<B>,
        mut f: impl FnMut(&RigidBody<B>),
    ) -> Result<(), PhysicsError> {
        islands.for_each_active_rigid_body_handle(|handle| {
            if let Some(body) = self.bodies.get(handle) {
                f(body);
            }
        })
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
        self.bodies.clear();
        debug!("freed rigid-body set");
        Ok(())
    }

    pub(crate) fn raw_mut(&self) -> Result<RefMut<'_, B::Bodies>, PhysicsError> {
        self.core.raw_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::{Vec2, Vec3};
    use tether_test_utils::{RefBackend2, RefBackend3};

    #[test]
    fn created_body_reads_through_native_until_step() {
        let backend = RefBackend3::new();
        let mut bodies = RigidBodySet::new(&backend);
        let body = bodies
            .create_rigid_body(
                &RigidBodyDesc::dynamic().translation(Vec3::new(1.0, 2.0, 3.0)),
            )
            .unwrap();
        assert!(body.reads_are_stale());
        assert_eq!(body.translation().unwrap(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(bodies.len(), 1);
        assert!(bodies.contains(body.handle()));
    }

    #[test]
    fn user_data_is_carried_by_wrapper() {
        let backend = RefBackend2::new();
        let mut bodies = RigidBodySet::new(&backend);
        let body = bodies
            .create_rigid_body(&RigidBodyDesc::fixed().user_data(42))
            .unwrap();
        assert_eq!(body.user_data(), 42);
        assert_eq!(bodies.get(body.handle()).unwrap().user_data(), 42);
    }

    #[test]
    fn from_raw_registers_existing_bodies() {
        let backend = RefBackend2::new();
        let mut raw = backend.new_rigid_body_set();
        let a = raw
            .create_rigid_body(&RigidBodyDesc::dynamic().translation(Vec2::new(1.0, 0.0)))
            .unwrap();
        let b = raw.create_rigid_body(&RigidBodyDesc::fixed()).unwrap();

        let bodies = RigidBodySet::<RefBackend2>::from_raw(backend.memory(), raw);
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies.get(a).unwrap().user_data(), 0);
        assert!(bodies.contains(b));
        assert_eq!(
            bodies.get(a).unwrap().translation().unwrap(),
            Vec2::new(1.0, 0.0)
        );
    }

    #[test]
    fn free_twice_is_harmless() {
        let backend = RefBackend2::new();
        let mut bodies = RigidBodySet::new(&backend);
        bodies.create_rigid_body(&RigidBodyDesc::dynamic()).unwrap();
        bodies.free().unwrap();
        bodies.free().unwrap();
        assert!(bodies.is_empty());
        assert_eq!(
            bodies.sync_buffer_view(),
            Err(PhysicsError::Released {
                object: RawKind::RigidBodySet
            })
        );
    }

    #[test]
    fn validity_distinguishes_busy_from_removed() {
        let backend = RefBackend2::new();
        let mut bodies = RigidBodySet::new(&backend);
        let body = bodies.create_rigid_body(&RigidBodyDesc::dynamic()).unwrap();
        assert_eq!(body.is_valid(), Ok(true));
        {
            let _held = bodies.raw_mut().unwrap();
            assert_eq!(
                body.is_valid(),
                Err(PhysicsError::Busy {
                    object: RawKind::RigidBodySet
                })
            );
        }
        assert_eq!(body.is_valid(), Ok(true));

        bodies.free().unwrap();
        assert_eq!(body.is_valid(), Ok(false));
    }
}
