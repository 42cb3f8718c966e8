//! [`Collider`]: a host-side reference to one native collider.

use std::fmt;
use std::rc::Rc;

use tether_core::raw::{RawColliderSet, RawStateSource};
use tether_core::{AngVect, Backend, ColliderHandle, RigidBodyHandle, Rot, StateField, Vect};

use crate::error::PhysicsError;
use crate::shared::SetCore;

pub(crate) type ColliderCore<B> = SetCore<<B as Backend>::Memory, <B as Backend>::Colliders>;

/// A collider as seen from the host.
///
/// Reads follow the same buffer-or-native policy as
/// [`RigidBody`](crate::RigidBody). Velocities are those of the parent
/// body (zero for parentless colliders).
pub struct Collider<B: Backend> {
    handle: ColliderHandle,
    core: Rc<ColliderCore<B>>,
    parent: Option<RigidBodyHandle>,
    user_data: u128,
}

impl<B: Backend> Clone for Collider<B> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle,
            core: Rc::clone(&self.core),
            parent: self.parent,
            user_data: self.user_data,
        }
    }
}

impl<B: Backend> fmt::Debug for Collider<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collider")
            .field("handle", &self.handle)
            .field("parent", &self.parent)
            .field("user_data", &self.user_data)
            .finish()
    }
}

impl<B: Backend> Collider<B> {
    pub(crate) fn new(
        handle: ColliderHandle,
        core: Rc<ColliderCore<B>>,
        parent: Option<RigidBodyHandle>,
        user_data: u128,
    ) -> Self {
        Self {
            handle,
            core,
            parent,
            user_data,
        }
    }

    /// The native handle.
    pub fn handle(&self) -> ColliderHandle {
        self.handle
    }

    /// The opaque value given at creation.
    pub fn user_data(&self) -> u128 {
        self.user_data
    }

    /// The body this collider was attached to at creation, as recorded by
    /// the host. Survives removal, unlike [`parent`](Self::parent).
    pub(crate) fn attached_to(&self) -> Option<RigidBodyHandle> {
        self.parent
    }

    /// The parent body, as reported by the native module.
    pub fn parent(&self) -> Result<Option<RigidBodyHandle>, PhysicsError> {
        Ok(self.core.raw()?.parent(self.handle)?)
    }

    /// Whether the native module still knows this collider.
    ///
    /// A freed set reports `false`. A set that is already borrowed
    /// reports [`PhysicsError::Busy`] rather than a guess.
    pub fn is_valid(&self) -> Result<bool, PhysicsError> {
        match self.core.raw() {
            Ok(raw) => Ok(raw.contains(self.handle)),
            Err(PhysicsError::Released { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// World-space position.
    pub fn translation(&self) -> Result<Vect<B::Dim>, PhysicsError> {
        let mut out = Default::default();
        self.translation_into(&mut out)?;
        Ok(out)
    }

    /// World-space position, written into `target`.
    pub fn translation_into<'t>(
        &self,
        target: &'t mut Vect<B::Dim>,
    ) -> Result<&'t mut Vect<B::Dim>, PhysicsError> {
        self.core
            .read(self.handle, StateField::Translation, target, |raw, h| {
                raw.translation(h)
            })?;
        Ok(target)
    }

    /// World-space orientation.
    pub fn rotation(&self) -> Result<Rot<B::Dim>, PhysicsError> {
        let mut out = Default::default();
        self.rotation_into(&mut out)?;
        Ok(out)
    }

    /// World-space orientation, written into `target`.
    pub fn rotation_into<'t>(
        &self,
        target: &'t mut Rot<B::Dim>,
    ) -> Result<&'t mut Rot<B::Dim>, PhysicsError> {
        self.core
            .read(self.handle, StateField::Rotation, target, |raw, h| {
                raw.rotation(h)
            })?;
        Ok(target)
    }

    /// Linear velocity of the parent body.
    pub fn linvel(&self) -> Result<Vect<B::Dim>, PhysicsError> {
        let mut out = Default::default();
        self.linvel_into(&mut out)?;
        Ok(out)
    }

    /// Linear velocity of the parent body, written into `target`.
    pub fn linvel_into<'t>(
        &self,
        target: &'t mut Vect<B::Dim>,
    ) -> Result<&'t mut Vect<B::Dim>, PhysicsError> {
        self.core
            .read(self.handle, StateField::Linvel, target, |raw, h| raw.linvel(h))?;
        Ok(target)
    }

    /// Angular velocity of the parent body.
    pub fn angvel(&self) -> Result<AngVect<B::Dim>, PhysicsError> {
        let mut out = Default::default();
        self.angvel_into(&mut out)?;
        Ok(out)
    }

    /// Angular velocity of the parent body, written into `target`.
    pub fn angvel_into<'t>(
        &self,
        target: &'t mut AngVect<B::Dim>,
    ) -> Result<&'t mut AngVect<B::Dim>, PhysicsError> {
        self.core
            .read(self.handle, StateField::Angvel, target, |raw, h| raw.angvel(h))?;
        Ok(target)
    }

    /// Move the collider in world space.
    pub fn set_translation(&self, translation: Vect<B::Dim>) -> Result<(), PhysicsError> {
        self.core
            .write(self.handle, |raw| raw.set_translation(self.handle, translation))
    }

    /// Reorient the collider in world space.
    pub fn set_rotation(&self, rotation: Rot<B::Dim>) -> Result<(), PhysicsError> {
        self.core
            .write(self.handle, |raw| raw.set_rotation(self.handle, rotation))
    }
}
