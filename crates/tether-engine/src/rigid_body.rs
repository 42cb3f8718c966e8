//! [`RigidBody`]: a host-side reference to one native rigid body.

use std::fmt;
use std::rc::Rc;

use tether_core::raw::{RawRigidBodySet, RawStateSource};
use tether_core::{
    AngVect, Backend, ColliderHandle, RigidBodyHandle, RigidBodyType, Rot, StateField, Vect,
};

use crate::error::PhysicsError;
use crate::shared::SetCore;

pub(crate) type BodyCore<B> = SetCore<<B as Backend>::Memory, <B as Backend>::Bodies>;

/// A rigid body as seen from the host.
///
/// Cheap to clone: a handle, a shared reference to the owning set's native
/// collection, and the `user_data` given at creation. Reads come from the
/// packed transform buffer when it is fresh for this body and from the
/// native accessor otherwise; both paths return the same values.
///
/// Every read has an `*_into` form that writes into a caller-owned target
/// and returns that same target, so per-frame reads need not allocate.
pub struct RigidBody<B: Backend> {
    handle: RigidBodyHandle,
    core: Rc<BodyCore<B>>,
    user_data: u128,
}

impl<B: Backend> Clone for RigidBody<B> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle,
            core: Rc::clone(&self.core),
            user_data: self.user_data,
        }
    }
}

impl<B: Backend> fmt::Debug for RigidBody<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RigidBody")
            .field("handle", &self.handle)
            .field("user_data", &self.user_data)
            .finish()
    }
}

impl<B: Backend> RigidBody<B> {
    pub(crate) fn new(handle: RigidBodyHandle, core: Rc<BodyCore<B>>, user_data: u128) -> Self {
        Self {
            handle,
            core,
            user_data,
        }
    }

    /// The native handle.
    pub fn handle(&self) -> RigidBodyHandle {
        self.handle
    }

    /// The opaque value given at creation.
    pub fn user_data(&self) -> u128 {
        self.user_data
    }

    /// Whether the native module still knows this body.
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

    // ── Reads ──────────────────────────────────────────────────────

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

    /// Linear velocity.
    pub fn linvel(&self) -> Result<Vect<B::Dim>, PhysicsError> {
        let mut out = Default::default();
        self.linvel_into(&mut out)?;
        Ok(out)
    }

    /// Linear velocity, written into `target`.
    pub fn linvel_into<'t>(
        &self,
        target: &'t mut Vect<B::Dim>,
    ) -> Result<&'t mut Vect<B::Dim>, PhysicsError> {
        self.core
            .read(self.handle, StateField::Linvel, target, |raw, h| raw.linvel(h))?;
        Ok(target)
    }

    /// Angular velocity.
    pub fn angvel(&self) -> Result<AngVect<B::Dim>, PhysicsError> {
        let mut out = Default::default();
        self.angvel_into(&mut out)?;
        Ok(out)
    }

    /// Angular velocity, written into `target`.
    pub fn angvel_into<'t>(
        &self,
        target: &'t mut AngVect<B::Dim>,
    ) -> Result<&'t mut AngVect<B::Dim>, PhysicsError> {
        self.core
            .read(self.handle, StateField::Angvel, target, |raw, h| raw.angvel(h))?;
        Ok(target)
    }

    // ── Writes ─────────────────────────────────────────────────────

    /// Teleport the body. Optionally wake it.
    pub fn set_translation(
        &self,
        translation: Vect<B::Dim>,
        wake_up: bool,
    ) -> Result<(), PhysicsError> {
        self.core.write(self.handle, |raw| {
            raw.set_translation(self.handle, translation, wake_up)
        })
    }

    /// Reorient the body. Optionally wake it.
    pub fn set_rotation(&self, rotation: Rot<B::Dim>, wake_up: bool) -> Result<(), PhysicsError> {
        self.core.write(self.handle, |raw| {
            raw.set_rotation(self.handle, rotation, wake_up)
        })
    }

    /// Set translation and rotation together. Same effect as
    /// [`set_translation`](Self::set_translation) followed by
    /// [`set_rotation`](Self::set_rotation).
    pub fn set_transform(
        &self,
        translation: Vect<B::Dim>,
        rotation: Rot<B::Dim>,
        wake_up: bool,
    ) -> Result<(), PhysicsError> {
        self.core.write(self.handle, |raw| {
            raw.set_transform(self.handle, translation, rotation, wake_up)
        })
    }

    /// Set the linear velocity.
    pub fn set_linvel(&self, linvel: Vect<B::Dim>, wake_up: bool) -> Result<(), PhysicsError> {
        self.core
            .write(self.handle, |raw| raw.set_linvel(self.handle, linvel, wake_up))
    }

    /// Set the angular velocity.
    pub fn set_angvel(&self, angvel: AngVect<B::Dim>, wake_up: bool) -> Result<(), PhysicsError> {
        self.core
            .write(self.handle, |raw| raw.set_angvel(self.handle, angvel, wake_up))
    }

    /// Target position of a position-based kinematic body for the next step.
    pub fn set_next_kinematic_translation(
        &self,
        translation: Vect<B::Dim>,
    ) -> Result<(), PhysicsError> {
        self.core.write(self.handle, |raw| {
            raw.set_next_kinematic_translation(self.handle, translation)
        })
    }

    /// Target orientation of a position-based kinematic body for the next step.
    pub fn set_next_kinematic_rotation(&self, rotation: Rot<B::Dim>) -> Result<(), PhysicsError> {
        self.core.write(self.handle, |raw| {
            raw.set_next_kinematic_rotation(self.handle, rotation)
        })
    }

    /// Apply an impulse at the center of mass.
    pub fn apply_impulse(&self, impulse: Vect<B::Dim>, wake_up: bool) -> Result<(), PhysicsError> {
        self.core.write(self.handle, |raw| {
            raw.apply_impulse(self.handle, impulse, wake_up)
        })
    }

    // ── Activation ─────────────────────────────────────────────────

    /// Whether the body is asleep.
    pub fn is_sleeping(&self) -> Result<bool, PhysicsError> {
        Ok(self.core.raw()?.is_sleeping(self.handle)?)
    }

    /// Wake the body up.
    pub fn wake_up(&self) -> Result<(), PhysicsError> {
        self.core.write(self.handle, |raw| raw.wake_up(self.handle))
    }

    /// Put the body to sleep. Its velocities are zeroed.
    pub fn sleep(&self) -> Result<(), PhysicsError> {
        self.core.write(self.handle, |raw| raw.sleep(self.handle))
    }

    // ── Structure ──────────────────────────────────────────────────

    /// Solver treatment of the body.
    pub fn body_type(&self) -> Result<RigidBodyType, PhysicsError> {
        Ok(self.core.raw()?.body_type(self.handle)?)
    }

    /// Whether the body is dynamic.
    pub fn is_dynamic(&self) -> Result<bool, PhysicsError> {
        Ok(self.body_type()? == RigidBodyType::Dynamic)
    }

    /// Whether the body is fixed.
    pub fn is_fixed(&self) -> Result<bool, PhysicsError> {
        Ok(self.body_type()? == RigidBodyType::Fixed)
    }

    /// Whether the body is kinematic (either variant).
    pub fn is_kinematic(&self) -> Result<bool, PhysicsError> {
        Ok(self.body_type()?.is_kinematic())
    }

    /// Number of colliders attached to the body.
    pub fn num_colliders(&self) -> Result<usize, PhysicsError> {
        Ok(self.core.raw()?.num_colliders(self.handle)?)
    }

    /// Handle of the `i`-th attached collider.
    pub fn collider(&self, i: usize) -> Result<ColliderHandle, PhysicsError> {
        Ok(self.core.raw()?.collider(self.handle, i)?)
    }

    #[cfg(test)]
    pub(crate) fn reads_are_stale(&self) -> bool {
        self.core.is_stale(self.handle)
    }
}
