//! Reference rigid-body collection.

use tether_core::raw::{RawRigidBodySet, RawStateSource};
use tether_core::{
    AngVect, BodyState, ColliderHandle, Dim, EntityKind, LinearMemory, NativeError,
    RawBufferView, RigidBodyDesc, RigidBodyHandle, RigidBodyType, Rot, Vect,
};

use crate::backend::RefBackend;
use crate::colliders::RefColliders;
use crate::islands::RefIslands;
use crate::joints::{RefImpulseJoints, RefMultibodyJoints};
use crate::kinematics::Kinematics;
use crate::memory::RefMemory;
use crate::slots::SlotTable;

/// Words of native bookkeeping allocated per created entity. Creation
/// therefore consumes memory and may grow it.
pub const BOOKKEEPING_WORDS: usize = 16;

/// A packed transform region owned by a collection.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PackedRegion {
    pub(crate) offset: usize,
    pub(crate) capacity: usize,
    pub(crate) len: usize,
}

/// Write `records` (index, state) into `region`, reallocating when the
/// region is too small.
pub(crate) fn repack<D: Dim>(
    memory: &RefMemory,
    region: &mut Option<PackedRegion>,
    slot_count: usize,
    records: impl Iterator<Item = (usize, BodyState<D>)>,
) {
    let stride = D::LAYOUT.stride;
    let len = slot_count * stride;
    let fits = matches!(region, Some(r) if r.capacity >= len);
    if !fits {
        let capacity = (len * 2).max(stride);
        *region = Some(PackedRegion {
            offset: memory.alloc(capacity),
            capacity,
            len: 0,
        });
    }
    let mut buf = vec![0.0f32; len];
    for (index, state) in records {
        D::pack_state(&state, &mut buf[index * stride..(index + 1) * stride]);
    }
    if let Some(r) = region.as_mut() {
        memory.write(r.offset, &buf);
        r.len = len;
    }
}

pub(crate) fn region_view(
    memory: &RefMemory,
    region: Option<PackedRegion>,
) -> Option<RawBufferView> {
    region.map(|r| RawBufferView {
        offset: memory.physical(r.offset),
        len: r.len,
        epoch: memory.epoch(),
    })
}

#[derive(Debug)]
pub(crate) struct BodyRecord<D: Dim> {
    pub(crate) body_type: RigidBodyType,
    pub(crate) state: BodyState<D>,
    pub(crate) next_translation: Option<Vect<D>>,
    pub(crate) next_rotation: Option<Rot<D>>,
    pub(crate) gravity_scale: f32,
    pub(crate) mass: f32,
    pub(crate) linear_damping: f32,
    pub(crate) angular_damping: f32,
    pub(crate) sleeping: bool,
    pub(crate) enabled: bool,
    pub(crate) colliders: Vec<ColliderHandle>,
}

impl<D: Kinematics> BodyRecord<D> {
    fn from_desc(desc: &RigidBodyDesc<D>) -> Self {
        Self {
            body_type: desc.body_type,
            state: BodyState {
                translation: desc.translation,
                rotation: desc.rotation,
                linvel: desc.linvel,
                angvel: desc.angvel,
            },
            next_translation: None,
            next_rotation: None,
            gravity_scale: desc.gravity_scale,
            mass: desc.mass,
            linear_damping: desc.linear_damping,
            angular_damping: desc.angular_damping,
            sleeping: desc.sleeping && desc.can_sleep,
            enabled: desc.enabled,
            colliders: Vec::new(),
        }
    }

    /// Whether the integrator moves this body.
    pub(crate) fn is_active(&self) -> bool {
        self.enabled && !self.sleeping && self.body_type != RigidBodyType::Fixed
    }

    /// Semi-implicit Euler for dynamic and velocity-based bodies, target
    /// tracking for position-based ones.
    pub(crate) fn integrate(&mut self, gravity: Vect<D>, dt: f32) {
        if !self.is_active() {
            return;
        }
        let s = &mut self.state;
        match self.body_type {
            RigidBodyType::Dynamic => {
                let lin_damping = 1.0 / (1.0 + dt * self.linear_damping);
                s.linvel = D::axpy(s.linvel, self.gravity_scale * dt, gravity);
                s.linvel = D::axpy(Default::default(), lin_damping, s.linvel);
                s.angvel = D::scale_ang(s.angvel, 1.0 / (1.0 + dt * self.angular_damping));
                s.translation = D::axpy(s.translation, dt, s.linvel);
                s.rotation = D::integrate_rotation(s.rotation, s.angvel, dt);
            }
            RigidBodyType::KinematicVelocityBased => {
                s.translation = D::axpy(s.translation, dt, s.linvel);
                s.rotation = D::integrate_rotation(s.rotation, s.angvel, dt);
            }
            RigidBodyType::KinematicPositionBased => {
                if let Some(target) = self.next_translation.take() {
                    let inv_dt = if dt == 0.0 { 0.0 } else { 1.0 / dt };
                    let delta = D::axpy(target, -1.0, s.translation);
                    s.linvel = D::axpy(Default::default(), inv_dt, delta);
                    s.translation = target;
                } else {
                    s.linvel = Default::default();
                }
                if let Some(target) = self.next_rotation.take() {
                    s.rotation = target;
                }
            }
            RigidBodyType::Fixed => {}
        }
    }
}

fn invalid(handle: RigidBodyHandle) -> NativeError {
    NativeError::InvalidHandle {
        kind: EntityKind::RigidBody,
        handle: handle.0,
    }
}

/// Reference rigid-body collection.
#[derive(Debug)]
pub struct RefBodies<D: Dim> {
    pub(crate) memory: RefMemory,
    pub(crate) table: SlotTable<BodyRecord<D>>,
    region: Option<PackedRegion>,
}

impl<D: Kinematics> RefBodies<D> {
    pub fn new(memory: RefMemory) -> Self {
        Self {
            memory,
            table: SlotTable::new(),
            region: None,
        }
    }

    pub(crate) fn record(&self, handle: RigidBodyHandle) -> Result<&BodyRecord<D>, NativeError> {
        self.table.get(handle.0).ok_or_else(|| invalid(handle))
    }

    pub(crate) fn record_mut(
        &mut self,
        handle: RigidBodyHandle,
    ) -> Result<&mut BodyRecord<D>, NativeError> {
        self.table.get_mut(handle.0).ok_or_else(|| invalid(handle))
    }

    fn update(
        &mut self,
        handle: RigidBodyHandle,
        wake_up: bool,
        f: impl FnOnce(&mut BodyRecord<D>),
    ) -> Result<(), NativeError> {
        let record = self.record_mut(handle)?;
        f(record);
        if wake_up {
            record.sleeping = false;
        }
        Ok(())
    }

    pub(crate) fn integrate(&mut self, gravity: Vect<D>, dt: f32) {
        for (_, record) in self.table.iter_mut() {
            record.integrate(gravity, dt);
        }
    }

    pub(crate) fn pack(&mut self) {
        let records = self
            .table
            .iter()
            .map(|(h, r)| (h.index() as usize, r.state));
        repack(&self.memory, &mut self.region, self.table.slot_count(), records);
    }
}

impl<D: Kinematics> RawStateSource for RefBodies<D> {
    type Dim = D;
    type Handle = RigidBodyHandle;

    fn transform_buffer_view(&self) -> Option<RawBufferView> {
        region_view(&self.memory, self.region)
    }

    fn translation(&self, handle: RigidBodyHandle) -> Result<Vect<D>, NativeError> {
        Ok(self.record(handle)?.state.translation)
    }

    fn rotation(&self, handle: RigidBodyHandle) -> Result<Rot<D>, NativeError> {
        Ok(self.record(handle)?.state.rotation)
    }

    fn linvel(&self, handle: RigidBodyHandle) -> Result<Vect<D>, NativeError> {
        Ok(self.record(handle)?.state.linvel)
    }

    fn angvel(&self, handle: RigidBodyHandle) -> Result<AngVect<D>, NativeError> {
        Ok(self.record(handle)?.state.angvel)
    }
}

impl<D: Kinematics> RawRigidBodySet<RefBackend<D>> for RefBodies<D> {
    fn create_rigid_body(
        &mut self,
        desc: &RigidBodyDesc<D>,
    ) -> Result<RigidBodyHandle, NativeError> {
        self.memory.alloc(BOOKKEEPING_WORDS);
        Ok(RigidBodyHandle(self.table.insert(BodyRecord::from_desc(desc))))
    }

    fn remove(
        &mut self,
        handle: RigidBodyHandle,
        islands: &mut RefIslands,
        colliders: &mut RefColliders<D>,
        impulse_joints: &mut RefImpulseJoints<D>,
        multibody_joints: &mut RefMultibodyJoints<D>,
    ) -> Result<(), NativeError> {
        let Some(record) = self.table.remove(handle.0) else {
            return Ok(());
        };
        for collider in record.colliders {
            colliders.detach_and_remove(collider);
        }
        impulse_joints.remove_attached(handle);
        multibody_joints.remove_attached(handle);
        islands.forget(handle);
        Ok(())
    }

    fn len(&self) -> usize {
        self.table.len()
    }

    fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.table.contains(handle.0)
    }

    fn for_each_handle(&self, f: &mut dyn FnMut(RigidBodyHandle)) {
        for (h, _) in self.table.iter() {
            f(RigidBodyHandle(h));
        }
    }

    fn num_colliders(&self, handle: RigidBodyHandle) -> Result<usize, NativeError> {
        Ok(self.record(handle)?.colliders.len())
    }

    fn collider(&self, handle: RigidBodyHandle, i: usize) -> Result<ColliderHandle, NativeError> {
        let colliders = &self.record(handle)?.colliders;
        colliders
            .get(i)
            .copied()
            .ok_or(NativeError::IndexOutOfRange {
                index: i,
                len: colliders.len(),
            })
    }

    fn body_type(&self, handle: RigidBodyHandle) -> Result<RigidBodyType, NativeError> {
        Ok(self.record(handle)?.body_type)
    }

    fn set_translation(
        &mut self,
        handle: RigidBodyHandle,
        translation: Vect<D>,
        wake_up: bool,
    ) -> Result<(), NativeError> {
        self.update(handle, wake_up, |r| r.state.translation = translation)
    }

    fn set_rotation(
        &mut self,
        handle: RigidBodyHandle,
        rotation: Rot<D>,
        wake_up: bool,
    ) -> Result<(), NativeError> {
        self.update(handle, wake_up, |r| r.state.rotation = rotation)
    }

    fn set_linvel(
        &mut self,
        handle: RigidBodyHandle,
        linvel: Vect<D>,
        wake_up: bool,
    ) -> Result<(), NativeError> {
        self.update(handle, wake_up, |r| r.state.linvel = linvel)
    }

    fn set_angvel(
        &mut self,
        handle: RigidBodyHandle,
        angvel: AngVect<D>,
        wake_up: bool,
    ) -> Result<(), NativeError> {
        self.update(handle, wake_up, |r| r.state.angvel = angvel)
    }

    fn set_next_kinematic_translation(
        &mut self,
        handle: RigidBodyHandle,
        translation: Vect<D>,
    ) -> Result<(), NativeError> {
        self.update(handle, true, |r| {
            if r.body_type == RigidBodyType::KinematicPositionBased {
                r.next_translation = Some(translation);
            }
        })
    }

    fn set_next_kinematic_rotation(
        &mut self,
        handle: RigidBodyHandle,
        rotation: Rot<D>,
    ) -> Result<(), NativeError> {
        self.update(handle, true, |r| {
            if r.body_type == RigidBodyType::KinematicPositionBased {
                r.next_rotation = Some(rotation);
            }
        })
    }

    fn apply_impulse(
        &mut self,
        handle: RigidBodyHandle,
        impulse: Vect<D>,
        wake_up: bool,
    ) -> Result<(), NativeError> {
        self.update(handle, wake_up, |r| {
            if r.body_type == RigidBodyType::Dynamic {
                // Bodies without explicit mass behave as unit mass.
                let inv_mass = if r.mass > 0.0 { 1.0 / r.mass } else { 1.0 };
                r.state.linvel = D::axpy(r.state.linvel, inv_mass, impulse);
            }
        })
    }

    fn is_sleeping(&self, handle: RigidBodyHandle) -> Result<bool, NativeError> {
        Ok(self.record(handle)?.sleeping)
    }

    fn wake_up(&mut self, handle: RigidBodyHandle) -> Result<(), NativeError> {
        self.update(handle, true, |_| {})
    }

    fn sleep(&mut self, handle: RigidBodyHandle) -> Result<(), NativeError> {
        self.update(handle, false, |r| {
            r.sleeping = true;
            r.state.linvel = Default::default();
            r.state.angvel = Default::default();
        })
    }
}
