//! Reference joint collections. Joints are bookkeeping only: the
//! reference integrator applies no joint constraints.

use std::marker::PhantomData;

use tether_core::raw::{RawImpulseJointSet, RawMultibodyJointSet};
use tether_core::{
    ArenaKey, Dim, EntityKind, ImpulseJointHandle, JointData, MultibodyJointHandle, NativeError,
    RigidBodyHandle,
};

use crate::backend::RefBackend;
use crate::bodies::RefBodies;
use crate::kinematics::Kinematics;
use crate::slots::SlotTable;

#[derive(Debug)]
struct JointRecord<D: Dim> {
    data: JointData<D>,
    body1: RigidBodyHandle,
    body2: RigidBodyHandle,
}

/// A joint collection keyed by `K`.
#[derive(Debug)]
pub struct RefJoints<D: Dim, K> {
    table: SlotTable<JointRecord<D>>,
    kind: EntityKind,
    _key: PhantomData<K>,
}

/// Reference impulse-joint collection.
pub type RefImpulseJoints<D> = RefJoints<D, ImpulseJointHandle>;
/// Reference multibody-joint collection.
pub type RefMultibodyJoints<D> = RefJoints<D, MultibodyJointHandle>;

impl<D: Kinematics, K: ArenaKey> RefJoints<D, K> {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            table: SlotTable::new(),
            kind,
            _key: PhantomData,
        }
    }

    fn create(
        &mut self,
        bodies: &mut RefBodies<D>,
        data: &JointData<D>,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        wake_up: bool,
    ) -> Result<K, NativeError> {
        bodies.record(body1)?;
        bodies.record(body2)?;
        if wake_up {
            for body in [body1, body2] {
                bodies.record_mut(body)?.sleeping = false;
            }
        }
        Ok(K::from_handle(self.table.insert(JointRecord {
            data: *data,
            body1,
            body2,
        })))
    }

    fn remove_joint(
        &mut self,
        handle: K,
        bodies: &mut RefBodies<D>,
        wake_up: bool,
    ) -> Result<(), NativeError> {
        let Some(record) = self.table.remove(handle.handle()) else {
            return Ok(());
        };
        if wake_up {
            for body in [record.body1, record.body2] {
                if let Ok(r) = bodies.record_mut(body) {
                    r.sleeping = false;
                }
            }
        }
        Ok(())
    }

    /// The data a joint was created with.
    pub fn joint_data(&self, handle: K) -> Option<JointData<D>> {
        self.table.get(handle.handle()).map(|r| r.data)
    }

    /// Drop every joint touching `body`.
    pub(crate) fn remove_attached(&mut self, body: RigidBodyHandle) {
        let doomed: Vec<_> = self
            .table
            .iter()
            .filter(|(_, r)| r.body1 == body || r.body2 == body)
            .map(|(h, _)| h)
            .collect();
        for h in doomed {
            self.table.remove(h);
        }
    }

    fn attached(&self, handle: K) -> Result<(RigidBodyHandle, RigidBodyHandle), NativeError> {
        let record = self
            .table
            .get(handle.handle())
            .ok_or(NativeError::InvalidHandle {
                kind: self.kind,
                handle: handle.handle(),
            })?;
        Ok((record.body1, record.body2))
    }

    fn visit(&self, f: &mut dyn FnMut(K)) {
        for (h, _) in self.table.iter() {
            f(K::from_handle(h));
        }
    }
}

impl<D: Kinematics> RawImpulseJointSet<RefBackend<D>> for RefImpulseJoints<D> {
    fn create_joint(
        &mut self,
        bodies: &mut RefBodies<D>,
        data: &JointData<D>,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        wake_up: bool,
    ) -> Result<ImpulseJointHandle, NativeError> {
        self.create(bodies, data, body1, body2, wake_up)
    }

    fn remove(
        &mut self,
        handle: ImpulseJointHandle,
        bodies: &mut RefBodies<D>,
        wake_up: bool,
    ) -> Result<(), NativeError> {
        self.remove_joint(handle, bodies, wake_up)
    }

    fn len(&self) -> usize {
        self.table.len()
    }

    fn contains(&self, handle: ImpulseJointHandle) -> bool {
        self.table.contains(handle.0)
    }

    fn for_each_handle(&self, f: &mut dyn FnMut(ImpulseJointHandle)) {
        self.visit(f);
    }

    fn attached_bodies(
        &self,
        handle: ImpulseJointHandle,
    ) -> Result<(RigidBodyHandle, RigidBodyHandle), NativeError> {
        self.attached(handle)
    }
}

impl<D: Kinematics> RawMultibodyJointSet<RefBackend<D>> for RefMultibodyJoints<D> {
    fn create_joint(
        &mut self,
        bodies: &mut RefBodies<D>,
        data: &JointData<D>,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        wake_up: bool,
    ) -> Result<MultibodyJointHandle, NativeError> {
        self.create(bodies, data, body1, body2, wake_up)
    }

    fn remove(
        &mut self,
        handle: MultibodyJointHandle,
        bodies: &mut RefBodies<D>,
        wake_up: bool,
    ) -> Result<(), NativeError> {
        self.remove_joint(handle, bodies, wake_up)
    }

    fn len(&self) -> usize {
        self.table.len()
    }

    fn contains(&self, handle: MultibodyJointHandle) -> bool {
        self.table.contains(handle.0)
    }

    fn for_each_handle(&self, f: &mut dyn FnMut(MultibodyJointHandle)) {
        self.visit(f);
    }

    fn attached_bodies(
        &self,
        handle: MultibodyJointHandle,
    ) -> Result<(RigidBodyHandle, RigidBodyHandle), NativeError> {
        self.attached(handle)
    }
}
