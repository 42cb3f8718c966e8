//! Reference collider collection.
//!
//! Attached colliders keep a pose relative to their parent body and a
//! cached copy of the parent's pose and velocities from the last step.
//! Packed velocities are the parent's; parentless colliders report zero.

use tether_core::raw::{RawColliderSet, RawStateSource};
use tether_core::{
    AngVect, BodyState, ColliderDesc, ColliderHandle, Dim, EntityKind, NativeError,
    RawBufferView, RigidBodyHandle, Rot, Shape, Vect,
};

use crate::backend::RefBackend;
use crate::bodies::{region_view, repack, PackedRegion, RefBodies, BOOKKEEPING_WORDS};
use crate::islands::RefIslands;
use crate::kinematics::Kinematics;
use crate::memory::RefMemory;
use crate::slots::SlotTable;

#[derive(Debug)]
pub(crate) struct ColliderRecord<D: Dim> {
    pub(crate) parent: Option<RigidBodyHandle>,
    local_translation: Vect<D>,
    local_rotation: Rot<D>,
    /// Parent state as of the last pose sync.
    parent_state: BodyState<D>,
    pub(crate) world: BodyState<D>,
    pub(crate) shape: Shape<D>,
    pub(crate) collision_events: bool,
    pub(crate) enabled: bool,
}

impl<D: Kinematics> ColliderRecord<D> {
    fn attach_to(&mut self, parent: BodyState<D>) {
        self.parent_state = parent;
        self.world = BodyState {
            translation: D::axpy(
                parent.translation,
                1.0,
                D::rotate(parent.rotation, self.local_translation),
            ),
            rotation: D::compose(parent.rotation, self.local_rotation),
            linvel: parent.linvel,
            angvel: parent.angvel,
        };
    }

    fn set_world_translation(&mut self, translation: Vect<D>) {
        self.world.translation = translation;
        self.local_translation = match self.parent {
            Some(_) => {
                let p = &self.parent_state;
                D::inverse_rotate(p.rotation, D::axpy(translation, -1.0, p.translation))
            }
            None => translation,
        };
    }

    fn set_world_rotation(&mut self, rotation: Rot<D>) {
        self.world.rotation = rotation;
        self.local_rotation = match self.parent {
            Some(_) => D::relative(self.parent_state.rotation, rotation),
            None => rotation,
        };
    }

    /// Radius of a ball enclosing the shape.
    pub(crate) fn bounding_radius(&self) -> f32 {
        match self.shape {
            Shape::Ball { radius } => radius,
            Shape::Cuboid { half_extents } => D::length(half_extents),
        }
    }
}

fn invalid(handle: ColliderHandle) -> NativeError {
    NativeError::InvalidHandle {
        kind: EntityKind::Collider,
        handle: handle.0,
    }
}

/// Reference collider collection.
#[derive(Debug)]
pub struct RefColliders<D: Dim> {
    memory: RefMemory,
    pub(crate) table: SlotTable<ColliderRecord<D>>,
    region: Option<PackedRegion>,
}

impl<D: Kinematics> RefColliders<D> {
    pub fn new(memory: RefMemory) -> Self {
        Self {
            memory,
            table: SlotTable::new(),
            region: None,
        }
    }

    fn record(&self, handle: ColliderHandle) -> Result<&ColliderRecord<D>, NativeError> {
        self.table.get(handle.0).ok_or_else(|| invalid(handle))
    }

    fn record_mut(
        &mut self,
        handle: ColliderHandle,
    ) -> Result<&mut ColliderRecord<D>, NativeError> {
        self.table.get_mut(handle.0).ok_or_else(|| invalid(handle))
    }

    /// Drop a collider whose parent is being removed.
    pub(crate) fn detach_and_remove(&mut self, handle: ColliderHandle) {
        self.table.remove(handle.0);
    }

    /// Recompute world poses of attached colliders from their parents.
    pub(crate) fn sync_poses(&mut self, bodies: &RefBodies<D>) {
        for (_, record) in self.table.iter_mut() {
            let Some(parent) = record.parent else {
                continue;
            };
            if let Ok(body) = bodies.record(parent) {
                record.attach_to(body.state);
            }
        }
    }

    pub(crate) fn pack(&mut self) {
        let records = self
            .table
            .iter()
            .map(|(h, r)| (h.index() as usize, r.world));
        repack(&self.memory, &mut self.region, self.table.slot_count(), records);
    }
}

impl<D: Kinematics> RawStateSource for RefColliders<D> {
    type Dim = D;
    type Handle = ColliderHandle;

    fn transform_buffer_view(&self) -> Option<RawBufferView> {
        region_view(&self.memory, self.region)
    }

    fn translation(&self, handle: ColliderHandle) -> Result<Vect<D>, NativeError> {
        Ok(self.record(handle)?.world.translation)
    }

    fn rotation(&self, handle: ColliderHandle) -> Result<Rot<D>, NativeError> {
        Ok(self.record(handle)?.world.rotation)
    }

    fn linvel(&self, handle: ColliderHandle) -> Result<Vect<D>, NativeError> {
        Ok(self.record(handle)?.world.linvel)
    }

    fn angvel(&self, handle: ColliderHandle) -> Result<AngVect<D>, NativeError> {
        Ok(self.record(handle)?.world.angvel)
    }
}

impl<D: Kinematics> RawColliderSet<RefBackend<D>> for RefColliders<D> {
    fn create_collider(
        &mut self,
        desc: &ColliderDesc<D>,
        parent: Option<RigidBodyHandle>,
        bodies: &mut RefBodies<D>,
    ) -> Result<ColliderHandle, NativeError> {
        let mut record = ColliderRecord {
            parent,
            local_translation: desc.translation,
            local_rotation: desc.rotation,
            parent_state: BodyState::default(),
            world: BodyState {
                translation: desc.translation,
                rotation: desc.rotation,
                ..BodyState::default()
            },
            shape: desc.shape,
            collision_events: desc.collision_events,
            enabled: desc.enabled,
        };
        if let Some(p) = parent {
            record.attach_to(bodies.record(p)?.state);
        }
        self.memory.alloc(BOOKKEEPING_WORDS);
        let handle = ColliderHandle(self.table.insert(record));
        if let Some(p) = parent {
            bodies.record_mut(p)?.colliders.push(handle);
        }
        Ok(handle)
    }

    fn remove(
        &mut self,
        handle: ColliderHandle,
        _islands: &mut RefIslands,
        bodies: &mut RefBodies<D>,
        wake_up: bool,
    ) -> Result<(), NativeError> {
        let Some(record) = self.table.remove(handle.0) else {
            return Ok(());
        };
        if let Some(parent) = record.parent {
            if let Ok(body) = bodies.record_mut(parent) {
                body.colliders.retain(|c| *c != handle);
                if wake_up {
                    body.sleeping = false;
                }
            }
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.table.len()
    }

    fn contains(&self, handle: ColliderHandle) -> bool {
        self.table.contains(handle.0)
    }

    fn for_each_handle(&self, f: &mut dyn FnMut(ColliderHandle)) {
        for (h, _) in self.table.iter() {
            f(ColliderHandle(h));
        }
    }

    fn parent(&self, handle: ColliderHandle) -> Result<Option<RigidBodyHandle>, NativeError> {
        Ok(self.record(handle)?.parent)
    }

    fn set_translation(
        &mut self,
        handle: ColliderHandle,
        translation: Vect<D>,
    ) -> Result<(), NativeError> {
        self.record_mut(handle)?.set_world_translation(translation);
        Ok(())
    }

    fn set_rotation(&mut self, handle: ColliderHandle, rotation: Rot<D>) -> Result<(), NativeError> {
        self.record_mut(handle)?.set_world_rotation(rotation);
        Ok(())
    }
}
