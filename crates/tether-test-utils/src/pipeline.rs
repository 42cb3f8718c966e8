//! Reference step: integrate, sync collider poses, detect overlaps,
//! repack transform buffers.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::rc::Rc;

use tether_core::raw::{RawEventQueue, RawPhysicsPipeline};
use tether_core::{ColliderHandle, CollisionEvent, IntegrationParameters, NativeError, Vect};

use crate::backend::RefBackend;
use crate::bodies::RefBodies;
use crate::colliders::RefColliders;
use crate::events::RefEventQueue;
use crate::islands::RefIslands;
use crate::joints::{RefImpulseJoints, RefMultibodyJoints};
use crate::kinematics::Kinematics;

/// Pending injected failure, shared with the owning backend.
pub(crate) type FaultSlot = Rc<RefCell<Option<String>>>;

/// Reference pipeline. Contact detection treats every collider as its
/// bounding ball.
#[derive(Debug)]
pub struct RefPipeline<D> {
    contacts: BTreeSet<(ColliderHandle, ColliderHandle)>,
    faults: FaultSlot,
    _dim: PhantomData<D>,
}

impl<D: Kinematics> RefPipeline<D> {
    pub(crate) fn new(faults: FaultSlot) -> Self {
        Self {
            contacts: BTreeSet::new(),
            faults,
            _dim: PhantomData,
        }
    }

    /// Pairs currently in contact.
    pub fn contact_pairs(&self) -> usize {
        self.contacts.len()
    }

    fn detect_contacts(
        &mut self,
        colliders: &RefColliders<D>,
        mut events: Option<&mut RefEventQueue>,
    ) {
        let candidates: Vec<_> = colliders
            .table
            .iter()
            .filter(|(_, r)| r.enabled)
            .map(|(h, r)| (ColliderHandle(h), r))
            .collect();

        let mut current = BTreeSet::new();
        for (i, (h1, r1)) in candidates.iter().enumerate() {
            for (h2, r2) in &candidates[i + 1..] {
                if r1.parent.is_some() && r1.parent == r2.parent {
                    continue;
                }
                if !(r1.collision_events || r2.collision_events) {
                    continue;
                }
                let gap = D::distance(r1.world.translation, r2.world.translation);
                if gap <= r1.bounding_radius() + r2.bounding_radius() {
                    current.insert((*h1, *h2));
                }
            }
        }

        if let Some(queue) = events.as_deref_mut() {
            for &(collider1, collider2) in current.difference(&self.contacts) {
                queue.push(CollisionEvent {
                    collider1,
                    collider2,
                    started: true,
                });
            }
            for &(collider1, collider2) in self.contacts.difference(&current) {
                if colliders.table.contains(collider1.0) && colliders.table.contains(collider2.0) {
                    queue.push(CollisionEvent {
                        collider1,
                        collider2,
                        started: false,
                    });
                }
            }
        }
        self.contacts = current;
    }
}

impl<D: Kinematics> RawPhysicsPipeline<RefBackend<D>> for RefPipeline<D> {
    fn step(
        &mut self,
        gravity: &Vect<D>,
        params: &IntegrationParameters,
        islands: &mut RefIslands,
        bodies: &mut RefBodies<D>,
        colliders: &mut RefColliders<D>,
        _impulse_joints: &mut RefImpulseJoints<D>,
        _multibody_joints: &mut RefMultibodyJoints<D>,
        events: Option<&mut RefEventQueue>,
    ) -> Result<(), NativeError> {
        if let Some(reason) = self.faults.borrow_mut().take() {
            return Err(NativeError::Fatal { reason });
        }
        bodies.integrate(*gravity, params.dt);
        colliders.sync_poses(bodies);
        islands.update(bodies);
        self.detect_contacts(colliders, events);
        bodies.pack();
        colliders.pack();
        Ok(())
    }
}
