//! [`RefBackend`]: the reference native module.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use tether_core::{Backend, Dim2, Dim3, EntityKind};

use crate::bodies::RefBodies;
use crate::colliders::RefColliders;
use crate::events::RefEventQueue;
use crate::islands::RefIslands;
use crate::joints::{RefImpulseJoints, RefMultibodyJoints};
use crate::kinematics::Kinematics;
use crate::memory::RefMemory;
use crate::pipeline::{FaultSlot, RefPipeline};

/// A loaded reference module. Every object it creates shares one
/// [`RefMemory`].
#[derive(Debug)]
pub struct RefBackend<D> {
    memory: RefMemory,
    faults: FaultSlot,
    _dim: PhantomData<D>,
}

/// 2D reference module.
pub type RefBackend2 = RefBackend<Dim2>;
/// 3D reference module.
pub type RefBackend3 = RefBackend<Dim3>;

impl<D: Kinematics> RefBackend<D> {
    pub fn new() -> Self {
        Self::with_memory(RefMemory::new())
    }

    /// A module whose memory grows `page_words` at a time.
    pub fn with_page_words(page_words: usize) -> Self {
        Self::with_memory(RefMemory::with_page_words(page_words))
    }

    pub fn with_memory(memory: RefMemory) -> Self {
        Self {
            memory,
            faults: Rc::new(RefCell::new(None)),
            _dim: PhantomData,
        }
    }

    /// Make the next step of any pipeline from this module fail with
    /// `NativeError::Fatal { reason }`.
    pub fn fail_next_step(&self, reason: impl Into<String>) {
        *self.faults.borrow_mut() = Some(reason.into());
    }
}

impl<D: Kinematics> Default for RefBackend<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Kinematics> Backend for RefBackend<D> {
    type Dim = D;
    type Memory = RefMemory;
    type Bodies = RefBodies<D>;
    type Colliders = RefColliders<D>;
    type ImpulseJoints = RefImpulseJoints<D>;
    type MultibodyJoints = RefMultibodyJoints<D>;
    type Islands = RefIslands;
    type Pipeline = RefPipeline<D>;
    type EventQueue = RefEventQueue;

    fn memory(&self) -> RefMemory {
        self.memory.clone()
    }

    fn new_rigid_body_set(&self) -> RefBodies<D> {
        RefBodies::new(self.memory.clone())
    }

    fn new_collider_set(&self) -> RefColliders<D> {
        RefColliders::new(self.memory.clone())
    }

    fn new_impulse_joint_set(&self) -> RefImpulseJoints<D> {
        RefImpulseJoints::new(EntityKind::ImpulseJoint)
    }

    fn new_multibody_joint_set(&self) -> RefMultibodyJoints<D> {
        RefMultibodyJoints::new(EntityKind::MultibodyJoint)
    }

    fn new_island_manager(&self) -> RefIslands {
        RefIslands::new()
    }

    fn new_pipeline(&self) -> RefPipeline<D> {
        RefPipeline::new(self.faults.clone())
    }

    fn new_event_queue(&self) -> RefEventQueue {
        RefEventQueue::new()
    }
}
