//! The native boundary.
//!
//! Everything the host layer needs from a native physics module is
//! expressed by the traits in this module. A native module runs in its own
//! linear memory ([`LinearMemory`]); it packs per-entity state into a
//! transform buffer inside that memory and describes where the buffer
//! lives with a [`RawBufferView`].
//!
//! # Memory epochs
//!
//! Growing native memory may move every region inside it. The module
//! reports this by advancing its [`MemoryEpoch`]; a `RawBufferView`
//! obtained under an older epoch must not be dereferenced.
//!
//! # Contract for implementors
//!
//! - Handles handed out by `create_*` are never reused with the same
//!   generation.
//! - [`RawPhysicsPipeline::step`] must repack the transform buffers of both
//!   the rigid-body and the collider set before returning `Ok`.
//! - Operations on a dead handle return [`NativeError::InvalidHandle`],
//!   except `remove`, which treats unknown handles as a no-op.

use std::fmt;

use crate::desc::{ColliderDesc, CollisionEvent, JointData, RigidBodyDesc, RigidBodyType};
use crate::dim::{AngVect, Dim, Rot, Vect};
use crate::error::NativeError;
use crate::handle::{
    ArenaKey, ColliderHandle, ImpulseJointHandle, MultibodyJointHandle, RigidBodyHandle,
};
use crate::params::IntegrationParameters;

/// Generation counter of a native linear memory.
///
/// Advanced every time the memory is reallocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoryEpoch(pub u64);

impl fmt::Display for MemoryEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A native module's linear memory, viewed as `f32` words.
pub trait LinearMemory {
    /// Current epoch.
    fn epoch(&self) -> MemoryEpoch;

    /// Run `f` over the current memory contents.
    fn with_words<T>(&self, f: impl FnOnce(&[f32]) -> T) -> T;
}

/// Location of a packed transform buffer inside linear memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawBufferView {
    /// Start of the buffer, in `f32` words.
    pub offset: usize,
    /// Length of the packed region, in `f32` words.
    pub len: usize,
    /// Memory epoch under which `offset` is valid.
    pub epoch: MemoryEpoch,
}

impl RawBufferView {
    /// Whether this view may still be dereferenced under `current`.
    pub fn is_current(&self, current: MemoryEpoch) -> bool {
        self.epoch == current
    }
}

/// A native collection whose entities have packed kinematic state.
///
/// The per-entity accessors are the slow path: the host only calls them
/// when the packed buffer cannot serve a read.
pub trait RawStateSource {
    /// Dimensionality of the packed state.
    type Dim: Dim;
    /// Entity handle type.
    type Handle: ArenaKey;

    /// Where the most recently packed buffer lives, if any step has packed one.
    fn transform_buffer_view(&self) -> Option<RawBufferView>;

    /// Current translation.
    fn translation(&self, handle: Self::Handle) -> Result<Vect<Self::Dim>, NativeError>;

    /// Current rotation.
    fn rotation(&self, handle: Self::Handle) -> Result<Rot<Self::Dim>, NativeError>;

    /// Current linear velocity.
    fn linvel(&self, handle: Self::Handle) -> Result<Vect<Self::Dim>, NativeError>;

    /// Current angular velocity.
    fn angvel(&self, handle: Self::Handle) -> Result<AngVect<Self::Dim>, NativeError>;
}

/// A loaded native physics module: the family of raw objects it provides.
pub trait Backend: Sized {
    /// Dimensionality of the module.
    type Dim: Dim;
    /// The module's linear memory. Clones refer to the same memory.
    type Memory: LinearMemory + Clone;
    /// Native rigid-body collection.
    type Bodies: RawRigidBodySet<Self>;
    /// Native collider collection.
    type Colliders: RawColliderSet<Self>;
    /// Native impulse-joint collection.
    type ImpulseJoints: RawImpulseJointSet<Self>;
    /// Native multibody-joint collection.
    type MultibodyJoints: RawMultibodyJointSet<Self>;
    /// Native activity tracker.
    type Islands: RawIslandManager;
    /// Native step function and its internal phases.
    type Pipeline: RawPhysicsPipeline<Self>;
    /// Native event sink.
    type EventQueue: RawEventQueue;

    /// The module's linear memory.
    fn memory(&self) -> Self::Memory;
    /// Allocate an empty rigid-body collection.
    fn new_rigid_body_set(&self) -> Self::Bodies;
    /// Allocate an empty collider collection.
    fn new_collider_set(&self) -> Self::Colliders;
    /// Allocate an empty impulse-joint collection.
    fn new_impulse_joint_set(&self) -> Self::ImpulseJoints;
    /// Allocate an empty multibody-joint collection.
    fn new_multibody_joint_set(&self) -> Self::MultibodyJoints;
    /// Allocate an island manager.
    fn new_island_manager(&self) -> Self::Islands;
    /// Allocate a pipeline.
    fn new_pipeline(&self) -> Self::Pipeline;
    /// Allocate an event queue.
    fn new_event_queue(&self) -> Self::EventQueue;
}

/// Native rigid-body collection.
pub trait RawRigidBodySet<B: Backend>:
    RawStateSource<Dim = B::Dim, Handle = RigidBodyHandle>
{
    /// Insert a body. May grow linear memory.
    fn create_rigid_body(
        &mut self,
        desc: &RigidBodyDesc<B::Dim>,
    ) -> Result<RigidBodyHandle, NativeError>;

    /// Remove a body together with its colliders and joints.
    fn remove(
        &mut self,
        handle: RigidBodyHandle,
        islands: &mut B::Islands,
        colliders: &mut B::Colliders,
        impulse_joints: &mut B::ImpulseJoints,
        multibody_joints: &mut B::MultibodyJoints,
    ) -> Result<(), NativeError>;

    /// Number of live bodies.
    fn len(&self) -> usize;

    /// Whether there are no live bodies.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `handle` names a live body.
    fn contains(&self, handle: RigidBodyHandle) -> bool;

    /// Call `f` with every live handle.
    fn for_each_handle(&self, f: &mut dyn FnMut(RigidBodyHandle));

    /// Number of colliders attached to the body.
    fn num_colliders(&self, handle: RigidBodyHandle) -> Result<usize, NativeError>;

    /// The `i`-th collider attached to the body.
    fn collider(&self, handle: RigidBodyHandle, i: usize) -> Result<ColliderHandle, NativeError>;

    /// Solver treatment of the body.
    fn body_type(&self, handle: RigidBodyHandle) -> Result<RigidBodyType, NativeError>;

    /// Teleport the body.
    fn set_translation(
        &mut self,
        handle: RigidBodyHandle,
        translation: Vect<B::Dim>,
        wake_up: bool,
    ) -> Result<(), NativeError>;

    /// Reorient the body.
    fn set_rotation(
        &mut self,
        handle: RigidBodyHandle,
        rotation: Rot<B::Dim>,
        wake_up: bool,
    ) -> Result<(), NativeError>;

    /// Set translation and rotation in one call.
    ///
    /// Must behave exactly like `set_translation` followed by `set_rotation`.
    fn set_transform(
        &mut self,
        handle: RigidBodyHandle,
        translation: Vect<B::Dim>,
        rotation: Rot<B::Dim>,
        wake_up: bool,
    ) -> Result<(), NativeError> {
        self.set_translation(handle, translation, wake_up)?;
        self.set_rotation(handle, rotation, wake_up)
    }

    /// Set the linear velocity.
    fn set_linvel(
        &mut self,
        handle: RigidBodyHandle,
        linvel: Vect<B::Dim>,
        wake_up: bool,
    ) -> Result<(), NativeError>;

    /// Set the angular velocity.
    fn set_angvel(
        &mut self,
        handle: RigidBodyHandle,
        angvel: AngVect<B::Dim>,
        wake_up: bool,
    ) -> Result<(), NativeError>;

    /// Target position for a position-based kinematic body at the next step.
    fn set_next_kinematic_translation(
        &mut self,
        handle: RigidBodyHandle,
        translation: Vect<B::Dim>,
    ) -> Result<(), NativeError>;

    /// Target orientation for a position-based kinematic body at the next step.
    fn set_next_kinematic_rotation(
        &mut self,
        handle: RigidBodyHandle,
        rotation: Rot<B::Dim>,
    ) -> Result<(), NativeError>;

    /// Apply an impulse at the center of mass.
    fn apply_impulse(
        &mut self,
        handle: RigidBodyHandle,
        impulse: Vect<B::Dim>,
        wake_up: bool,
    ) -> Result<(), NativeError>;

    /// Whether the body is asleep.
    fn is_sleeping(&self, handle: RigidBodyHandle) -> Result<bool, NativeError>;

    /// Wake the body.
    fn wake_up(&mut self, handle: RigidBodyHandle) -> Result<(), NativeError>;

    /// Put the body to sleep.
    fn sleep(&mut self, handle: RigidBodyHandle) -> Result<(), NativeError>;
}

/// Native collider collection.
pub trait RawColliderSet<B: Backend>:
    RawStateSource<Dim = B::Dim, Handle = ColliderHandle>
{
    /// Insert a collider, optionally attached to a body. May grow linear memory.
    fn create_collider(
        &mut self,
        desc: &ColliderDesc<B::Dim>,
        parent: Option<RigidBodyHandle>,
        bodies: &mut B::Bodies,
    ) -> Result<ColliderHandle, NativeError>;

    /// Remove a collider.
    fn remove(
        &mut self,
        handle: ColliderHandle,
        islands: &mut B::Islands,
        bodies: &mut B::Bodies,
        wake_up: bool,
    ) -> Result<(), NativeError>;

    /// Number of live colliders.
    fn len(&self) -> usize;

    /// Whether there are no live colliders.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `handle` names a live collider.
    fn contains(&self, handle: ColliderHandle) -> bool;

    /// Call `f` with every live handle.
    fn for_each_handle(&self, f: &mut dyn FnMut(ColliderHandle));

    /// The body the collider is attached to.
    fn parent(&self, handle: ColliderHandle) -> Result<Option<RigidBodyHandle>, NativeError>;

    /// Move the collider.
    fn set_translation(
        &mut self,
        handle: ColliderHandle,
        translation: Vect<B::Dim>,
    ) -> Result<(), NativeError>;

    /// Reorient the collider.
    fn set_rotation(
        &mut self,
        handle: ColliderHandle,
        rotation: Rot<B::Dim>,
    ) -> Result<(), NativeError>;
}

/// Native impulse-joint collection.
pub trait RawImpulseJointSet<B: Backend> {
    /// Insert a joint between two bodies.
    fn create_joint(
        &mut self,
        bodies: &mut B::Bodies,
        data: &JointData<B::Dim>,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        wake_up: bool,
    ) -> Result<ImpulseJointHandle, NativeError>;

    /// Remove a joint. Unknown handles are a no-op.
    fn remove(
        &mut self,
        handle: ImpulseJointHandle,
        bodies: &mut B::Bodies,
        wake_up: bool,
    ) -> Result<(), NativeError>;

    /// Number of live joints.
    fn len(&self) -> usize;

    /// Whether there are no live joints.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `handle` names a live joint.
    fn contains(&self, handle: ImpulseJointHandle) -> bool;

    /// Call `f` with every live handle.
    fn for_each_handle(&self, f: &mut dyn FnMut(ImpulseJointHandle));

    /// The two bodies a joint connects.
    fn attached_bodies(
        &self,
        handle: ImpulseJointHandle,
    ) -> Result<(RigidBodyHandle, RigidBodyHandle), NativeError>;
}

/// Native multibody-joint collection.
pub trait RawMultibodyJointSet<B: Backend> {
    /// Insert a joint between two bodies.
    fn create_joint(
        &mut self,
        bodies: &mut B::Bodies,
        data: &JointData<B::Dim>,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        wake_up: bool,
    ) -> Result<MultibodyJointHandle, NativeError>;

    /// Remove a joint. Unknown handles are a no-op.
    fn remove(
        &mut self,
        handle: MultibodyJointHandle,
        bodies: &mut B::Bodies,
        wake_up: bool,
    ) -> Result<(), NativeError>;

    /// Number of live joints.
    fn len(&self) -> usize;

    /// Whether there are no live joints.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `handle` names a live joint.
    fn contains(&self, handle: MultibodyJointHandle) -> bool;

    /// Call `f` with every live handle.
    fn for_each_handle(&self, f: &mut dyn FnMut(MultibodyJointHandle));

    /// The two bodies a joint connects.
    fn attached_bodies(
        &self,
        handle: MultibodyJointHandle,
    ) -> Result<(RigidBodyHandle, RigidBodyHandle), NativeError>;
}

/// Native activity tracking.
pub trait RawIslandManager {
    /// Call `f` with the handle of every awake, simulated body.
    fn for_each_active_rigid_body_handle(&self, f: &mut dyn FnMut(RigidBodyHandle));
}

/// Native event sink filled during a step.
pub trait RawEventQueue {
    /// Record an event.
    fn push(&mut self, event: CollisionEvent);

    /// Hand every pending event to `f`, oldest first, and forget them.
    fn drain_collision_events(&mut self, f: &mut dyn FnMut(CollisionEvent));

    /// Forget every pending event.
    fn clear(&mut self);
}

/// The native step.
pub trait RawPhysicsPipeline<B: Backend> {
    /// Advance the simulation by `params.dt` and repack transform buffers.
    #[allow(clippy::too_many_arguments)]
    fn step(
        &mut self,
        gravity: &Vect<B::Dim>,
        params: &IntegrationParameters,
        islands: &mut B::Islands,
        bodies: &mut B::Bodies,
        colliders: &mut B::Colliders,
        impulse_joints: &mut B::ImpulseJoints,
        multibody_joints: &mut B::MultibodyJoints,
        events: Option<&mut B::EventQueue>,
    ) -> Result<(), NativeError>;
}
