//! Core types and traits for the Tether physics bridge.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by the host layer and any native physics module:
//! handles, math value types, per-dimension state layouts, entity
//! descriptors, and the traits that make up the native boundary.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod desc;
pub mod dim;
pub mod error;
pub mod handle;
pub mod math;
pub mod params;
pub mod raw;

pub use desc::{
    ColliderDesc, CollisionEvent, JointData, JointKind, RigidBodyDesc, RigidBodyType, Shape,
};
pub use dim::{AngVect, BodyState, Dim, Dim2, Dim3, Rot, StateField, StateLayout, Vect};
pub use error::{EntityKind, NativeError};
pub use handle::{
    decode_flat_index, decode_index, ArenaKey, ColliderHandle, Handle, ImpulseJointHandle,
    MultibodyJointHandle, RigidBodyHandle,
};
pub use math::{Packed, Quat, Vec2, Vec3};
pub use params::IntegrationParameters;
pub use raw::{
    Backend, LinearMemory, MemoryEpoch, RawBufferView, RawColliderSet, RawEventQueue,
    RawImpulseJointSet, RawIslandManager, RawMultibodyJointSet, RawPhysicsPipeline,
    RawRigidBodySet, RawStateSource,
};
