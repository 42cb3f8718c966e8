//! Test utilities for Tether development.
//!
//! Provides [`RefBackend`], a small native physics module implementing
//! every trait of [`tether_core::raw`] on top of a simulated growable
//! linear memory ([`RefMemory`]). Its integrator is plain semi-implicit
//! Euler with no constraint solving; it exists so the host layer can be
//! exercised end to end, including memory growth and step failures.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod backend;
pub mod bodies;
pub mod colliders;
pub mod events;
pub mod islands;
pub mod joints;
pub mod kinematics;
pub mod memory;
pub mod pipeline;
pub mod slots;

pub use backend::{RefBackend, RefBackend2, RefBackend3};
pub use bodies::RefBodies;
pub use colliders::RefColliders;
pub use events::RefEventQueue;
pub use islands::RefIslands;
pub use joints::{RefImpulseJoints, RefJoints, RefMultibodyJoints};
pub use kinematics::Kinematics;
pub use memory::RefMemory;
pub use pipeline::RefPipeline;
pub use slots::SlotTable;

/// Standard downward gravity for 2D tests.
pub const GRAVITY_2D: tether_core::Vec2 = tether_core::Vec2::new(0.0, -9.81);

/// Standard downward gravity for 3D tests.
pub const GRAVITY_3D: tether_core::Vec3 = tether_core::Vec3::new(0.0, -9.81, 0.0);
