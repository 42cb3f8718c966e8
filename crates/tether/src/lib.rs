//! Tether: a host-side bridge to a native rigid-body physics module.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Tether sub-crates. For most users, adding `tether` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tether::prelude::*;
//! use tether_test_utils::RefBackend2;
//!
//! let backend = RefBackend2::new();
//! let mut world = World::new(&backend, Vec2::new(0.0, -9.81)).unwrap();
//!
//! let ball = world
//!     .create_rigid_body(&RigidBodyDesc::dynamic().translation(Vec2::new(0.0, 10.0)))
//!     .unwrap();
//! world
//!     .create_collider(&ColliderDesc::ball(0.5), Some(ball.handle()))
//!     .unwrap();
//!
//! world.step().unwrap();
//!
//! // Per-frame reads decode straight out of the packed transform buffer.
//! let mut position = Vec2::ZERO;
//! ball.translation_into(&mut position).unwrap();
//! assert!(position.y < 10.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tether-core` | Handles, math types, layouts, descriptors, native-boundary traits |
//! | [`arena`] | `tether-arena` | `Coarena`, handle-indexed sparse storage |
//! | [`engine`] | `tether-engine` | Entity sets, wrappers, buffer views, pipeline, world |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and the native boundary (`tether-core`).
///
/// Implement [`types::Backend`] and the `Raw*` traits in [`types::raw`] to
/// plug in a native physics module.
pub use tether_core as types;

/// Handle-indexed sparse storage (`tether-arena`).
pub use tether_arena as arena;

/// Entity sets, wrappers and step orchestration (`tether-engine`).
///
/// [`engine::World`] owns a full simulation; the individual sets and
/// [`engine::PhysicsPipeline`] can be used directly for finer control.
pub use tether_engine as engine;

/// Common imports for typical Tether usage.
///
/// ```rust
/// use tether::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use tether_core::{
        Backend, ColliderDesc, ColliderHandle, CollisionEvent, Dim2, Dim3, ImpulseJointHandle,
        IntegrationParameters, JointData, MultibodyJointHandle, Quat, RigidBodyDesc,
        RigidBodyHandle, RigidBodyType, Shape, Vec2, Vec3,
    };

    // Errors
    pub use tether_core::NativeError;
    pub use tether_engine::{ConfigError, PhysicsError};

    // Engine
    pub use tether_engine::{
        Collider, ColliderSet, EventQueue, ImpulseJointSet, IslandManager, MultibodyJointSet,
        PhysicsPipeline, RigidBody, RigidBodySet, World, WorldConfig,
    };
}
