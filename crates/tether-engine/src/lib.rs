//! Host-side entity sets and step orchestration for Tether.
//!
//! The native physics module owns all simulation state. This crate keeps
//! the host's mirror of it: one wrapper per native entity, indexed by
//! handle, and a view over each collection's packed transform buffer so
//! that per-frame reads decode a few words out of linear memory instead
//! of crossing the boundary once per field.
//!
//! ```text
//!             ┌──────────────── host ─────────────────┐
//!  RigidBody ─┤ Rc<SetCore> ── StateBufferView ──┐     │
//!  (wrapper)  │      │                           │read │
//!             │      │ fallback                  ▼     │
//!             └──────┼───────────────── LinearMemory ──┘
//!                    ▼                     ▲ packed after step
//!              native accessor        native step
//! ```
//!
//! Reads prefer the buffer and fall back to the native accessor whenever
//! the buffer cannot vouch for an entity: it was created, written or
//! removed since the last step, the memory moved, or its record lies
//! past the packed length. Both paths yield the same values.
//!
//! The sets are single-threaded (`Rc`/`RefCell`); a re-entrant call that
//! would alias a native borrow returns [`PhysicsError::Busy`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod buffer;
pub mod collider;
pub mod collider_set;
pub mod config;
pub mod error;
pub mod event;
pub mod island;
pub mod joint;
pub mod pipeline;
pub mod rigid_body;
pub mod rigid_body_set;
pub(crate) mod shared;
pub mod world;

pub use buffer::StateBufferView;
pub use collider::Collider;
pub use collider_set::ColliderSet;
pub use config::{ConfigError, WorldConfig};
pub use error::{PhysicsError, RawKind};
pub use event::EventQueue;
pub use island::IslandManager;
pub use joint::{ImpulseJointSet, JointLink, MultibodyJointSet};
pub use pipeline::PhysicsPipeline;
pub use rigid_body::RigidBody;
pub use rigid_body_set::RigidBodySet;
pub use world::World;
