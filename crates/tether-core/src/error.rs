//! Errors reported by a native physics module.
//!
//! The host layer performs no independent validation: the native module
//! is the authority on handle liveness and solver health. Whatever it
//! rejects surfaces here unchanged.

use std::error::Error;
use std::fmt;

use crate::handle::Handle;

/// The kind of native entity a handle refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A rigid body.
    RigidBody,
    /// A collider.
    Collider,
    /// An impulse joint.
    ImpulseJoint,
    /// A multibody joint.
    MultibodyJoint,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RigidBody => "rigid body",
            Self::Collider => "collider",
            Self::ImpulseJoint => "impulse joint",
            Self::MultibodyJoint => "multibody joint",
        };
        f.write_str(name)
    }
}

/// Failures reported by the native module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NativeError {
    /// The handle does not name a live entity (removed, never created, or
    /// from a previous occupant of the slot).
    InvalidHandle {
        /// What the handle was supposed to name.
        kind: EntityKind,
        /// The rejected handle.
        handle: Handle,
    },
    /// A positional query asked for an element past the end.
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Number of elements available.
        len: usize,
    },
    /// The native module hit an internal invariant violation.
    Fatal {
        /// Description supplied by the native module.
        reason: String,
    },
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHandle { kind, handle } => {
                write!(
                    f,
                    "invalid {kind} handle {handle}: it may have been removed from the world"
                )
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range (len {len})")
            }
            Self::Fatal { reason } => write!(f, "native module failure: {reason}"),
        }
    }
}

impl Error for NativeError {}
