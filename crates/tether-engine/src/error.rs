//! Error types for the host layer.

use std::error::Error;
use std::fmt;

use tether_core::NativeError;

use crate::config::ConfigError;

/// Which native object an operation needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RawKind {
    /// A native rigid-body set.
    RigidBodySet,
    /// A native collider set.
    ColliderSet,
    /// A native impulse-joint set.
    ImpulseJointSet,
    /// A native multibody-joint set.
    MultibodyJointSet,
    /// A native island manager.
    IslandManager,
    /// A native physics pipeline.
    PhysicsPipeline,
    /// A native event queue.
    EventQueue,
}

impl fmt::Display for RawKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RigidBodySet => "rigid-body set",
            Self::ColliderSet => "collider set",
            Self::ImpulseJointSet => "impulse-joint set",
            Self::MultibodyJointSet => "multibody-joint set",
            Self::IslandManager => "island manager",
            Self::PhysicsPipeline => "physics pipeline",
            Self::EventQueue => "event queue",
        };
        f.write_str(name)
    }
}

/// Errors from host-layer operations.
#[derive(Clone, Debug, PartialEq)]
pub enum PhysicsError {
    /// The native module rejected the operation.
    Native(NativeError),
    /// The native object was released with `free`.
    Released {
        /// The released object.
        object: RawKind,
    },
    /// The native object is already borrowed by an operation in progress
    /// (re-entrant call from inside a callback).
    Busy {
        /// The borrowed object.
        object: RawKind,
    },
    /// World configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(e) => write!(f, "native error: {e}"),
            Self::Released { object } => write!(f, "{object} has been freed"),
            Self::Busy { object } => {
                write!(f, "{object} is in use by an operation in progress")
            }
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
        }
    }
}

impl Error for PhysicsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Native(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NativeError> for PhysicsError {
    fn from(e: NativeError) -> Self {
        Self::Native(e)
    }
}

impl From<ConfigError> for PhysicsError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_message_names_object() {
        let e = PhysicsError::Released {
            object: RawKind::ColliderSet,
        };
        assert_eq!(e.to_string(), "collider set has been freed");
        assert!(e.source().is_none());
    }

    #[test]
    fn native_errors_chain() {
        let e = PhysicsError::from(NativeError::Fatal {
            reason: "solver diverged".into(),
        });
        assert!(e.source().is_some());
        assert!(e.to_string().contains("solver diverged"));
    }
}
