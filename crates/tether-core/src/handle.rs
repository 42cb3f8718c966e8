//! Generational handles and the handle codec.
//!
//! A [`Handle`] names one entity inside a native collection. The `index`
//! addresses a dense slot; the `generation` distinguishes successive
//! occupants of the same slot. Across the native boundary a handle travels
//! as a single 64-bit word (index in the low half, generation in the high
//! half), optionally carried as the bit pattern of an `f64`.

use std::fmt;

/// Opaque entity reference: dense slot index plus reuse generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// A handle that no native module hands out.
    pub const INVALID: Handle = Handle::new(u32::MAX, u32::MAX);

    /// Build a handle from its two halves.
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Dense slot index.
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Reuse generation of the slot.
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Flat 64-bit encoding: low 32 bits = index, high 32 bits = generation.
    pub const fn to_bits(self) -> u64 {
        (self.index as u64) | ((self.generation as u64) << 32)
    }

    /// Inverse of [`to_bits`](Self::to_bits).
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }

    /// The flat encoding reinterpreted as an `f64`.
    ///
    /// The resulting float may be a NaN or subnormal; only its bit pattern
    /// is meaningful.
    pub fn to_flat(self) -> f64 {
        f64::from_bits(self.to_bits())
    }

    /// Decode a handle from its `f64` carrier.
    pub fn from_flat(flat: f64) -> Self {
        Self::from_bits(flat.to_bits())
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Dense array index of a handle.
pub fn decode_index(handle: Handle) -> usize {
    handle.index() as usize
}

/// Dense array index of a handle carried as an `f64`.
///
/// Any bit pattern is accepted.
pub fn decode_flat_index(flat: f64) -> usize {
    (flat.to_bits() as u32) as usize
}

/// A key that can address a slot of a handle-indexed arena.
///
/// Implemented by [`Handle`] and by every typed entity handle.
pub trait ArenaKey: Copy + Eq + fmt::Debug {
    /// Wrap an untyped handle.
    fn from_handle(handle: Handle) -> Self;

    /// The untyped handle.
    fn handle(self) -> Handle;

    /// Dense slot index.
    fn index(self) -> usize {
        decode_index(self.handle())
    }
}

impl ArenaKey for Handle {
    fn from_handle(handle: Handle) -> Self {
        handle
    }

    fn handle(self) -> Handle {
        self
    }
}

macro_rules! typed_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub Handle);

        impl $name {
            /// Dense slot index.
            pub const fn index(self) -> u32 {
                self.0.index()
            }

            /// Reuse generation of the slot.
            pub const fn generation(self) -> u32 {
                self.0.generation()
            }
        }

        impl ArenaKey for $name {
            fn from_handle(handle: Handle) -> Self {
                Self(handle)
            }

            fn handle(self) -> Handle {
                self.0
            }
        }

        impl From<Handle> for $name {
            fn from(h: Handle) -> Self {
                Self(h)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

typed_handle!(
    /// Handle of a rigid body inside a native rigid-body set.
    RigidBodyHandle
);
typed_handle!(
    /// Handle of a collider inside a native collider set.
    ColliderHandle
);
typed_handle!(
    /// Handle of an impulse joint.
    ImpulseJointHandle
);
typed_handle!(
    /// Handle of a multibody joint.
    MultibodyJointHandle
);
