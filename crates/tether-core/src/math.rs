//! Math value types exchanged with the native module.
//!
//! Vectors and rotations are [`glam`] types. The host layer only moves
//! their components in and out of flat `f32` buffers through the
//! [`Packed`] trait; arithmetic on them is plain `glam`.

use std::fmt;

pub use glam::{Quat, Vec2, Vec3};

/// A value with a fixed number of `f32` components in a packed buffer.
pub trait Packed: Copy + Default + PartialEq + fmt::Debug {
    /// Number of `f32` components.
    const LEN: usize;

    /// Overwrite `self` from `src[..LEN]`.
    ///
    /// `src` must hold at least `LEN` elements.
    fn unpack(&mut self, src: &[f32]);

    /// Write `self` into `dst[..LEN]`.
    fn pack(&self, dst: &mut [f32]);

    /// Whether every component is finite.
    fn all_finite(&self) -> bool;
}

impl Packed for f32 {
    const LEN: usize = 1;

    fn unpack(&mut self, src: &[f32]) {
        *self = src[0];
    }

    fn pack(&self, dst: &mut [f32]) {
        dst[0] = *self;
    }

    fn all_finite(&self) -> bool {
        f32::is_finite(*self)
    }
}

impl Packed for Vec2 {
    const LEN: usize = 2;

    fn unpack(&mut self, src: &[f32]) {
        *self = Vec2::from_slice(&src[..Self::LEN]);
    }

    fn pack(&self, dst: &mut [f32]) {
        self.write_to_slice(&mut dst[..Self::LEN]);
    }

    fn all_finite(&self) -> bool {
        Vec2::is_finite(*self)
    }
}

impl Packed for Vec3 {
    const LEN: usize = 3;

    fn unpack(&mut self, src: &[f32]) {
        *self = Vec3::from_slice(&src[..Self::LEN]);
    }

    fn pack(&self, dst: &mut [f32]) {
        self.write_to_slice(&mut dst[..Self::LEN]);
    }

    fn all_finite(&self) -> bool {
        Vec3::is_finite(*self)
    }
}

/// Stored `x, y, z, w`. No normalisation is applied on unpack.
impl Packed for Quat {
    const LEN: usize = 4;

    fn unpack(&mut self, src: &[f32]) {
        *self = Quat::from_slice(&src[..Self::LEN]);
    }

    fn pack(&self, dst: &mut [f32]) {
        self.write_to_slice(&mut dst[..Self::LEN]);
    }

    fn all_finite(&self) -> bool {
        Quat::is_finite(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quat_default_is_identity() {
        assert_eq!(Quat::default(), Quat::from_xyzw(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn unpack_reads_leading_components_only() {
        let src = [1.0, 2.0, 3.0, 4.0, 5.0];
        let mut v = Vec3::ZERO;
        v.unpack(&src);
        assert_eq!(v, Vec3::new(1.0, 2.0, 3.0));

        let mut q = Quat::IDENTITY;
        q.unpack(&src[1..]);
        assert_eq!(q, Quat::from_xyzw(2.0, 3.0, 4.0, 5.0));
    }

    #[test]
    fn pack_leaves_tail_untouched() {
        let mut dst = [9.0f32; 3];
        Vec2::new(1.0, 2.0).pack(&mut dst);
        assert_eq!(dst, [1.0, 2.0, 9.0]);
    }

    #[test]
    fn finiteness_check() {
        assert!(Vec2::new(0.0, -9.81).all_finite());
        assert!(!Vec3::new(0.0, f32::NAN, 0.0).all_finite());
        assert!(0.5f32.all_finite());
        assert!(!f32::INFINITY.all_finite());
        assert!(!(&f32::NEG_INFINITY).all_finite());
        assert!(Quat::IDENTITY.all_finite());
        assert!(!Quat::from_xyzw(0.0, 0.0, f32::NAN, 1.0).all_finite());
    }
}
