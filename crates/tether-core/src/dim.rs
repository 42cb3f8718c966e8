//! Dimensionality and the packed per-entity state layout.
//!
//! The native module packs one fixed-stride record per entity into its
//! transform buffer:
//!
//! ```text
//! 2D (stride 6):  [tx ty | angle | vx vy | w]
//! 3D (stride 13): [tx ty tz | qx qy qz qw | vx vy vz | wx wy wz]
//! ```
//!
//! The record for handle `h` starts at `decode_index(h) * STRIDE`.
//! Choosing [`Dim2`] or [`Dim3`] fixes both the value types and the
//! layout at compile time, so a 3D rotation can never be decoded from a
//! 2D buffer.

use std::fmt;

use crate::math::{Packed, Quat, Vec2, Vec3};

/// One of the four packed state fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateField {
    /// Position of the entity's origin.
    Translation,
    /// Orientation.
    Rotation,
    /// Linear velocity.
    Linvel,
    /// Angular velocity.
    Angvel,
}

/// Field offsets and stride of one packed entity record, in `f32` elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateLayout {
    /// Elements per entity record.
    pub stride: usize,
    /// Offset of the translation within a record.
    pub translation: usize,
    /// Offset of the rotation within a record.
    pub rotation: usize,
    /// Offset of the linear velocity within a record.
    pub linvel: usize,
    /// Offset of the angular velocity within a record.
    pub angvel: usize,
}

impl StateLayout {
    /// Offset of `field` within a record.
    pub const fn field_offset(&self, field: StateField) -> usize {
        match field {
            StateField::Translation => self.translation,
            StateField::Rotation => self.rotation,
            StateField::Linvel => self.linvel,
            StateField::Angvel => self.angvel,
        }
    }

    /// Offset of `field` for the entity at `index`, from the buffer start.
    pub const fn offset_of(&self, index: usize, field: StateField) -> usize {
        index * self.stride + self.field_offset(field)
    }

    /// Buffer length needed to hold records `0..=max_index`.
    pub const fn required_len(&self, max_index: usize) -> usize {
        (max_index + 1) * self.stride
    }
}

/// Compile-time choice of simulation dimensionality.
pub trait Dim: Copy + Default + PartialEq + fmt::Debug + 'static {
    /// Translation and linear velocity type.
    type Vector: Packed;
    /// Orientation type.
    type Rotation: Packed;
    /// Angular velocity type.
    type AngVector: Packed;

    /// Number of spatial axes.
    const AXES: usize;

    /// Packed record layout.
    const LAYOUT: StateLayout;

    /// Write a full entity record into `record[..LAYOUT.stride]`.
    fn pack_state(state: &BodyState<Self>, record: &mut [f32]) {
        let l = Self::LAYOUT;
        state.translation.pack(&mut record[l.translation..]);
        state.rotation.pack(&mut record[l.rotation..]);
        state.linvel.pack(&mut record[l.linvel..]);
        state.angvel.pack(&mut record[l.angvel..]);
    }

    /// Read a full entity record from `record[..LAYOUT.stride]`.
    fn unpack_state(record: &[f32]) -> BodyState<Self> {
        let l = Self::LAYOUT;
        let mut state = BodyState::<Self>::default();
        state.translation.unpack(&record[l.translation..]);
        state.rotation.unpack(&record[l.rotation..]);
        state.linvel.unpack(&record[l.linvel..]);
        state.angvel.unpack(&record[l.angvel..]);
        state
    }
}

/// Translation / linear velocity type of `D`.
pub type Vect<D> = <D as Dim>::Vector;
/// Rotation type of `D`.
pub type Rot<D> = <D as Dim>::Rotation;
/// Angular velocity type of `D`.
pub type AngVect<D> = <D as Dim>::AngVector;

/// Two-dimensional simulation: rotations are angles in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dim2;

impl Dim for Dim2 {
    type Vector = Vec2;
    type Rotation = f32;
    type AngVector = f32;

    const AXES: usize = 2;

    const LAYOUT: StateLayout = StateLayout {
        stride: 6,
        translation: 0,
        rotation: 2,
        linvel: 3,
        angvel: 5,
    };
}

/// Three-dimensional simulation: rotations are unit quaternions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dim3;

impl Dim for Dim3 {
    type Vector = Vec3;
    type Rotation = Quat;
    type AngVector = Vec3;

    const AXES: usize = 3;

    const LAYOUT: StateLayout = StateLayout {
        stride: 13,
        translation: 0,
        rotation: 3,
        linvel: 7,
        angvel: 10,
    };
}

/// The full kinematic state of one entity, as packed in a record.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BodyState<D: Dim> {
    /// Position.
    pub translation: D::Vector,
    /// Orientation.
    pub rotation: D::Rotation,
    /// Linear velocity.
    pub linvel: D::Vector,
    /// Angular velocity.
    pub angvel: D::AngVector,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_layout_is_dense<D: Dim>() {
        let l = D::LAYOUT;
        let v = <D::Vector as Packed>::LEN;
        let r = <D::Rotation as Packed>::LEN;
        let a = <D::AngVector as Packed>::LEN;
        assert_eq!(l.translation, 0);
        assert_eq!(l.rotation, v);
        assert_eq!(l.linvel, v + r);
        assert_eq!(l.angvel, 2 * v + r);
        assert_eq!(l.stride, 2 * v + r + a);
    }

    #[test]
    fn layouts_are_dense() {
        assert_layout_is_dense::<Dim2>();
        assert_layout_is_dense::<Dim3>();
    }

    #[test]
    fn strides_match_documented_values() {
        assert_eq!(Dim2::LAYOUT.stride, 6);
        assert_eq!(Dim3::LAYOUT.stride, 13);
    }

    #[test]
    fn offset_of_uses_stride() {
        let l = Dim3::LAYOUT;
        assert_eq!(l.offset_of(0, StateField::Rotation), 3);
        assert_eq!(l.offset_of(2, StateField::Angvel), 2 * 13 + 10);
        assert_eq!(Dim2::LAYOUT.offset_of(3, StateField::Linvel), 3 * 6 + 3);
    }

    #[test]
    fn required_len_covers_max_index() {
        assert_eq!(Dim2::LAYOUT.required_len(0), 6);
        assert_eq!(Dim3::LAYOUT.required_len(4), 65);
    }

    #[test]
    fn state_record_round_trip_3d() {
        let state = BodyState::<Dim3> {
            translation: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_xyzw(0.0, 0.7071068, 0.0, 0.7071068),
            linvel: Vec3::new(-1.0, 0.0, 0.5),
            angvel: Vec3::new(0.0, 2.0, 0.0),
        };
        let mut record = [0.0f32; 13];
        Dim3::pack_state(&state, &mut record);
        assert_eq!(record[6], 0.7071068);
        assert_eq!(record[11], 2.0);
        assert_eq!(Dim3::unpack_state(&record), state);
    }

    #[test]
    fn state_record_2d_positions() {
        let state = BodyState::<Dim2> {
            translation: Vec2::new(3.0, 7.0),
            rotation: 0.5,
            linvel: Vec2::new(0.0, -1.0),
            angvel: 2.0,
        };
        let mut record = [0.0f32; 6];
        Dim2::pack_state(&state, &mut record);
        assert_eq!(record, [3.0, 7.0, 0.5, 0.0, -1.0, 2.0]);
    }
}
