//! The handful of vector and rotation operations the reference module
//! needs, per dimension, on top of `glam`.

use tether_core::{AngVect, Dim, Dim2, Dim3, Quat, Rot, Vec2, Vec3, Vect};

/// Dimension-specific math for the reference integrator.
pub trait Kinematics: Dim {
    /// `y + a * x`.
    fn axpy(y: Vect<Self>, a: f32, x: Vect<Self>) -> Vect<Self>;

    /// Euclidean length.
    fn length(v: Vect<Self>) -> f32;

    /// Scale an angular velocity.
    fn scale_ang(w: AngVect<Self>, s: f32) -> AngVect<Self>;

    /// Rotate `v` by `r`.
    fn rotate(r: Rot<Self>, v: Vect<Self>) -> Vect<Self>;

    /// Rotate `v` by the inverse of `r`.
    fn inverse_rotate(r: Rot<Self>, v: Vect<Self>) -> Vect<Self>;

    /// Apply `local` in the frame of `parent`.
    fn compose(parent: Rot<Self>, local: Rot<Self>) -> Rot<Self>;

    /// The rotation `local` with `compose(parent, local) == world`.
    fn relative(parent: Rot<Self>, world: Rot<Self>) -> Rot<Self>;

    /// Advance `r` by angular velocity `w` over `dt`.
    fn integrate_rotation(r: Rot<Self>, w: AngVect<Self>, dt: f32) -> Rot<Self>;

    /// Distance between two points.
    fn distance(a: Vect<Self>, b: Vect<Self>) -> f32;
}

impl Kinematics for Dim2 {
    fn axpy(y: Vec2, a: f32, x: Vec2) -> Vec2 {
        y + x * a
    }

    fn length(v: Vec2) -> f32 {
        v.length()
    }

    fn scale_ang(w: f32, s: f32) -> f32 {
        w * s
    }

    fn rotate(r: f32, v: Vec2) -> Vec2 {
        Vec2::from_angle(r).rotate(v)
    }

    fn inverse_rotate(r: f32, v: Vec2) -> Vec2 {
        Vec2::from_angle(-r).rotate(v)
    }

    fn compose(parent: f32, local: f32) -> f32 {
        parent + local
    }

    fn relative(parent: f32, world: f32) -> f32 {
        world - parent
    }

    fn integrate_rotation(r: f32, w: f32, dt: f32) -> f32 {
        r + w * dt
    }

    fn distance(a: Vec2, b: Vec2) -> f32 {
        a.distance(b)
    }
}

impl Kinematics for Dim3 {
    fn axpy(y: Vec3, a: f32, x: Vec3) -> Vec3 {
        y + x * a
    }

    fn length(v: Vec3) -> f32 {
        v.length()
    }

    fn scale_ang(w: Vec3, s: f32) -> Vec3 {
        w * s
    }

    fn rotate(r: Quat, v: Vec3) -> Vec3 {
        r.mul_vec3(v)
    }

    fn inverse_rotate(r: Quat, v: Vec3) -> Vec3 {
        r.conjugate().mul_vec3(v)
    }

    fn compose(parent: Quat, local: Quat) -> Quat {
        parent * local
    }

    fn relative(parent: Quat, world: Quat) -> Quat {
        parent.conjugate() * world
    }

    fn integrate_rotation(r: Quat, w: Vec3, dt: f32) -> Quat {
        (Quat::from_scaled_axis(w * dt) * r).normalize()
    }

    fn distance(a: Vec3, b: Vec3) -> f32 {
        a.distance(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn quarter_turn_about_z() {
        let q = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let v = Dim3::rotate(q, Vec3::X);
        assert!(v.abs_diff_eq(Vec3::Y, 1e-5), "{v:?}");
        let back = Dim3::inverse_rotate(q, v);
        assert!(back.abs_diff_eq(Vec3::X, 1e-5), "{back:?}");
    }

    #[test]
    fn relative_inverts_compose() {
        let parent = Quat::from_xyzw(0.1, 0.2, 0.3, 0.9).normalize();
        let local = Quat::from_xyzw(-0.4, 0.0, 0.2, 0.8).normalize();
        let world = Dim3::compose(parent, local);
        let r = Dim3::relative(parent, world);
        assert!(r.abs_diff_eq(local, 1e-5), "{r:?}");
    }

    #[test]
    fn planar_rotation() {
        let v = Dim2::rotate(std::f32::consts::FRAC_PI_2, Vec2::X);
        assert!(v.abs_diff_eq(Vec2::Y, 1e-5), "{v:?}");
        let back = Dim2::inverse_rotate(std::f32::consts::FRAC_PI_2, v);
        assert!(back.abs_diff_eq(Vec2::X, 1e-5), "{back:?}");
        assert!(close(Dim2::distance(Vec2::new(3.0, 4.0), Vec2::ZERO), 5.0));
    }

    #[test]
    fn integration_stays_unit() {
        let mut q = Quat::IDENTITY;
        for _ in 0..100 {
            q = Dim3::integrate_rotation(q, Vec3::new(0.0, 3.0, 0.0), 1.0 / 60.0);
        }
        assert!(q.is_normalized());
        assert!(q.y.abs() > 0.1);
    }

    #[test]
    fn integration_matches_axis_angle() {
        let q = Dim3::integrate_rotation(Quat::IDENTITY, Vec3::new(0.0, 0.0, 2.0), 0.25);
        assert!(q.abs_diff_eq(Quat::from_rotation_z(0.5), 1e-5), "{q:?}");
    }
}
