//! Entity descriptors handed to the native module at creation time.
//!
//! Descriptors are plain data with builder-style setters. The host
//! forwards them field by field; it never interprets shapes, masses or
//! joint frames itself.

use crate::dim::{AngVect, Dim, Rot, Vect};
use crate::handle::ColliderHandle;

/// How the solver treats a rigid body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RigidBodyType {
    /// Affected by forces, gravity and contacts.
    Dynamic,
    /// Never moves.
    Fixed,
    /// Moved by setting a target position each step.
    KinematicPositionBased,
    /// Moved by its velocity only; ignores forces.
    KinematicVelocityBased,
}

impl RigidBodyType {
    /// Whether this is one of the two kinematic variants.
    pub fn is_kinematic(self) -> bool {
        matches!(
            self,
            Self::KinematicPositionBased | Self::KinematicVelocityBased
        )
    }
}

/// Description of a rigid body to create.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidBodyDesc<D: Dim> {
    /// Solver treatment.
    pub body_type: RigidBodyType,
    /// Initial position.
    pub translation: Vect<D>,
    /// Initial orientation.
    pub rotation: Rot<D>,
    /// Initial linear velocity.
    pub linvel: Vect<D>,
    /// Initial angular velocity.
    pub angvel: AngVect<D>,
    /// Multiplier applied to world gravity.
    pub gravity_scale: f32,
    /// Additional mass on top of attached colliders' mass.
    pub mass: f32,
    /// Linear velocity damping coefficient.
    pub linear_damping: f32,
    /// Angular velocity damping coefficient.
    pub angular_damping: f32,
    /// Whether the solver may put the body to sleep.
    pub can_sleep: bool,
    /// Whether the body starts asleep.
    pub sleeping: bool,
    /// Continuous collision detection.
    pub ccd_enabled: bool,
    /// Disabled bodies are ignored by the solver.
    pub enabled: bool,
    /// Dominance group, in `-127..=127`.
    pub dominance_group: i8,
    /// Opaque value carried by the host wrapper.
    pub user_data: u128,
}

impl<D: Dim> RigidBodyDesc<D> {
    /// A descriptor for the given body type with neutral defaults.
    pub fn new(body_type: RigidBodyType) -> Self {
        Self {
            body_type,
            translation: Default::default(),
            rotation: Default::default(),
            linvel: Default::default(),
            angvel: Default::default(),
            gravity_scale: 1.0,
            mass: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            can_sleep: true,
            sleeping: false,
            ccd_enabled: false,
            enabled: true,
            dominance_group: 0,
            user_data: 0,
        }
    }

    /// A dynamic body.
    pub fn dynamic() -> Self {
        Self::new(RigidBodyType::Dynamic)
    }

    /// A fixed body.
    pub fn fixed() -> Self {
        Self::new(RigidBodyType::Fixed)
    }

    /// A position-driven kinematic body.
    pub fn kinematic_position_based() -> Self {
        Self::new(RigidBodyType::KinematicPositionBased)
    }

    /// A velocity-driven kinematic body.
    pub fn kinematic_velocity_based() -> Self {
        Self::new(RigidBodyType::KinematicVelocityBased)
    }

    /// Set the initial position.
    pub fn translation(mut self, translation: Vect<D>) -> Self {
        self.translation = translation;
        self
    }

    /// Set the initial orientation.
    pub fn rotation(mut self, rotation: Rot<D>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the initial linear velocity.
    pub fn linvel(mut self, linvel: Vect<D>) -> Self {
        self.linvel = linvel;
        self
    }

    /// Set the initial angular velocity.
    pub fn angvel(mut self, angvel: AngVect<D>) -> Self {
        self.angvel = angvel;
        self
    }

    /// Set the gravity multiplier.
    pub fn gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Set the additional mass.
    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Set linear and angular damping.
    pub fn damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    /// Allow or forbid sleeping.
    pub fn can_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }

    /// Start asleep.
    pub fn sleeping(mut self, sleeping: bool) -> Self {
        self.sleeping = sleeping;
        self
    }

    /// Enable continuous collision detection.
    pub fn ccd_enabled(mut self, enabled: bool) -> Self {
        self.ccd_enabled = enabled;
        self
    }

    /// Enable or disable the body.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the dominance group.
    pub fn dominance_group(mut self, group: i8) -> Self {
        self.dominance_group = group;
        self
    }

    /// Attach an opaque value to the host wrapper.
    pub fn user_data(mut self, data: u128) -> Self {
        self.user_data = data;
        self
    }
}

/// Collision geometry, forwarded verbatim to the native module.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape<D: Dim> {
    /// A disc (2D) or sphere (3D).
    Ball {
        /// Radius.
        radius: f32,
    },
    /// A box given by its half extents.
    Cuboid {
        /// Half extents along each axis.
        half_extents: Vect<D>,
    },
}

/// Description of a collider to create.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColliderDesc<D: Dim> {
    /// Geometry.
    pub shape: Shape<D>,
    /// Position relative to the parent body (or the world, if parentless).
    pub translation: Vect<D>,
    /// Orientation relative to the parent body (or the world).
    pub rotation: Rot<D>,
    /// Mass density.
    pub density: f32,
    /// Friction coefficient.
    pub friction: f32,
    /// Restitution coefficient.
    pub restitution: f32,
    /// Sensors report intersections but generate no contact forces.
    pub sensor: bool,
    /// Whether the collider emits collision events.
    pub collision_events: bool,
    /// Disabled colliders are ignored by the solver.
    pub enabled: bool,
    /// Opaque value carried by the host wrapper.
    pub user_data: u128,
}

impl<D: Dim> ColliderDesc<D> {
    /// A collider with the given shape and neutral defaults.
    pub fn new(shape: Shape<D>) -> Self {
        Self {
            shape,
            translation: Default::default(),
            rotation: Default::default(),
            density: 1.0,
            friction: 0.5,
            restitution: 0.0,
            sensor: false,
            collision_events: false,
            enabled: true,
            user_data: 0,
        }
    }

    /// A ball collider.
    pub fn ball(radius: f32) -> Self {
        Self::new(Shape::Ball { radius })
    }

    /// A cuboid collider.
    pub fn cuboid(half_extents: Vect<D>) -> Self {
        Self::new(Shape::Cuboid { half_extents })
    }

    /// Set the relative position.
    pub fn translation(mut self, translation: Vect<D>) -> Self {
        self.translation = translation;
        self
    }

    /// Set the relative orientation.
    pub fn rotation(mut self, rotation: Rot<D>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the density.
    pub fn density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    /// Set the friction coefficient.
    pub fn friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Set the restitution coefficient.
    pub fn restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Make the collider a sensor.
    pub fn sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }

    /// Enable collision events for this collider.
    pub fn collision_events(mut self, enabled: bool) -> Self {
        self.collision_events = enabled;
        self
    }

    /// Enable or disable the collider.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Attach an opaque value to the host wrapper.
    pub fn user_data(mut self, data: u128) -> Self {
        self.user_data = data;
        self
    }
}

/// Joint family. The host only plumbs handles; frames and limits are the
/// native module's business.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JointKind {
    /// No relative motion.
    Fixed,
    /// Rotation about one axis.
    Revolute,
    /// Translation along one axis.
    Prismatic,
    /// Free rotation about a point.
    Spherical,
}

/// Description of a joint between two bodies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointData<D: Dim> {
    /// Joint family.
    pub kind: JointKind,
    /// Anchor in the first body's local frame.
    pub anchor1: Vect<D>,
    /// Anchor in the second body's local frame.
    pub anchor2: Vect<D>,
}

impl<D: Dim> JointData<D> {
    /// Joint of the given kind with both anchors.
    pub fn new(kind: JointKind, anchor1: Vect<D>, anchor2: Vect<D>) -> Self {
        Self {
            kind,
            anchor1,
            anchor2,
        }
    }

    /// A fixed joint.
    pub fn fixed(anchor1: Vect<D>, anchor2: Vect<D>) -> Self {
        Self::new(JointKind::Fixed, anchor1, anchor2)
    }

    /// A revolute joint.
    pub fn revolute(anchor1: Vect<D>, anchor2: Vect<D>) -> Self {
        Self::new(JointKind::Revolute, anchor1, anchor2)
    }
}

/// A collision start/stop notification drained from an event queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CollisionEvent {
    /// First collider of the pair.
    pub collider1: ColliderHandle,
    /// Second collider of the pair.
    pub collider2: ColliderHandle,
    /// `true` when contact began this step, `false` when it ended.
    pub started: bool,
}

impl CollisionEvent {
    /// Whether `collider` is one of the pair.
    pub fn involves(&self, collider: ColliderHandle) -> bool {
        self.collider1 == collider || self.collider2 == collider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dim::{Dim2, Dim3};
    use crate::math::{Quat, Vec2, Vec3};

    #[test]
    fn dynamic_defaults() {
        let d = RigidBodyDesc::<Dim3>::dynamic();
        assert_eq!(d.body_type, RigidBodyType::Dynamic);
        assert_eq!(d.rotation, Quat::IDENTITY);
        assert_eq!(d.gravity_scale, 1.0);
        assert!(d.enabled);
    }

    #[test]
    fn builder_chain_sets_fields() {
        let d = RigidBodyDesc::<Dim2>::kinematic_position_based()
            .translation(Vec2::new(0.0, 5.0))
            .rotation(0.25)
            .user_data(42);
        assert!(d.body_type.is_kinematic());
        assert_eq!(d.translation, Vec2::new(0.0, 5.0));
        assert_eq!(d.rotation, 0.25);
        assert_eq!(d.user_data, 42);
    }

    #[test]
    fn collider_builders() {
        let c = ColliderDesc::<Dim3>::cuboid(Vec3::new(10.0, 0.1, 10.0)).collision_events(true);
        assert!(c.collision_events);
        assert!(matches!(c.shape, Shape::Cuboid { .. }));
    }

    #[test]
    fn event_involves_either_side() {
        let a = ColliderHandle(crate::Handle::new(0, 0));
        let b = ColliderHandle(crate::Handle::new(1, 0));
        let e = CollisionEvent {
            collider1: a,
            collider2: b,
            started: true,
        };
        assert!(e.involves(a) && e.involves(b));
        assert!(!e.involves(ColliderHandle(crate::Handle::new(2, 0))));
    }
}
