//! Integration test: entity and world lifecycle.
//!
//! Removal cascades, stale handles, `free`, and native step failures.
//! None of these may panic; each must surface as a value the caller can
//! inspect.

use tether_core::{
    ColliderDesc, EntityKind, JointData, NativeError, RigidBodyDesc, Vec2,
};
use tether_engine::{PhysicsError, RawKind, World};
use tether_test_utils::{RefBackend2, GRAVITY_2D};

#[test]
fn removing_a_body_unmaps_its_colliders_and_joints() {
    let backend = RefBackend2::new();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let a = world.create_rigid_body(&RigidBodyDesc::dynamic()).unwrap();
    let b = world.create_rigid_body(&RigidBodyDesc::dynamic()).unwrap();
    let on_a = world
        .create_collider(&ColliderDesc::ball(0.5), Some(a.handle()))
        .unwrap();
    let on_b = world
        .create_collider(&ColliderDesc::ball(0.5), Some(b.handle()))
        .unwrap();
    let loose = world.create_collider(&ColliderDesc::ball(0.5), None).unwrap();
    let joint = world
        .create_impulse_joint(
            &JointData::fixed(Vec2::ZERO, Vec2::ZERO),
            a.handle(),
            b.handle(),
            true,
        )
        .unwrap();
    let mb = world
        .create_multibody_joint(
            &JointData::revolute(Vec2::ZERO, Vec2::ZERO),
            a.handle(),
            b.handle(),
            true,
        )
        .unwrap();
    world.step().unwrap();

    let removed = world.remove_rigid_body(a.handle()).unwrap();
    assert_eq!(removed.map(|r| r.handle()), Some(a.handle()));

    assert!(world.get_rigid_body(a.handle()).is_none());
    assert!(world.get_collider(on_a.handle()).is_none());
    assert!(world.get_collider(on_b.handle()).is_some());
    assert!(world.get_collider(loose.handle()).is_some());
    assert!(!world.impulse_joints().contains(joint.handle));
    assert!(!world.multibody_joints().contains(mb.handle));
    assert!(world.impulse_joints().is_empty());
    assert_eq!(world.bodies().len(), 1);
    assert_eq!(world.colliders().len(), 2);

    assert!(!a.is_valid().unwrap());
    assert!(!on_a.is_valid().unwrap());
    assert!(b.is_valid().unwrap());

    // The surviving entities keep simulating.
    world.step().unwrap();
    assert!(b.translation().unwrap().y < 0.0);
}

#[test]
fn removing_an_unknown_body_is_a_no_op() {
    let backend = RefBackend2::new();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let body = world.create_rigid_body(&RigidBodyDesc::dynamic()).unwrap();
    assert!(world.remove_rigid_body(body.handle()).unwrap().is_some());
    assert!(world.remove_rigid_body(body.handle()).unwrap().is_none());
    assert!(world.bodies().is_empty());
}

#[test]
fn stale_handle_reads_fail_without_panicking() {
    let backend = RefBackend2::new();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let old = world
        .create_rigid_body(&RigidBodyDesc::dynamic().translation(Vec2::new(1.0, 1.0)))
        .unwrap();
    world.step().unwrap();
    world.remove_rigid_body(old.handle()).unwrap();

    // The slot is reused with a new generation.
    let new = world
        .create_rigid_body(&RigidBodyDesc::dynamic().translation(Vec2::new(5.0, 5.0)))
        .unwrap();
    assert_eq!(new.handle().index(), old.handle().index());
    assert_ne!(new.handle(), old.handle());

    assert!(world.get_rigid_body(old.handle()).is_none());
    assert_eq!(
        world.get_rigid_body(new.handle()).map(|b| b.handle()),
        Some(new.handle())
    );

    let err = old.translation().unwrap_err();
    assert_eq!(
        err,
        PhysicsError::Native(NativeError::InvalidHandle {
            kind: EntityKind::RigidBody,
            handle: old.handle().0,
        })
    );
    assert!(old
        .set_linvel(Vec2::new(1.0, 0.0), true)
        .is_err());
    assert_eq!(new.translation().unwrap(), Vec2::new(5.0, 5.0));
}

#[test]
fn free_releases_every_wrapper() {
    let backend = RefBackend2::new();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let body = world.create_rigid_body(&RigidBodyDesc::dynamic()).unwrap();
    let collider = world
        .create_collider(&ColliderDesc::ball(1.0), Some(body.handle()))
        .unwrap();
    world.step().unwrap();

    world.free().unwrap();

    let released_bodies = PhysicsError::Released {
        object: RawKind::RigidBodySet,
    };
    assert_eq!(body.translation().unwrap_err(), released_bodies);
    assert_eq!(
        body.set_translation(Vec2::ZERO, true).unwrap_err(),
        released_bodies
    );
    assert_eq!(
        collider.linvel().unwrap_err(),
        PhysicsError::Released {
            object: RawKind::ColliderSet
        }
    );
    assert_eq!(body.is_valid(), Ok(false));
    assert!(world.bodies().is_empty());
    assert!(matches!(
        world.step(),
        Err(PhysicsError::Released { .. })
    ));
    assert!(matches!(
        world.create_rigid_body(&RigidBodyDesc::fixed()),
        Err(PhysicsError::Released { .. })
    ));

    // Freeing twice is harmless.
    world.free().unwrap();
}

#[test]
fn failed_step_propagates_and_leaves_views_alone() {
    let backend = RefBackend2::new();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let body = world
        .create_rigid_body(&RigidBodyDesc::dynamic().translation(Vec2::new(0.0, 10.0)))
        .unwrap();
    world.step().unwrap();
    let before = body.translation().unwrap();

    backend.fail_next_step("solver diverged");
    let err = world.step().unwrap_err();
    assert_eq!(
        err,
        PhysicsError::Native(NativeError::Fatal {
            reason: "solver diverged".into()
        })
    );
    assert_eq!(body.translation().unwrap(), before);

    // The failure is not sticky.
    world.step().unwrap();
    assert!(body.translation().unwrap().y < before.y);
}

#[test]
fn removing_a_collider_updates_its_parent() {
    let backend = RefBackend2::new();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let body = world.create_rigid_body(&RigidBodyDesc::dynamic()).unwrap();
    let c1 = world
        .create_collider(&ColliderDesc::ball(0.5), Some(body.handle()))
        .unwrap();
    let c2 = world
        .create_collider(&ColliderDesc::ball(0.5), Some(body.handle()))
        .unwrap();
    assert_eq!(body.num_colliders().unwrap(), 2);
    assert_eq!(body.collider(1).unwrap(), c2.handle());

    world.remove_collider(c1.handle(), true).unwrap();
    assert_eq!(body.num_colliders().unwrap(), 1);
    assert_eq!(body.collider(0).unwrap(), c2.handle());
    assert!(matches!(
        body.collider(1),
        Err(PhysicsError::Native(NativeError::IndexOutOfRange { index: 1, len: 1 }))
    ));
    assert_eq!(world.colliders().attached_to(body.handle()), &[c2.handle()]);
}
