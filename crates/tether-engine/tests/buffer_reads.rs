//! Integration test: reads through the packed transform buffer.
//!
//! Every accessor either decodes the entity's record out of linear memory
//! or falls back to the native accessor. These tests drive a world through
//! steps, writes, creations and memory growth and check that both paths
//! agree and that reads never observe a relocated or poisoned region.

use tether_core::{
    Backend, ColliderDesc, LinearMemory, Quat, RigidBodyDesc, Vec2, Vec3,
};
use tether_engine::World;
use tether_test_utils::{RefBackend2, RefBackend3, GRAVITY_2D, GRAVITY_3D};

fn close2(a: Vec2, b: Vec2) -> bool {
    (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5
}

// ── Scenarios ────────────────────────────────────────────────────────

#[test]
fn falling_body_descends_every_step() {
    let backend = RefBackend2::new();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let body = world
        .create_rigid_body(&RigidBodyDesc::dynamic().translation(Vec2::new(0.0, 10.0)))
        .unwrap();

    world.step().unwrap();
    let mut last = body.translation().unwrap().y;
    assert!(last < 10.0);

    for _ in 0..30 {
        world.step().unwrap();
        let y = body.translation().unwrap().y;
        assert!(y < last, "{y} should be below {last}");
        last = y;
    }
    assert!(body.linvel().unwrap().y < 0.0);
}

#[test]
fn write_then_read_returns_written_value() {
    let backend = RefBackend2::new();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let body = world
        .create_rigid_body(&RigidBodyDesc::dynamic())
        .unwrap();
    world.step().unwrap();

    body.set_translation(Vec2::new(3.0, -4.0), true).unwrap();
    body.set_rotation(0.25, true).unwrap();
    body.set_linvel(Vec2::new(1.5, 0.5), true).unwrap();
    body.set_angvel(-2.0, true).unwrap();

    assert_eq!(body.translation().unwrap(), Vec2::new(3.0, -4.0));
    assert_eq!(body.rotation().unwrap(), 0.25);
    assert_eq!(body.linvel().unwrap(), Vec2::new(1.5, 0.5));
    assert_eq!(body.angvel().unwrap(), -2.0);
}

#[test]
fn fused_transform_matches_separate_setters() {
    let backend = RefBackend3::new();
    let mut world = World::new(&backend, GRAVITY_3D).unwrap();
    let a = world.create_rigid_body(&RigidBodyDesc::dynamic()).unwrap();
    let b = world.create_rigid_body(&RigidBodyDesc::dynamic()).unwrap();
    world.step().unwrap();

    let t = Vec3::new(1.0, 2.0, 3.0);
    let r = Quat::from_xyzw(0.0, 0.6, 0.0, 0.8);
    a.set_transform(t, r, false).unwrap();
    b.set_translation(t, false).unwrap();
    b.set_rotation(r, false).unwrap();

    assert_eq!(a.translation().unwrap(), b.translation().unwrap());
    assert_eq!(a.rotation().unwrap(), b.rotation().unwrap());

    world.step().unwrap();
    assert_eq!(a.translation().unwrap(), b.translation().unwrap());
    assert_eq!(a.rotation().unwrap(), b.rotation().unwrap());
}

#[test]
fn reads_between_steps_are_idempotent() {
    let backend = RefBackend3::new();
    let mut world = World::new(&backend, GRAVITY_3D).unwrap();
    let body = world
        .create_rigid_body(
            &RigidBodyDesc::dynamic()
                .translation(Vec3::new(0.0, 5.0, 0.0))
                .angvel(Vec3::new(0.0, 0.0, 1.0)),
        )
        .unwrap();
    world.step().unwrap();

    let first = (body.translation().unwrap(), body.rotation().unwrap());
    let second = (body.translation().unwrap(), body.rotation().unwrap());
    assert_eq!(first, second);
    assert_ne!(first.1, Quat::IDENTITY);
}

#[test]
fn write_invalidates_only_until_next_step() {
    let backend = RefBackend2::new();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let body = world
        .create_rigid_body(&RigidBodyDesc::dynamic().translation(Vec2::new(0.0, 1.0)))
        .unwrap();
    world.step().unwrap();

    body.set_translation(Vec2::new(50.0, 50.0), false).unwrap();
    assert_eq!(body.translation().unwrap(), Vec2::new(50.0, 50.0));

    world.step().unwrap();
    let after = body.translation().unwrap();
    assert_eq!(after.x, 50.0);
    assert!(after.y < 50.0);
}

#[test]
fn into_returns_the_callers_target() {
    let backend = RefBackend3::new();
    let mut world = World::new(&backend, GRAVITY_3D).unwrap();
    let body = world
        .create_rigid_body(&RigidBodyDesc::dynamic().translation(Vec3::new(1.0, 2.0, 3.0)))
        .unwrap();
    world.step().unwrap();

    let mut target = Vec3::ZERO;
    let addr = std::ptr::addr_of!(target);
    let out = body.translation_into(&mut target).unwrap();
    assert!(std::ptr::eq(&*out, addr));
    assert_eq!(*out, body.translation().unwrap());

    let mut q = Quat::from_xyzw(9.0, 9.0, 9.0, 9.0);
    let addr = std::ptr::addr_of!(q);
    let out = body.rotation_into(&mut q).unwrap();
    assert!(std::ptr::eq(&*out, addr));
    assert_eq!(*out, Quat::IDENTITY);
}

#[test]
fn body_created_after_step_reads_native_state() {
    let backend = RefBackend2::new();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let early = world
        .create_rigid_body(&RigidBodyDesc::dynamic().translation(Vec2::new(0.0, 10.0)))
        .unwrap();
    world.step().unwrap();

    // Its index lies past the packed length of the last step.
    let late = world
        .create_rigid_body(
            &RigidBodyDesc::dynamic()
                .translation(Vec2::new(7.0, 8.0))
                .linvel(Vec2::new(1.0, 0.0)),
        )
        .unwrap();
    assert_eq!(late.translation().unwrap(), Vec2::new(7.0, 8.0));
    assert_eq!(late.linvel().unwrap(), Vec2::new(1.0, 0.0));
    assert!(early.translation().unwrap().y < 10.0);

    world.step().unwrap();
    assert!(late.translation().unwrap().x > 7.0);
}

#[test]
fn memory_growth_forces_reborrow() {
    let backend = RefBackend2::with_page_words(16);
    let memory = backend.memory();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let body = world
        .create_rigid_body(&RigidBodyDesc::dynamic().translation(Vec2::new(0.0, 10.0)))
        .unwrap();
    world.step().unwrap();
    let before = body.translation().unwrap();
    let epoch = memory.epoch();

    // Collider creation only invalidates the collider view, so the body
    // view still holds the pre-growth region.
    for i in 0..8 {
        world
            .create_collider(&ColliderDesc::ball(0.1).translation(Vec2::new(i as f32, 0.0)), None)
            .unwrap();
    }
    assert_ne!(memory.epoch(), epoch);

    let after = body.translation().unwrap();
    assert!(after.x.is_finite() && after.y.is_finite());
    assert_eq!(after, before);

    world.step().unwrap();
    assert!(body.translation().unwrap().y < before.y);
}

#[test]
fn many_bodies_across_growth_read_consistently() {
    let backend = RefBackend2::with_page_words(8);
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let bodies: Vec<_> = (0..40)
        .map(|i| {
            world
                .create_rigid_body(
                    &RigidBodyDesc::dynamic()
                        .translation(Vec2::new(i as f32, 100.0))
                        .gravity_scale(0.0),
                )
                .unwrap()
        })
        .collect();
    for _ in 0..3 {
        world.step().unwrap();
    }
    for (i, body) in bodies.iter().enumerate() {
        assert_eq!(body.translation().unwrap(), Vec2::new(i as f32, 100.0));
    }
}

#[test]
fn collider_follows_parent_and_shares_its_velocity() {
    let backend = RefBackend2::new();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let body = world
        .create_rigid_body(&RigidBodyDesc::dynamic().translation(Vec2::new(2.0, 10.0)))
        .unwrap();
    let collider = world
        .create_collider(
            &ColliderDesc::ball(0.5).translation(Vec2::new(0.0, 1.0)),
            Some(body.handle()),
        )
        .unwrap();
    assert!(close2(collider.translation().unwrap(), Vec2::new(2.0, 11.0)));

    for _ in 0..5 {
        world.step().unwrap();
    }
    let bt = body.translation().unwrap();
    assert!(close2(
        collider.translation().unwrap(),
        Vec2::new(bt.x, bt.y + 1.0)
    ));
    assert_eq!(collider.linvel().unwrap(), body.linvel().unwrap());
    assert_eq!(collider.angvel().unwrap(), body.angvel().unwrap());
    assert_eq!(collider.parent().unwrap(), Some(body.handle()));
}

#[test]
fn position_kinematic_body_reaches_target() {
    let backend = RefBackend2::new();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let body = world
        .create_rigid_body(&RigidBodyDesc::kinematic_position_based())
        .unwrap();
    body.set_next_kinematic_translation(Vec2::new(1.0, 2.0))
        .unwrap();
    world.step().unwrap();
    assert!(close2(body.translation().unwrap(), Vec2::new(1.0, 2.0)));
    assert!(body.is_kinematic().unwrap());
}
