//! Integration test: stepping, activity, events and joints.
//!
//! Drives the collections both through [`World`] and directly through
//! [`PhysicsPipeline`], the way a host that manages its own sets would.

use tether_core::{
    ColliderDesc, CollisionEvent, IntegrationParameters, JointData, RigidBodyDesc, Vec2,
    Vec3,
};
use tether_engine::{
    ColliderSet, EventQueue, ImpulseJointSet, IslandManager, MultibodyJointSet, PhysicsPipeline,
    RigidBodySet, World,
};
use tether_test_utils::{RefBackend2, RefBackend3, GRAVITY_2D, GRAVITY_3D};

#[test]
fn active_iteration_skips_fixed_and_sleeping_bodies() {
    let backend = RefBackend2::new();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let awake = world.create_rigid_body(&RigidBodyDesc::dynamic()).unwrap();
    let _ground = world.create_rigid_body(&RigidBodyDesc::fixed()).unwrap();
    let asleep = world
        .create_rigid_body(&RigidBodyDesc::dynamic().sleeping(true))
        .unwrap();

    // Nothing has been simulated yet.
    let mut seen = Vec::new();
    world
        .for_each_active_rigid_body(|b| seen.push(b.handle()))
        .unwrap();
    assert!(seen.is_empty());

    world.step().unwrap();
    world
        .for_each_active_rigid_body(|b| seen.push(b.handle()))
        .unwrap();
    assert_eq!(seen, vec![awake.handle()]);
    assert!(asleep.is_sleeping().unwrap());

    let mut all = 0;
    world.for_each_rigid_body(|_| all += 1);
    assert_eq!(all, 3);

    asleep.wake_up().unwrap();
    world.step().unwrap();
    seen.clear();
    world
        .for_each_active_rigid_body(|b| seen.push(b.handle()))
        .unwrap();
    assert_eq!(seen, vec![awake.handle(), asleep.handle()]);
}

#[test]
fn sleeping_body_holds_still() {
    let backend = RefBackend2::new();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let body = world
        .create_rigid_body(
            &RigidBodyDesc::dynamic()
                .translation(Vec2::new(0.0, 3.0))
                .linvel(Vec2::new(1.0, 0.0)),
        )
        .unwrap();
    body.sleep().unwrap();
    assert_eq!(body.linvel().unwrap(), Vec2::ZERO);

    world.step().unwrap();
    assert_eq!(body.translation().unwrap(), Vec2::new(0.0, 3.0));

    body.apply_impulse(Vec2::new(0.0, 5.0), true).unwrap();
    assert!(!body.is_sleeping().unwrap());
    world.step().unwrap();
    assert!(body.translation().unwrap().y > 3.0);
}

#[test]
fn collision_events_report_start_and_stop() {
    let backend = RefBackend2::new();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let mut events = EventQueue::new(&backend);

    let ground = world
        .create_collider(&ColliderDesc::ball(1.0), None)
        .unwrap();
    let body = world
        .create_rigid_body(&RigidBodyDesc::dynamic().translation(Vec2::new(0.0, 3.0)))
        .unwrap();
    let falling = world
        .create_collider(
            &ColliderDesc::ball(0.5).collision_events(true),
            Some(body.handle()),
        )
        .unwrap();

    let mut log: Vec<CollisionEvent> = Vec::new();
    for _ in 0..240 {
        world.step_with_events(&mut events).unwrap();
        events.drain_collision_events(|e| log.push(e)).unwrap();
    }

    assert_eq!(log.len(), 2, "{log:?}");
    assert!(log[0].started);
    assert!(!log[1].started);
    for event in &log {
        assert!(event.involves(ground.handle()));
        assert!(event.involves(falling.handle()));
    }
}

#[test]
fn events_are_not_recorded_without_a_queue() {
    let backend = RefBackend2::new();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let mut events = EventQueue::new(&backend);
    world
        .create_collider(&ColliderDesc::ball(1.0).collision_events(true), None)
        .unwrap();
    world
        .create_collider(&ColliderDesc::ball(1.0).collision_events(true), None)
        .unwrap();

    world.step().unwrap();
    let mut count = 0;
    events.drain_collision_events(|_| count += 1).unwrap();
    assert_eq!(count, 0);

    events.clear().unwrap();
    events.free();
    assert!(events.drain_collision_events(|_| ()).is_err());
}

#[test]
fn joints_are_indexed_by_body() {
    let backend = RefBackend2::new();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let a = world.create_rigid_body(&RigidBodyDesc::fixed()).unwrap();
    let b = world.create_rigid_body(&RigidBodyDesc::dynamic()).unwrap();
    let c = world.create_rigid_body(&RigidBodyDesc::dynamic()).unwrap();
    let data = JointData::revolute(Vec2::new(0.0, -1.0), Vec2::new(0.0, 1.0));

    let ab = world
        .create_impulse_joint(&data, a.handle(), b.handle(), true)
        .unwrap();
    let bc = world
        .create_impulse_joint(&data, b.handle(), c.handle(), true)
        .unwrap();
    assert_eq!(world.impulse_joints().len(), 2);
    assert_eq!(world.impulse_joints().get(ab.handle), Some(&ab));

    let mut on_b = Vec::new();
    world
        .impulse_joints()
        .for_each_joint_handle_attached_to_rigid_body(b.handle(), |j| on_b.push(j));
    assert_eq!(on_b, vec![ab.handle, bc.handle]);

    let removed = world.remove_impulse_joint(ab.handle, true).unwrap();
    assert_eq!(removed, Some(ab));
    assert!(world
        .remove_impulse_joint(ab.handle, true)
        .unwrap()
        .is_none());

    let mut on_a = Vec::new();
    world
        .impulse_joints()
        .for_each_joint_handle_attached_to_rigid_body(a.handle(), |j| on_a.push(j));
    assert!(on_a.is_empty());

    let mb = world
        .create_multibody_joint(&data, a.handle(), c.handle(), false)
        .unwrap();
    assert!(world.multibody_joints().contains(mb.handle));
    world.remove_multibody_joint(mb.handle, false).unwrap();
    assert!(world.multibody_joints().is_empty());
}

#[test]
fn joint_to_unknown_body_is_rejected() {
    let backend = RefBackend2::new();
    let mut world = World::new(&backend, GRAVITY_2D).unwrap();
    let a = world.create_rigid_body(&RigidBodyDesc::dynamic()).unwrap();
    let gone = world.create_rigid_body(&RigidBodyDesc::dynamic()).unwrap();
    world.remove_rigid_body(gone.handle()).unwrap();

    let data = JointData::fixed(Vec2::ZERO, Vec2::ZERO);
    assert!(world
        .create_impulse_joint(&data, a.handle(), gone.handle(), true)
        .is_err());
    assert!(world.impulse_joints().is_empty());
}

#[test]
fn sets_can_be_driven_without_a_world() {
    let backend = RefBackend3::new();
    let mut islands = IslandManager::new(&backend);
    let mut bodies = RigidBodySet::new(&backend);
    let mut colliders = ColliderSet::new(&backend);
    let mut impulse_joints = ImpulseJointSet::new(&backend);
    let mut multibody_joints = MultibodyJointSet::new(&backend);
    let mut pipeline = PhysicsPipeline::new(&backend);
    let params = IntegrationParameters::with_dt(0.01);

    let body = bodies
        .create_rigid_body(&RigidBodyDesc::dynamic().translation(Vec3::new(0.0, 1.0, 0.0)))
        .unwrap();
    let collider = colliders
        .create_collider(&ColliderDesc::ball(0.25), Some(body.handle()), &mut bodies)
        .unwrap();

    for _ in 0..10 {
        pipeline
            .step(
                &GRAVITY_3D,
                &params,
                &mut islands,
                &mut bodies,
                &mut colliders,
                &mut impulse_joints,
                &mut multibody_joints,
                None,
            )
            .unwrap();
    }

    let t = body.translation().unwrap();
    assert!(t.y < 1.0);
    assert_eq!(collider.translation().unwrap(), t);
    assert_eq!(bodies.get_all().len(), 1);
    assert_eq!(
        colliders.iter().map(|(h, _)| h).collect::<Vec<_>>(),
        vec![collider.handle()]
    );

    pipeline.free();
    assert!(pipeline
        .step(
            &GRAVITY_3D,
            &params,
            &mut islands,
            &mut bodies,
            &mut colliders,
            &mut impulse_joints,
            &mut multibody_joints,
            None,
        )
        .is_err());
}
