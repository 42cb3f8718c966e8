//! [`World`]: every native collection of one simulation, owned together.
//!
//! The sets can be driven individually through
//! [`PhysicsPipeline::step`](crate::PhysicsPipeline::step); `World` bundles
//! them with a validated [`WorldConfig`] so the common case is a
//! handful of calls.

use tracing::debug;

use tether_core::{
    Backend, ColliderDesc, ColliderHandle, ImpulseJointHandle, IntegrationParameters, JointData,
    MultibodyJointHandle, RigidBodyDesc, RigidBodyHandle, Vect,
};

use crate::collider::Collider;
use crate::collider_set::ColliderSet;
use crate::config::WorldConfig;
use crate::error::PhysicsError;
use crate::event::EventQueue;
use crate::island::IslandManager;
use crate::joint::{ImpulseJointSet, JointLink, MultibodyJointSet};
use crate::pipeline::PhysicsPipeline;
use crate::rigid_body::RigidBody;
use crate::rigid_body_set::RigidBodySet;

/// A complete simulation: bodies, colliders, joints, islands and the
/// native step, plus gravity and integration parameters.
pub struct World<B: Backend> {
    config: WorldConfig<B::Dim>,
    islands: IslandManager<B>,
    bodies: RigidBodySet<B>,
    colliders: ColliderSet<B>,
    impulse_joints: ImpulseJointSet<B>,
    multibody_joints: MultibodyJointSet<B>,
    pipeline: PhysicsPipeline<B>,
}

impl<B: Backend> World<B> {
    /// A world with the given gravity and default integration parameters.
    pub fn new(backend: &B, gravity: Vect<B::Dim>) -> Result<Self, PhysicsError> {
        Self::with_config(backend, WorldConfig::with_gravity(gravity))
    }

    /// A world with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::Config`] if `config` fails validation.
    /// Nothing native is allocated in that case.
    pub fn with_config(backend: &B, config: WorldConfig<B::Dim>) -> Result<Self, PhysicsError> {
        config.validate()?;
        debug!(dt = config.integration.dt, "creating world");
        Ok(Self {
            config,
            islands: IslandManager::new(backend),
            bodies: RigidBodySet::new(backend),
            colliders: ColliderSet::new(backend),
            impulse_joints: ImpulseJointSet::new(backend),
            multibody_joints: MultibodyJointSet::new(backend),
            pipeline: PhysicsPipeline::new(backend),
        })
    }

    // ── Entities ───────────────────────────────────────────────────

    /// Create a rigid body.
    pub fn create_rigid_body(
        &mut self,
        desc: &RigidBodyDesc<B::Dim>,
    ) -> Result<RigidBody<B>, PhysicsError> {
        self.bodies.create_rigid_body(desc)
    }

    /// Create a collider, attached to `parent` if given.
    pub fn create_collider(
        &mut self,
        desc: &ColliderDesc<B::Dim>,
        parent: Option<RigidBodyHandle>,
    ) -> Result<Collider<B>, PhysicsError> {
        self.colliders
            .create_collider(desc, parent, &mut self.bodies)
    }

    /// Remove a rigid body with its colliders and joints.
    pub fn remove_rigid_body(
        &mut self,
        handle: RigidBodyHandle,
    ) -> Result<Option<RigidBody<B>>, PhysicsError> {
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
        )
    }

    /// Remove a collider.
    pub fn remove_collider(
        &mut self,
        handle: ColliderHandle,
        wake_up: bool,
    ) -> Result<Option<Collider<B>>, PhysicsError> {
        self.colliders
            .remove(handle, &mut self.islands, &mut self.bodies, wake_up)
    }

    /// Join two bodies with an impulse joint.
    pub fn create_impulse_joint(
        &mut self,
        data: &JointData<B::Dim>,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        wake_up: bool,
    ) -> Result<JointLink<ImpulseJointHandle>, PhysicsError> {
        self.impulse_joints
            .create_joint(&mut self.bodies, data, body1, body2, wake_up)
    }

    /// Remove an impulse joint.
    pub fn remove_impulse_joint(
        &mut self,
        handle: ImpulseJointHandle,
        wake_up: bool,
    ) -> Result<Option<JointLink<ImpulseJointHandle>>, PhysicsError> {
        self.impulse_joints
            .remove(handle, &mut self.bodies, wake_up)
    }

    /// Join two bodies with a multibody joint.
    pub fn create_multibody_joint(
        &mut self,
        data: &JointData<B::Dim>,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        wake_up: bool,
    ) -> Result<JointLink<MultibodyJointHandle>, PhysicsError> {
        self.multibody_joints
            .create_joint(&mut self.bodies, data, body1, body2, wake_up)
    }

    /// Remove a multibody joint.
    pub fn remove_multibody_joint(
        &mut self,
        handle: MultibodyJointHandle,
        wake_up: bool,
    ) -> Result<Option<JointLink<MultibodyJointHandle>>, PhysicsError> {
        self.multibody_joints
            .remove(handle, &mut self.bodies, wake_up)
    }

    /// The body wrapper for `handle`, if live.
    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody<B>> {
        self.bodies.get(handle)
    }

    /// The collider wrapper for `handle`, if live.
    pub fn get_collider(&self, handle: ColliderHandle) -> Option<&Collider<B>> {
        self.colliders.get(handle)
    }

    /// Call `f` with every body.
    pub fn for_each_rigid_body(&self, f: impl FnMut(&RigidBody<B>)) {
        self.bodies.for_each(f);
    }

    /// Call `f` with every awake, simulated body.
    pub fn for_each_active_rigid_body(
        &self,
        f: impl FnMut(&RigidBody<B>),
    ) -> Result<(), PhysicsError> {
        self.bodies.for_each_active_rigid_body(&self.islands, f)
    }

    /// Call `f` with every collider.
    pub fn for_each_collider(&self, f: impl FnMut(&Collider<B>)) {
        self.colliders.for_each(f);
    }

    // ── Stepping ───────────────────────────────────────────────────

    /// Advance by one timestep.
    pub fn step(&mut self) -> Result<(), PhysicsError> {
        self.step_inner(None)
    }

    /// Advance by one timestep, pushing collision events to `events`.
    pub fn step_with_events(&mut self, events: &mut EventQueue<B>) -> Result<(), PhysicsError> {
        self.step_inner(Some(events))
    }

    fn step_inner(&mut self, events: Option<&mut EventQueue<B>>) -> Result<(), PhysicsError> {
        self.pipeline.step(
            &self.config.gravity,
            &self.config.integration,
            &mut self.islands,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            events,
        )
    }

    // ── Configuration ──────────────────────────────────────────────

    /// Seconds advanced per step.
    pub fn timestep(&self) -> f32 {
        self.config.integration.dt
    }

    /// Change the timestep. The world is left unchanged if `dt` is
    /// rejected.
    pub fn set_timestep(&mut self, dt: f32) -> Result<(), PhysicsError> {
        let mut next = self.config;
        next.integration.dt = dt;
        next.validate()?;
        self.config = next;
        Ok(())
    }

    /// World gravity.
    pub fn gravity(&self) -> Vect<B::Dim> {
        self.config.gravity
    }

    /// Change world gravity. The world is left unchanged if `gravity` is
    /// not finite.
    pub fn set_gravity(&mut self, gravity: Vect<B::Dim>) -> Result<(), PhysicsError> {
        let next = WorldConfig {
            gravity,
            ..self.config
        };
        next.validate()?;
        self.config = next;
        Ok(())
    }

    /// Current integration parameters.
    pub fn integration_parameters(&self) -> &IntegrationParameters {
        &self.config.integration
    }

    /// The full configuration.
    pub fn config(&self) -> &WorldConfig<B::Dim> {
        &self.config
    }

    // ── Collections ────────────────────────────────────────────────

    /// The rigid-body set.
    pub fn bodies(&self) -> &RigidBodySet<B> {
        &self.bodies
    }

    /// The collider set.
    pub fn colliders(&self) -> &ColliderSet<B> {
        &self.colliders
    }

    /// The impulse-joint set.
    pub fn impulse_joints(&self) -> &ImpulseJointSet<B> {
        &self.impulse_joints
    }

    /// The multibody-joint set.
    pub fn multibody_joints(&self) -> &MultibodyJointSet<B> {
        &self.multibody_joints
    }

    /// The island manager.
    pub fn islands(&self) -> &IslandManager<B> {
        &self.islands
    }

    /// Release every native object. Wrappers handed out earlier report
    /// [`PhysicsError::Released`] from then on.
    pub fn free(&mut self) -> Result<(), PhysicsError> {
        self.bodies.free()?;
        self.colliders.free()?;
        self.impulse_joints.free();
        self.multibody_joints.free();
        self.islands.free();
        self.pipeline.free();
        debug!("freed world");
        Ok(())
    }
}
