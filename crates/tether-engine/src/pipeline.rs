//! [`PhysicsPipeline`]: runs a native step and refreshes buffer views.
//!
//! The step is the only place where packed transform buffers change, so
//! it is also the only place where the body and collider views are
//! refreshed. A failed step leaves both views untouched: stale entities
//! keep reading through the native accessor and fresh ones keep reading
//! the previous step's records.

use tracing::{debug, warn};

use tether_core::raw::RawPhysicsPipeline;
use tether_core::{Backend, IntegrationParameters, Vect};

use crate::collider_set::ColliderSet;
use crate::error::{PhysicsError, RawKind};
use crate::event::EventQueue;
use crate::island::IslandManager;
use crate::joint::{ImpulseJointSet, MultibodyJointSet};
use crate::rigid_body_set::RigidBodySet;

/// Owner of the native step.
pub struct PhysicsPipeline<B: Backend> {
    raw: Option<B::Pipeline>,
}

impl<B: Backend> PhysicsPipeline<B> {
    /// Allocate a native pipeline.
    pub fn new(backend: &B) -> Self {
        Self {
            raw: Some(backend.new_pipeline()),
        }
    }

    /// Advance the simulation by `params.dt`.
    ///
    /// On success the body and collider sets adopt the buffers the native
    /// module packed during the step. Collision events are pushed to
    /// `events` when one is given.
    #[allow(clippy::too_many_arguments)]
    pub fn step(
        &mut self,
        gravity: &Vect<B::Dim>,
        params: &IntegrationParameters,
        islands: &mut IslandManager<B>,
        bodies: &mut RigidBodySet<B>,
        colliders: &mut ColliderSet<B>,
        impulse_joints: &mut ImpulseJointSet<B>,
        multibody_joints: &mut MultibodyJointSet<B>,
        events: Option<&mut EventQueue<B>>,
    ) -> Result<(), PhysicsError> {
        let events = events.map(EventQueue::raw_mut).transpose()?;
        let stepped = {
            let mut body_raw = bodies.raw_mut()?;
            let mut collider_raw = colliders.raw_mut()?;
            self.raw_mut()?.step(
                gravity,
                params,
                islands.raw_mut()?,
                &mut body_raw,
                &mut collider_raw,
                impulse_joints.raw_mut()?,
                multibody_joints.raw_mut()?,
                events,
            )
        };
        if let Err(err) = stepped {
            warn!(%err, "physics step failed, buffer views left as they were");
            return Err(err.into());
        }

        bodies.sync_buffer_view()?;
        colliders.sync_buffer_view()?;
        debug!(
            dt = params.dt,
            bodies = bodies.len(),
            colliders = colliders.len(),
            "stepped"
        );
        Ok(())
    }

    /// Release the native pipeline.
    pub fn free(&mut self) {
        if self.raw.take().is_some() {
            debug!("freed physics pipeline");
        }
    }

    fn raw_mut(&mut self) -> Result<&mut B::Pipeline, PhysicsError> {
        self.raw.as_mut().ok_or(PhysicsError::Released {
            object: RawKind::PhysicsPipeline,
        })
    }
}
