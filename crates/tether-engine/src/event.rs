//! [`EventQueue`]: collision events produced by a step.

use tracing::debug;

use tether_core::raw::RawEventQueue;
use tether_core::{Backend, CollisionEvent};

use crate::error::{PhysicsError, RawKind};

/// Owner of a native event queue.
///
/// Pass it to [`PhysicsPipeline::step`](crate::PhysicsPipeline::step) to
/// collect events, then drain them.
pub struct EventQueue<B: Backend> {
    raw: Option<B::EventQueue>,
}

impl<B: Backend> EventQueue<B> {
    /// Allocate a native event queue.
    pub fn new(backend: &B) -> Self {
        Self {
            raw: Some(backend.new_event_queue()),
        }
    }

    /// Hand every pending collision event to `f`, oldest first.
    pub fn drain_collision_events(
        &mut self,
        mut f: impl FnMut(CollisionEvent),
    ) -> Result<(), PhysicsError> {
        self.raw_mut()?.drain_collision_events(&mut f);
        Ok(())
    }

    /// Discard every pending event.
    pub fn clear(&mut self) -> Result<(), PhysicsError> {
        self.raw_mut()?.clear();
        Ok(())
    }

    /// Release the native queue.
    pub fn free(&mut self) {
        if self.raw.take().is_some() {
            debug!("freed event queue");
        }
    }

    pub(crate) fn raw_mut(&mut self) -> Result<&mut B::EventQueue, PhysicsError> {
        self.raw.as_mut().ok_or(PhysicsError::Released {
            object: RawKind::EventQueue,
        })
    }
}
