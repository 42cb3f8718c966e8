//! [`IslandManager`]: which bodies the solver currently simulates.

use tracing::debug;

use tether_core::raw::RawIslandManager;
use tether_core::{Backend, RigidBodyHandle};

use crate::error::{PhysicsError, RawKind};

/// Owner of the native island manager.
pub struct IslandManager<B: Backend> {
    raw: Option<B::Islands>,
}

impl<B: Backend> IslandManager<B> {
    /// Allocate a native island manager.
    pub fn new(backend: &B) -> Self {
        Self::from_raw(backend.new_island_manager())
    }

    /// Adopt an existing native island manager.
    pub fn from_raw(raw: B::Islands) -> Self {
        Self { raw: Some(raw) }
    }

    /// Call `f` with the handle of every awake, simulated body.
    pub fn for_each_active_rigid_body_handle(
        &self,
        mut f: impl FnMut(RigidBodyHandle),
    ) -> Result<(), PhysicsError> {
        self.raw()?.for_each_active_rigid_body_handle(&mut f);
        Ok(())
    }

    /// Release the native island manager.
    pub fn free(&mut self) {
        if self.raw.take().is_some() {
            debug!("freed island manager");
        }
    }

    pub(crate) fn raw(&self) -> Result<&B::Islands, PhysicsError> {
        self.raw.as_ref().ok_or(PhysicsError::Released {
            object: RawKind::IslandManager,
        })
    }

    pub(crate) fn raw_mut(&mut self) -> Result<&mut B::Islands, PhysicsError> {
        self.raw.as_mut().ok_or(PhysicsError::Released {
            object: RawKind::IslandManager,
        })
    }
}
