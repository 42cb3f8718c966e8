//! Reference activity tracking.

use tether_core::raw::RawIslandManager;
use tether_core::RigidBodyHandle;

use crate::bodies::RefBodies;
use crate::kinematics::Kinematics;

/// Tracks which bodies were simulated by the last step.
#[derive(Debug, Default)]
pub struct RefIslands {
    active: Vec<RigidBodyHandle>,
}

impl RefIslands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the active list from body state.
    pub(crate) fn update<D: Kinematics>(&mut self, bodies: &RefBodies<D>) {
        self.active.clear();
        self.active.extend(
            bodies
                .table
                .iter()
                .filter(|(_, r)| r.is_active())
                .map(|(h, _)| RigidBodyHandle(h)),
        );
    }

    /// Drop a removed body from the active list.
    pub(crate) fn forget(&mut self, body: RigidBodyHandle) {
        self.active.retain(|h| *h != body);
    }
}

impl RawIslandManager for RefIslands {
    fn for_each_active_rigid_body_handle(&self, f: &mut dyn FnMut(RigidBodyHandle)) {
        for h in &self.active {
            f(*h);
        }
    }
}
