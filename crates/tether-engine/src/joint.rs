//! Impulse and multibody joint sets.
//!
//! Joints carry no packed state, so these sets only plumb handles: they
//! forward creation and removal to the native module and keep a
//! body → joints index so a body removal can unmap its joints.

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::debug;

use tether_arena::Coarena;
use tether_core::raw::{RawImpulseJointSet, RawMultibodyJointSet};
use tether_core::{
    ArenaKey, Backend, ImpulseJointHandle, JointData, MultibodyJointHandle, RigidBodyHandle,
};

use crate::error::{PhysicsError, RawKind};
use crate::rigid_body_set::RigidBodySet;

/// A joint as recorded by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JointLink<K> {
    /// Native joint handle.
    pub handle: K,
    /// First attached body.
    pub body1: RigidBodyHandle,
    /// Second attached body.
    pub body2: RigidBodyHandle,
}

/// Host-side bookkeeping shared by both joint sets.
#[derive(Debug)]
struct JointRegistry<K> {
    links: Coarena<K, JointLink<K>>,
    attached: IndexMap<RigidBodyHandle, SmallVec<[K; 4]>>,
}

impl<K: ArenaKey> JointRegistry<K> {
    fn new() -> Self {
        Self {
            links: Coarena::new(),
            attached: IndexMap::new(),
        }
    }

    fn insert(&mut self, link: JointLink<K>) {
        self.links.set(link.handle, link);
        self.attached.entry(link.body1).or_default().push(link.handle);
        if link.body2 != link.body1 {
            self.attached.entry(link.body2).or_default().push(link.handle);
        }
    }

    fn unmap(&mut self, handle: K) -> Option<JointLink<K>> {
        let link = self.links.delete(handle)?;
        for body in [link.body1, link.body2] {
            if let Some(list) = self.attached.get_mut(&body) {
                list.retain(|h| *h != handle);
                if list.is_empty() {
                    self.attached.swap_remove(&body);
                }
            }
        }
        Some(link)
    }

    fn unmap_attached_to(&mut self, body: RigidBodyHandle) {
        let Some(joints) = self.attached.get(&body).cloned() else {
            return;
        };
        for handle in joints {
            self.unmap(handle);
        }
    }

    fn for_each_attached(&self, body: RigidBodyHandle, mut f: impl FnMut(K)) {
        if let Some(list) = self.attached.get(&body) {
            for h in list {
                f(*h);
            }
        }
    }

    fn clear(&mut self) {
        self.links.clear();
        self.attached.clear();
    }
}

macro_rules! joint_set {
    (
        $(#[$meta:meta])*
        $name:ident, $handle:ident, $assoc:ident, $factory:ident, $kind:ident
    ) => {
        $(#[$meta])*
        pub struct $name<B: Backend> {
            raw: Option<B::$assoc>,
            registry: JointRegistry<$handle>,
        }

        impl<B: Backend> $name<B> {
            /// Allocate an empty native joint set.
            pub fn new(backend: &B) -> Self {
                Self::from_raw(backend.$factory())
            }

            /// Adopt an existing native joint set, registering every joint
            /// it already holds.
            pub fn from_raw(raw: B::$assoc) -> Self {
                let mut registry = JointRegistry::new();
                let mut handles = Vec::new();
                raw.for_each_handle(&mut |h| handles.push(h));
                for handle in handles {
                    if let Ok((body1, body2)) = raw.attached_bodies(handle) {
                        registry.insert(JointLink {
                            handle,
                            body1,
                            body2,
                        });
                    }
                }
                Self {
                    raw: Some(raw),
                    registry,
                }
            }

            /// Create a joint between two bodies.
            pub fn create_joint(
                &mut self,
                bodies: &mut RigidBodySet<B>,
                data: &JointData<B::Dim>,
                body1: RigidBodyHandle,
                body2: RigidBodyHandle,
                wake_up: bool,
            ) -> Result<JointLink<$handle>, PhysicsError> {
                let handle = {
                    let mut bodies_raw = bodies.raw_mut()?;
                    self.raw_mut()?
                        .create_joint(&mut bodies_raw, data, body1, body2, wake_up)?
                };
                let link = JointLink {
                    handle,
                    body1,
                    body2,
                };
                self.registry.insert(link);
                debug!(%handle, %body1, %body2, "created joint");
                Ok(link)
            }

            /// Remove a joint. Unknown handles are a no-op.
            pub fn remove(
                &mut self,
                handle: $handle,
                bodies: &mut RigidBodySet<B>,
                wake_up: bool,
            ) -> Result<Option<JointLink<$handle>>, PhysicsError> {
                if !self.raw()?.contains(handle) {
                    return Ok(None);
                }
                {
                    let mut bodies_raw = bodies.raw_mut()?;
                    self.raw_mut()?.remove(handle, &mut bodies_raw, wake_up)?;
                }
                debug!(%handle, "removed joint");
                Ok(self.registry.unmap(handle))
            }

            /// Forget a joint the native module already removed.
            pub fn unmap(&mut self, handle: $handle) -> Option<JointLink<$handle>> {
                self.registry.unmap(handle)
            }

            /// Forget every joint attached to `body`.
            pub fn unmap_attached_to(&mut self, body: RigidBodyHandle) {
                self.registry.unmap_attached_to(body);
            }

            /// Call `f` with every joint attached to `body`.
            pub fn for_each_joint_handle_attached_to_rigid_body(
                &self,
                body: RigidBodyHandle,
                f: impl FnMut($handle),
            ) {
                self.registry.for_each_attached(body, f);
            }

            /// The recorded joint, if live.
            pub fn get(&self, handle: $handle) -> Option<&JointLink<$handle>> {
                self.registry.links.get(handle)
            }

            /// Whether `handle` names a recorded joint.
            pub fn contains(&self, handle: $handle) -> bool {
                self.registry.links.contains(handle)
            }

            /// Number of recorded joints.
            pub fn len(&self) -> usize {
                self.registry.links.len()
            }

            /// Whether no joint is recorded.
            pub fn is_empty(&self) -> bool {
                self.registry.links.is_empty()
            }

            /// Release the native set and forget every joint.
            pub fn free(&mut self) {
                if self.raw.take().is_some() {
                    debug!(object = %RawKind::$kind, "freed joint set");
                }
                self.registry.clear();
            }

            fn raw(&self) -> Result<&B::$assoc, PhysicsError> {
                self.raw.as_ref().ok_or(PhysicsError::Released {
                    object: RawKind::$kind,
                })
            }

            pub(crate) fn raw_mut(&mut self) -> Result<&mut B::$assoc, PhysicsError> {
                self.raw.as_mut().ok_or(PhysicsError::Released {
                    object: RawKind::$kind,
                })
            }
        }
    };
}

joint_set!(
    /// Joints solved by the impulse-based solver.
    ImpulseJointSet,
    ImpulseJointHandle,
    ImpulseJoints,
    new_impulse_joint_set,
    ImpulseJointSet
);

joint_set!(
    /// Joints solved in reduced coordinates.
    MultibodyJointSet,
    MultibodyJointHandle,
    MultibodyJoints,
    new_multibody_joint_set,
    MultibodyJointSet
);

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::Handle;

    fn body(i: u32) -> RigidBodyHandle {
        RigidBodyHandle(Handle::new(i, 0))
    }

    fn joint(i: u32) -> ImpulseJointHandle {
        ImpulseJointHandle(Handle::new(i, 0))
    }

    #[test]
    fn registry_indexes_both_bodies() {
        let mut r = JointRegistry::new();
        r.insert(JointLink {
            handle: joint(0),
            body1: body(0),
            body2: body(1),
        });
        r.insert(JointLink {
            handle: joint(1),
            body1: body(1),
            body2: body(2),
        });

        let mut on_b1 = Vec::new();
        r.for_each_attached(body(1), |h| on_b1.push(h));
        assert_eq!(on_b1, vec![joint(0), joint(1)]);

        r.unmap_attached_to(body(0));
        assert!(!r.links.contains(joint(0)));
        assert!(r.links.contains(joint(1)));

        let mut on_b1 = Vec::new();
        r.for_each_attached(body(1), |h| on_b1.push(h));
        assert_eq!(on_b1, vec![joint(1)]);
        assert!(r.attached.get(&body(0)).is_none());
    }

    #[test]
    fn unmap_unknown_is_none() {
        let mut r: JointRegistry<ImpulseJointHandle> = JointRegistry::new();
        assert!(r.unmap(joint(3)).is_none());
    }
}
