//! Reference event queue.

use std::collections::VecDeque;

use tether_core::raw::RawEventQueue;
use tether_core::CollisionEvent;

/// FIFO of collision events.
#[derive(Debug, Default)]
pub struct RefEventQueue {
    events: VecDeque<CollisionEvent>,
}

impl RefEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }
}

impl RawEventQueue for RefEventQueue {
    fn push(&mut self, event: CollisionEvent) {
        self.events.push_back(event);
    }

    fn drain_collision_events(&mut self, f: &mut dyn FnMut(CollisionEvent)) {
        while let Some(event) = self.events.pop_front() {
            f(event);
        }
    }

    fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::{ColliderHandle, Handle};

    #[test]
    fn drains_in_order() {
        let mut q = RefEventQueue::new();
        for i in 0..3 {
            q.push(CollisionEvent {
                collider1: ColliderHandle(Handle::new(i, 0)),
                collider2: ColliderHandle(Handle::new(i + 1, 0)),
                started: true,
            });
        }
        let mut seen = Vec::new();
        q.drain_collision_events(&mut |e| seen.push(e.collider1.index()));
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(q.pending(), 0);
    }
}
