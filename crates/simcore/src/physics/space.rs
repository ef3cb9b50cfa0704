use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::body::{Body, BodyId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contact {
    pub touching: bool,
    pub blocking: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Touch,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionEvent {
    pub kind: ContactKind,
    pub subject: BodyId,
    pub other: BodyId,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactStats {
    pub pair_checks: u64,
    pub touches: u64,
    pub blocks: u64,
}

/// Iteration order is unspecified but stable for a given set of IDs.
#[derive(Debug, Default)]
pub struct CollisionSpace {
    bodies: BTreeMap<BodyId, Body>,
    events: Vec<CollisionEvent>,
    stats: ContactStats,
}

impl CollisionSpace {
    pub fn add_body(&mut self, body: Body) -> Option<Body> {
        debug!(body = %body.id(), obstructive = body.is_obstructive(), "body_added");
        self.bodies.insert(body.id().clone(), body)
    }

    pub fn remove_body(&mut self, id: &str) -> Option<Body> {
        let removed = self.bodies.remove(id);
        if removed.is_some() {
            debug!(body = id, "body_removed");
        }
        removed
    }

    pub(crate) fn detach(&mut self, id: &str) -> Option<Body> {
        self.bodies.remove(id)
    }

    pub(crate) fn attach(&mut self, body: Body) {
        self.bodies.insert(body.id().clone(), body);
    }

    pub fn body(&self, id: &str) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: &str) -> Option<&mut Body> {
        self.bodies.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.bodies.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn bodies(&self) -> Vec<&Body> {
        self.bodies.values().collect()
    }

    /// The first obstructive overlap ends the scan.
    pub fn resolve_collisions(&mut self, body: &mut Body) -> Contact {
        let Self {
            bodies,
            events,
            stats,
        } = self;
        let mut contact = Contact::default();

        for other in bodies.values_mut() {
            if other.id() == body.id() {
                continue;
            }
            stats.pair_checks = stats.pair_checks.saturating_add(1);
            if !body.overlaps(other) {
                continue;
            }

            body.notify_touch(other);
            other.notify_touch(body);
            stats.touches = stats.touches.saturating_add(1);
            events.push(CollisionEvent {
                kind: ContactKind::Touch,
                subject: body.id().clone(),
                other: other.id().clone(),
            });
            contact.touching = true;

            if other.is_obstructive() {
                body.notify_block(other);
                other.notify_block(body);
                stats.blocks = stats.blocks.saturating_add(1);
                events.push(CollisionEvent {
                    kind: ContactKind::Block,
                    subject: body.id().clone(),
                    other: other.id().clone(),
                });
                contact.blocking = true;
                trace!(body = %body.id(), other = %other.id(), "movement_blocked");
                break;
            }
        }

        contact
    }

    // No callbacks, events or stats.
    pub fn is_obstructed(&self, body: &Body) -> bool {
        self.bodies.values().any(|other| {
            other.id() != body.id() && other.is_obstructive() && body.overlaps(other)
        })
    }

    pub fn resolve_collisions_for(&mut self, id: &str) -> Contact {
        let Some(mut body) = self.detach(id) else {
            return Contact::default();
        };
        let contact = self.resolve_collisions(&mut body);
        self.attach(body);
        contact
    }

    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn take_stats(&mut self) -> ContactStats {
        std::mem::take(&mut self.stats)
    }
}
