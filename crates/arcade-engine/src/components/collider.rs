use crate::api::types::ActorId;
use crate::core::polygon::Polygon;

/// How a collider affects the actors that touch it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionKind {
    /// Reports an actor entering on the event bus; changes no velocity.
    Trigger,
    /// Impulse-based bounce off the crossed edge.
    Bounce,
    /// Drags actors inside the polygon to a stop at `stickiness * gravity`.
    Sticky { stickiness: f32 },
}

impl CollisionKind {
    /// Type name used in level records.
    pub fn record_name(&self) -> &'static str {
        match self {
            CollisionKind::Trigger => "trigger",
            CollisionKind::Bounce => "bounce",
            CollisionKind::Sticky { .. } => "sticky",
        }
    }
}

/// Hit region of an actor plus the effect it applies on contact.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    pub polygon: Polygon,
    pub kind: CollisionKind,
    /// Disabled colliders are skipped by the collision pass.
    pub enabled: bool,
    /// Actors currently inside a trigger, so contact is reported on entry only.
    occupants: Vec<ActorId>,
}

impl Collider {
    pub fn new(polygon: Polygon, kind: CollisionKind) -> Self {
        Self { polygon, kind, enabled: true, occupants: Vec::new() }
    }

    pub fn trigger(polygon: Polygon) -> Self {
        Self::new(polygon, CollisionKind::Trigger)
    }

    pub fn bounce(polygon: Polygon) -> Self {
        Self::new(polygon, CollisionKind::Bounce)
    }

    pub fn sticky(polygon: Polygon, stickiness: f32) -> Self {
        Self::new(polygon, CollisionKind::Sticky { stickiness })
    }

    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    pub fn occupants(&self) -> &[ActorId] {
        &self.occupants
    }

    /// Record whether `actor` is inside. Returns true when it just entered.
    pub(crate) fn track(&mut self, actor: ActorId, inside: bool) -> bool {
        let known = self.occupants.iter().position(|id| *id == actor);
        match (inside, known) {
            (true, None) => {
                self.occupants.push(actor);
                true
            }
            (false, Some(i)) => {
                self.occupants.swap_remove(i);
                false
            }
            _ => false,
        }
    }

    pub(crate) fn forget(&mut self, actor: ActorId) {
        self.occupants.retain(|id| *id != actor);
    }

    /// Forget every occupant; a re-enabled trigger reports everyone inside again.
    pub(crate) fn clear_occupants(&mut self) {
        self.occupants.clear();
    }
}
