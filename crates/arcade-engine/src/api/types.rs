use bytemuck::{Pod, Zeroable};

/// Unique identifier for an actor in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u32);

/// A sound-effect request. The numeric value maps to a game-defined sound
/// in whatever audio collaborator subscribes to the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SoundEvent(pub u32);

impl SoundEvent {
    /// Generic "something hit a wall hard" sound.
    pub const IMPACT: SoundEvent = SoundEvent(1);
}

/// A score/state notification from the simulation to the UI layer.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;

    /// Emitted by trigger colliders: `a` = collider id, `b` = other actor id.
    pub const CONTACT: f32 = 1.0;

    pub fn new(kind: f32, a: f32, b: f32, c: f32) -> Self {
        Self { kind, a, b, c }
    }

    pub fn contact(collider: ActorId, other: ActorId) -> Self {
        Self::new(Self::CONTACT, collider.0 as f32, other.0 as f32, 0.0)
    }

    /// View a batch of events as the flat float layout a UI bridge reads.
    pub fn as_floats(events: &[GameEvent]) -> &[f32] {
        bytemuck::cast_slice(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_flatten_to_four_floats_each() {
        let events = [
            GameEvent::new(2.0, 1.0, 0.0, 0.0),
            GameEvent::contact(ActorId(3), ActorId(9)),
        ];
        let flat = GameEvent::as_floats(&events);
        assert_eq!(flat.len(), 2 * GameEvent::FLOATS);
        assert_eq!(flat[4], GameEvent::CONTACT);
        assert_eq!(flat[5], 3.0);
        assert_eq!(flat[6], 9.0);
    }
}
