use std::cmp::Ordering;

use glam::Vec2;

use crate::api::types::ActorId;
use crate::components::collider::Collider;
use crate::components::sprite::SpriteComponent;

/// Fat Actor: one struct with optional capabilities.
///
/// Every actor has a transform and a point-mass body. A `collider` makes it
/// collision geometry (bounce, sticky or trigger); a `sprite` makes it
/// visible. Capabilities are composed, so a sticky surface can also be
/// switched off or drawn without a dedicated type for each combination.
#[derive(Debug, Clone)]
pub struct Actor {
    /// Unique identifier.
    pub id: ActorId,
    /// String tag for finding actors by name.
    pub tag: String,
    /// Position in world space.
    pub position: Vec2,
    /// Position at the start of the current tick, used for swept collision tests.
    pub position_before_frame: Vec2,
    /// World units per second.
    pub velocity: Vec2,
    pub scale: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    pub alpha: f32,
    pub hidden: bool,
    /// Lower z draws first (behind).
    pub z_index: i32,
    /// Bounciness: 0 = no bounce, 1 = perfectly elastic.
    pub restitution: f32,
    /// `1 / mass`; 0 encodes an immovable body.
    pub inverse_mass: f32,
    /// Whether `update` integrates velocity. Static geometry opts out.
    pub moves: bool,
    pub collider: Option<Collider>,
    pub sprite: Option<SpriteComponent>,
    /// Type name used for level records; `None` means the actor is not persisted.
    pub record_type: Option<String>,
}

impl Actor {
    /// Create a unit-mass actor at the origin.
    pub fn new(id: ActorId) -> Self {
        Self {
            id,
            tag: String::new(),
            position: Vec2::ZERO,
            position_before_frame: Vec2::ZERO,
            velocity: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
            alpha: 1.0,
            hidden: false,
            z_index: 0,
            restitution: 1.0,
            inverse_mass: 1.0,
            moves: true,
            collider: None,
            sprite: None,
            record_type: None,
        }
    }

    /// Create immovable collision geometry. The actor sits at the polygon's centre.
    pub fn fixture(id: ActorId, collider: Collider) -> Self {
        let center = collider.polygon.center();
        Self {
            position: center,
            position_before_frame: center,
            inverse_mass: 0.0,
            moves: false,
            collider: Some(collider),
            ..Self::new(id)
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Place the actor; also resets `position_before_frame` so the first
    /// tick does not sweep from the origin.
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.set_position(position);
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set the mass; `f32::INFINITY` (or any non-positive value) makes the actor immovable.
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.inverse_mass = if mass.is_finite() && mass > 0.0 { 1.0 / mass } else { 0.0 };
        self
    }

    pub fn with_sprite(mut self, sprite: SpriteComponent) -> Self {
        self.sprite = Some(sprite);
        self
    }

    pub fn with_record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    /// Teleport: moves the collider along and forgets the previous position.
    pub fn set_position(&mut self, position: Vec2) {
        let delta = position - self.position;
        self.position = position;
        self.position_before_frame = position;
        if let Some(collider) = &mut self.collider {
            collider.polygon.translate(delta);
        }
    }

    pub fn is_immovable(&self) -> bool {
        self.inverse_mass == 0.0
    }

    /// Advance one tick: remember where we started, then integrate velocity.
    pub fn update(&mut self, delta_ms: f32) {
        self.position_before_frame = self.position;
        if !self.moves {
            return;
        }
        let step = self.velocity * (delta_ms / 1000.0);
        if step == Vec2::ZERO {
            return;
        }
        self.position += step;
        if let Some(collider) = &mut self.collider {
            collider.polygon.translate(step);
        }
    }

    /// Draw order: `z_index` ascending, then `position.y` ascending, so
    /// actors higher on screen are painted first.
    pub fn draw_order(&self, other: &Actor) -> Ordering {
        self.z_index
            .cmp(&other.z_index)
            .then_with(|| self.position.y.total_cmp(&other.position.y))
    }
}
