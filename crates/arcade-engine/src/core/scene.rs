use crate::api::types::ActorId;
use crate::components::actor::Actor;
use crate::core::physics::{self, PhysicsContext};
use crate::renderer::traits::{DrawSurface, Renderable};

/// The active actor list of one game, stored in a flat Vec.
/// Designed for small actor counts (tens to hundreds); collision checks are
/// linear scans over it.
pub struct Scene {
    actors: Vec<Actor>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Create a scene with a specific actor capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            actors: Vec::with_capacity(capacity),
            next_id: 1,
        }
    }

    /// Generate the next unique actor ID. Saturates at `u32::MAX`.
    pub fn next_id(&mut self) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Add an actor to the scene. Update order is insertion order.
    pub fn spawn(&mut self, actor: Actor) -> ActorId {
        let id = actor.id;
        self.next_id = self.next_id.max(id.0.saturating_add(1));
        self.actors.push(actor);
        id
    }

    /// Remove an actor by ID, keeping the order of the rest. Triggers forget it.
    pub fn despawn(&mut self, id: ActorId) -> Option<Actor> {
        let idx = self.actors.iter().position(|a| a.id == id)?;
        for collider in self.actors.iter_mut().filter_map(|a| a.collider.as_mut()) {
            collider.forget(id);
        }
        Some(self.actors.remove(idx))
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.iter_mut()
    }

    /// Find the first actor with the given tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<&Actor> {
        self.actors.iter().find(|a| a.tag == tag)
    }

    pub fn find_by_tag_mut(&mut self, tag: &str) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.tag == tag)
    }

    /// Find all actors with the given tag.
    pub fn find_all_by_tag(&self, tag: &str) -> Vec<&Actor> {
        self.actors.iter().filter(|a| a.tag == tag).collect()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Remove every actor (game reset). IDs keep counting up.
    pub fn clear(&mut self) {
        self.actors.clear();
    }

    /// One logic tick: integrate every actor in list order, then resolve each
    /// enabled collider against every collider-less actor.
    /// Returns how many contacts moved an actor.
    pub fn update(&mut self, delta_ms: f32, ctx: &PhysicsContext) -> usize {
        for actor in &mut self.actors {
            actor.update(delta_ms);
        }

        let mut corrected = 0;
        for i in 0..self.actors.len() {
            if !self.actors[i].collider.as_ref().is_some_and(|c| c.enabled) {
                continue;
            }
            for j in 0..self.actors.len() {
                if i == j || self.actors[j].collider.is_some() {
                    continue;
                }
                let (body, other) = pair_mut(&mut self.actors, i, j);
                if physics::collide(body, other, delta_ms, ctx) {
                    corrected += 1;
                }
            }
        }
        corrected
    }

    /// Actors sorted back-to-front.
    pub fn draw_list(&self) -> Vec<&Actor> {
        let mut list: Vec<&Actor> = self.actors.iter().collect();
        list.sort_by(|a, b| a.draw_order(b));
        list
    }

    /// Paint every visible actor in draw order.
    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        for actor in self.draw_list() {
            actor.draw(surface);
        }
    }

    /// Outline every collider; for level editors and debugging.
    pub fn draw_colliders(&self, surface: &mut dyn DrawSurface) {
        for actor in &self.actors {
            if let Some(collider) = &actor.collider {
                surface.draw_polygon(&collider.polygon, collider.enabled);
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Two distinct mutable elements of a slice.
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
