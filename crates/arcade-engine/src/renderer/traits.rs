//! Contracts between the simulation and whatever paints it.
//!
//! The engine never rasterizes anything itself. A platform layer implements
//! [`DrawSurface`] (canvas, GPU batcher, terminal...) and [`RedrawRequest`]
//! (invalidate a view, post to a UI thread...). Painting only reads actor
//! state; it must hold the same model lock the logic thread updates under.

use crate::components::actor::Actor;
use crate::components::sprite::SpriteComponent;
use crate::core::polygon::Polygon;

/// Render target handed to `draw` calls.
pub trait DrawSurface {
    /// Paint `sprite` using the actor's transform (position, rotation, scale, alpha).
    fn draw_sprite(&mut self, actor: &Actor, sprite: &SpriteComponent);

    /// Outline a collision polygon. Debug/editor only; ignored by default.
    fn draw_polygon(&mut self, _polygon: &Polygon, _enabled: bool) {}
}

/// Anything that can paint itself onto a surface.
pub trait Renderable {
    fn draw(&self, surface: &mut dyn DrawSurface);
}

impl Renderable for Actor {
    /// Actors without a sprite draw nothing.
    fn draw(&self, surface: &mut dyn DrawSurface) {
        if self.hidden {
            return;
        }
        if let Some(sprite) = &self.sprite {
            surface.draw_sprite(self, sprite);
        }
    }
}

/// Signal the render driver fires at its own rate. Implementations must be
/// cheap and must not touch simulation state.
pub trait RedrawRequest: Send + Sync {
    fn request_redraw(&self);
}

impl<F> RedrawRequest for F
where
    F: Fn() + Send + Sync,
{
    fn request_redraw(&self) {
        self()
    }
}
