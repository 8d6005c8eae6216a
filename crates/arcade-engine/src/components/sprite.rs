use glam::Vec2;

/// Identifies which texture atlas a sprite belongs to.
/// Resolved by the resource collaborator; the engine never decodes images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AtlasId(pub u32);

/// Visual representation an actor delegates to.
///
/// The frame list, anchor and pixel size are supplied by the resource layer;
/// the engine only steps through frames and hands the sprite to a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteComponent {
    pub atlas: AtlasId,
    /// Frame indices within the atlas.
    pub frames: Vec<u32>,
    /// Index into `frames` currently shown.
    pub frame: usize,
    /// Anchor in normalized sprite space ((0.5, 0.5) = centre).
    pub anchor: Vec2,
    /// Size in pixels.
    pub size: Vec2,
}

impl SpriteComponent {
    pub fn new(atlas: AtlasId, frames: Vec<u32>, size: Vec2) -> Self {
        Self {
            atlas,
            frames,
            frame: 0,
            anchor: Vec2::splat(0.5),
            size,
        }
    }

    pub fn with_anchor(mut self, anchor: Vec2) -> Self {
        self.anchor = anchor;
        self
    }

    /// Atlas frame currently shown, if the frame list is non-empty.
    pub fn current_frame(&self) -> Option<u32> {
        self.frames.get(self.frame).copied()
    }

    /// Step to the next frame, wrapping around.
    pub fn advance_frame(&mut self) {
        if !self.frames.is_empty() {
            self.frame = (self.frame + 1) % self.frames.len();
        }
    }
}
