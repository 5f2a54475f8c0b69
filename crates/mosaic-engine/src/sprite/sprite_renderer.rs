use glam::Vec2;

use crate::paint::Color;
use crate::render::{TextureHandle, ZIndex};

use super::renderable::Renderable;
use super::sprite::{Sprite, Transform};

/// Standard [`Renderable`]: a transform, a tint, and a sprite region.
///
/// New renderers start dirty so their first batch write always lands.
#[derive(Debug, Clone)]
pub struct SpriteRenderer {
    transform: Transform,
    color: Color,
    sprite: Sprite,
    z_index: ZIndex,
    dirty: bool,
}

impl SpriteRenderer {
    pub fn new(transform: Transform, sprite: Sprite) -> Self {
        Self {
            transform,
            color: Color::WHITE,
            sprite,
            z_index: ZIndex::default(),
            dirty: true,
        }
    }

    /// Untextured quad in `color`.
    pub fn solid(transform: Transform, color: Color) -> Self {
        Self::new(transform, Sprite::solid()).with_color(color)
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Z-index is fixed once the renderer is registered; set it up front.
    pub fn with_z_index(mut self, z: impl Into<ZIndex>) -> Self {
        self.z_index = z.into();
        self
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    pub fn set_transform(&mut self, transform: Transform) {
        if self.transform != transform {
            self.transform = transform;
            self.dirty = true;
        }
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.set_transform(Transform { position, ..self.transform });
    }

    pub fn set_color(&mut self, color: Color) {
        if self.color != color {
            self.color = color;
            self.dirty = true;
        }
    }

    pub fn set_sprite(&mut self, sprite: Sprite) {
        self.sprite = sprite;
        self.dirty = true;
    }

    /// Forces a rewrite on the next render.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

impl Renderable for SpriteRenderer {
    fn position(&self) -> Vec2 {
        self.transform.position
    }

    fn scale(&self) -> Vec2 {
        self.transform.scale
    }

    fn color(&self) -> Color {
        self.color
    }

    fn texture(&self) -> Option<&TextureHandle> {
        self.sprite.texture.as_ref()
    }

    fn tex_coords(&self) -> [Vec2; 4] {
        self.sprite.tex_coords
    }

    fn z_index(&self) -> ZIndex {
        self.z_index
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn set_clean(&mut self) {
        self.dirty = false;
    }
}
