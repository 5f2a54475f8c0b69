use glam::Vec2;

use crate::render::{TextureHandle, CORNER_OFFSETS};

/// Position and size of a sprite in world units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub scale: Vec2,
}

impl Transform {
    pub const fn new(position: Vec2, scale: Vec2) -> Self {
        Self { position, scale }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
        }
    }
}

/// Texture region drawn by a sprite. `texture == None` draws a solid quad.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub texture: Option<TextureHandle>,
    pub tex_coords: [Vec2; 4],
}

impl Sprite {
    /// Whole texture, default UVs.
    pub fn new(texture: TextureHandle) -> Self {
        Self {
            texture: Some(texture),
            ..Self::default()
        }
    }

    pub fn with_coords(texture: TextureHandle, tex_coords: [Vec2; 4]) -> Self {
        Self {
            texture: Some(texture),
            tex_coords,
        }
    }

    /// Untextured sprite.
    pub fn solid() -> Self {
        Self::default()
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            texture: None,
            tex_coords: CORNER_OFFSETS.map(Vec2::from),
        }
    }
}
