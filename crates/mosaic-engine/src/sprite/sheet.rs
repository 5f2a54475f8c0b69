use glam::Vec2;

use crate::render::TextureHandle;

use super::sprite::Sprite;

/// Evenly spaced sprites cut from one texture.
///
/// Cells are read left to right starting at the top-left corner, wrapping to
/// the next row down once a row is exhausted. `spacing` pixels separate
/// neighbouring cells in both directions.
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    texture: TextureHandle,
    sprites: Vec<Sprite>,
}

impl SpriteSheet {
    pub fn new(
        texture: TextureHandle,
        sprite_width: u32,
        sprite_height: u32,
        count: usize,
        spacing: u32,
    ) -> Self {
        let tex_w = texture.width() as f32;
        let tex_h = texture.height() as f32;
        let (sw, sh) = (sprite_width as f32, sprite_height as f32);
        let spacing = spacing as f32;

        let mut sprites = Vec::with_capacity(count);
        let mut x = 0.0;
        let mut y = tex_h - sh;

        for _ in 0..count {
            let top = (y + sh) / tex_h;
            let right = (x + sw) / tex_w;
            let left = x / tex_w;
            let bottom = y / tex_h;

            sprites.push(Sprite::with_coords(
                texture.clone(),
                [
                    Vec2::new(right, top),
                    Vec2::new(right, bottom),
                    Vec2::new(left, bottom),
                    Vec2::new(left, top),
                ],
            ));

            x += sw + spacing;
            if x >= tex_w {
                x = 0.0;
                y -= sh + spacing;
            }
        }

        log::debug!(
            "sprite sheet: {count} sprites of {sprite_width}x{sprite_height} from texture {}",
            texture.id().get()
        );

        Self { texture, sprites }
    }

    pub fn texture(&self) -> &TextureHandle {
        &self.texture
    }

    pub fn sprite(&self, index: usize) -> Option<&Sprite> {
        self.sprites.get(index)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::render::Texture;

    fn sheet(count: usize, spacing: u32) -> SpriteSheet {
        SpriteSheet::new(Rc::new(Texture::detached(64, 32)), 16, 16, count, spacing)
    }

    #[test]
    fn first_sprite_is_top_left_cell() {
        let s = sheet(1, 0);
        let uv = s.sprite(0).map(|s| s.tex_coords);
        assert_eq!(
            uv,
            Some([
                Vec2::new(0.25, 1.0),
                Vec2::new(0.25, 0.5),
                Vec2::new(0.0, 0.5),
                Vec2::new(0.0, 1.0),
            ])
        );
    }

    #[test]
    fn wraps_to_next_row() {
        let s = sheet(5, 0);
        assert_eq!(s.len(), 5);
        // Fifth cell starts the lower row.
        let uv = s.sprite(4).map(|s| s.tex_coords[2]);
        assert_eq!(uv, Some(Vec2::new(0.0, 0.0)));
        let last_top = s.sprite(3).map(|s| s.tex_coords[0]);
        assert_eq!(last_top, Some(Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn spacing_offsets_cells() {
        let s = sheet(2, 4);
        let left = s.sprite(1).map(|s| s.tex_coords[2].x);
        assert_eq!(left, Some(20.0 / 64.0));
    }

    #[test]
    fn every_sprite_shares_the_texture() {
        let s = sheet(3, 0);
        assert!(s.iter().all(|sp| sp.texture.as_ref() == Some(s.texture())));
        assert!(s.sprite(3).is_none());
    }
}
