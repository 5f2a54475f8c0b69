//! Procedural stand-ins for the editor's sprite art.

use std::rc::Rc;

use anyhow::Result;
use mosaic_engine::render::Texture;
use mosaic_engine::sprite::SpriteSheet;

pub const CELL: u32 = 16;
pub const COLUMNS: u32 = 4;
pub const ROWS: u32 = 2;

/// Base color of each cell, row-major from the top-left.
const PALETTE: [[u8; 3]; (COLUMNS * ROWS) as usize] = [
    [0x6a, 0xbe, 0x30], // grass
    [0x8f, 0x56, 0x3b], // dirt
    [0x84, 0x7e, 0x87], // stone
    [0xdf, 0x71, 0x26], // brick
    [0x5b, 0x6e, 0xe1], // water
    [0xfb, 0xf2, 0x36], // coin
    [0xd9, 0x57, 0x63], // player
    [0x76, 0x42, 0x8a], // enemy
];

/// RGBA pixels of the sheet: a checkered cell per palette entry with a
/// darker one-pixel border.
pub fn sheet_pixels() -> Vec<u8> {
    let width = CELL * COLUMNS;
    let height = CELL * ROWS;
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);

    for y in 0..height {
        for x in 0..width {
            let cell = (y / CELL) * COLUMNS + x / CELL;
            let [r, g, b] = PALETTE[cell as usize];
            let (cx, cy) = (x % CELL, y % CELL);

            let shade = if cx == 0 || cy == 0 || cx == CELL - 1 || cy == CELL - 1 {
                0.55
            } else if (cx / 4 + cy / 4) % 2 == 0 {
                1.0
            } else {
                0.85
            };
            let s = |c: u8| (c as f32 * shade) as u8;
            pixels.extend_from_slice(&[s(r), s(g), s(b), 0xff]);
        }
    }
    pixels
}

pub fn load_sheet(device: &wgpu::Device, queue: &wgpu::Queue) -> Result<SpriteSheet> {
    let texture = Texture::from_rgba(
        device,
        queue,
        "studio tiles",
        CELL * COLUMNS,
        CELL * ROWS,
        &sheet_pixels(),
    )?;
    Ok(SpriteSheet::new(
        Rc::new(texture),
        CELL,
        CELL,
        (COLUMNS * ROWS) as usize,
        0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
        let i = ((y * CELL * COLUMNS + x) * 4) as usize;
        [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
    }

    #[test]
    fn sheet_has_exact_byte_length() {
        assert_eq!(sheet_pixels().len(), (CELL * COLUMNS * CELL * ROWS * 4) as usize);
    }

    #[test]
    fn cells_use_their_palette_entry() {
        let px = sheet_pixels();
        assert_eq!(pixel(&px, 2, 2), [0x6a, 0xbe, 0x30, 0xff]);
        // Second row, second column: coin.
        assert_eq!(pixel(&px, CELL + 2, CELL + 2), [0xfb, 0xf2, 0x36, 0xff]);
    }

    #[test]
    fn borders_are_darker() {
        let px = sheet_pixels();
        let border = pixel(&px, 0, 5);
        let inner = pixel(&px, 2, 2);
        assert!(border[0] < inner[0] && border[3] == 0xff);
    }
}
