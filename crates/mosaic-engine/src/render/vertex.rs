//! Vertex formats and the static quad index pattern.

use bytemuck::{Pod, Zeroable};

/// Vertices emitted per sprite quad.
pub const VERTICES_PER_SPRITE: usize = 4;

/// Indices emitted per sprite quad (two triangles).
pub const INDICES_PER_SPRITE: usize = 6;

/// Multipliers applied to a sprite's scale for corners 0..3, in the sprite's
/// local unit square. The index pattern below relies on this order.
pub const CORNER_OFFSETS: [[f32; 2]; VERTICES_PER_SPRITE] =
    [[1.0, 1.0], [1.0, 0.0], [0.0, 0.0], [0.0, 1.0]];

/// One sprite corner: position, premultiplied color, uv, texture slot.
///
/// `tex_slot == 0.0` means untextured; `n > 0` samples the batch's texture
/// bound at unit `n`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
    pub uv: [f32; 2],
    pub tex_slot: f32,
}

impl SpriteVertex {
    /// Floats per vertex.
    pub const FLOATS: usize = 9;

    const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x4, // color
        2 => Float32x2, // uv
        3 => Float32    // tex slot
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// One debug-line endpoint.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl LineVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3  // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Index pattern for `max_sprites` quads: `{3, 2, 0}` and `{0, 2, 1}` offset
/// by `4 * slot`. Depends only on the slot, never on sprite content.
pub fn quad_indices(max_sprites: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(max_sprites * INDICES_PER_SPRITE);
    for slot in 0..max_sprites {
        let base = (slot * VERTICES_PER_SPRITE) as u32;
        indices.extend_from_slice(&[base + 3, base + 2, base, base, base + 2, base + 1]);
    }
    indices
}
