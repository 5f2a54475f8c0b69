use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wgpu::util::DeviceExt;

use crate::sprite::{Renderable, RenderableRef};

use super::ctx::RenderCtx;
use super::texture::TextureHandle;
use super::vertex::{quad_indices, SpriteVertex, CORNER_OFFSETS, INDICES_PER_SPRITE, VERTICES_PER_SPRITE};
use super::z_index::ZIndex;

/// Distinct textures one batch can bind in a single draw.
pub const MAX_BATCH_TEXTURES: usize = 16;

/// Resources owned by the [`Renderer`](super::Renderer) that every batch
/// draws with.
pub(crate) struct BatchShared<'a> {
    pub texture_layout: &'a wgpu::BindGroupLayout,
    pub sampler: &'a wgpu::Sampler,
    pub fallback: &'a wgpu::TextureView,
}

struct BatchGpu {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    textures: Option<wgpu::BindGroup>,
}

/// Fixed-capacity group of sprites sharing one z-index, drawn with one call.
///
/// Slots are assigned in insertion order and never move. Removing a sprite
/// leaves a tombstone (a zero-area quad) in its slot; the slot is not reused.
pub struct RenderBatch {
    max_sprites: usize,
    z_index: ZIndex,

    slots: Vec<Option<RenderableRef>>,
    live: usize,
    textures: Vec<TextureHandle>,

    vertices: Vec<SpriteVertex>,
    upload_pending: bool,
    textures_changed: bool,

    gpu: Option<BatchGpu>,
}

impl RenderBatch {
    pub fn new(max_sprites: usize, z_index: ZIndex) -> Self {
        Self {
            max_sprites,
            z_index,
            slots: Vec::with_capacity(max_sprites),
            live: 0,
            textures: Vec::with_capacity(MAX_BATCH_TEXTURES),
            vertices: vec![SpriteVertex::default(); max_sprites * VERTICES_PER_SPRITE],
            upload_pending: false,
            textures_changed: false,
            gpu: None,
        }
    }

    /// Allocates the GPU vertex buffer and the static index buffer.
    ///
    /// Idempotent. The current CPU contents are uploaded on the next render.
    pub fn start(&mut self, device: &wgpu::Device) {
        if self.gpu.is_some() {
            return;
        }

        let vbo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("mosaic batch vbo"),
            size: std::mem::size_of_val(self.vertices.as_slice()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mosaic batch ibo"),
            contents: bytemuck::cast_slice(&quad_indices(self.max_sprites)),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!(
            "batch z={} started: {} slots, {} vertex bytes",
            self.z_index.get(),
            self.max_sprites,
            vbo.size()
        );

        self.gpu = Some(BatchGpu {
            vbo,
            ibo,
            textures: None,
        });
        self.upload_pending = true;
        self.textures_changed = true;
    }

    pub fn is_started(&self) -> bool {
        self.gpu.is_some()
    }

    /// Puts `renderable` in the next free slot and returns the slot index.
    ///
    /// A full batch hands the renderable back. Callers check
    /// [`has_texture`](Self::has_texture) / [`has_texture_room`](Self::has_texture_room)
    /// first; a texture that does not fit is dropped and the sprite drawn
    /// untextured.
    pub fn add_renderable(&mut self, renderable: RenderableRef) -> Result<usize, RenderableRef> {
        if !self.has_room() {
            return Err(renderable);
        }

        let slot = self.slots.len();
        self.write_slot(slot, &*renderable.borrow());

        self.slots.push(Some(renderable));
        self.live += 1;
        self.upload_pending = true;
        Ok(slot)
    }

    /// Tombstones the slot holding `renderable`. Returns `false` if it is not
    /// in this batch.
    pub fn remove<R: Renderable + ?Sized>(&mut self, renderable: &Rc<RefCell<R>>) -> bool {
        let target = Rc::as_ptr(renderable) as *const ();
        let Some(slot) = self.slots.iter().position(|s| {
            s.as_ref()
                .is_some_and(|r| Rc::as_ptr(r) as *const () == target)
        }) else {
            return false;
        };

        self.slots[slot] = None;
        self.live -= 1;
        let start = slot * VERTICES_PER_SPRITE;
        self.vertices[start..start + VERTICES_PER_SPRITE].fill(SpriteVertex::default());
        self.upload_pending = true;
        true
    }

    pub fn contains<R: Renderable + ?Sized>(&self, renderable: &Rc<RefCell<R>>) -> bool {
        let target = Rc::as_ptr(renderable) as *const ();
        self.slots
            .iter()
            .flatten()
            .any(|r| Rc::as_ptr(r) as *const () == target)
    }

    /// Rewrites every dirty slot and clears its dirty flag.
    ///
    /// Returns `true` if the CPU buffer differs from the GPU copy. A
    /// renderable that is mutably borrowed elsewhere is skipped and stays
    /// dirty until the next call.
    pub fn refresh(&mut self) -> bool {
        for slot in 0..self.slots.len() {
            let Some(rc) = self.slots[slot].clone() else { continue };
            let Ok(mut r) = rc.try_borrow_mut() else {
                log::warn!(
                    "batch z={}: slot {slot} is borrowed during refresh; skipped",
                    self.z_index.get()
                );
                continue;
            };
            if r.is_dirty() {
                self.write_slot(slot, &*r);
                r.set_clean();
                self.upload_pending = true;
            }
        }
        self.upload_pending
    }

    /// Refreshes, uploads if needed, and records one indexed draw into `pass`.
    ///
    /// Expects the sprite pipeline and uniform group 0 to be bound already.
    pub(crate) fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        pass: &mut wgpu::RenderPass<'_>,
        shared: &BatchShared<'_>,
    ) {
        self.start(ctx.device);
        let stale = self.refresh();

        let Some(gpu) = self.gpu.as_mut() else { return };

        if stale {
            ctx.queue
                .write_buffer(&gpu.vbo, 0, bytemuck::cast_slice(&self.vertices));
            self.upload_pending = false;
        }

        if self.textures_changed || gpu.textures.is_none() {
            gpu.textures = Some(texture_bind_group(ctx.device, &self.textures, shared));
            self.textures_changed = false;
        }

        if self.slots.is_empty() {
            return;
        }
        let Some(textures) = gpu.textures.as_ref() else { return };

        let index_count = (self.slots.len() * INDICES_PER_SPRITE) as u32;
        pass.set_bind_group(1, textures, &[]);
        pass.set_vertex_buffer(0, gpu.vbo.slice(..));
        pass.set_index_buffer(gpu.ibo.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..index_count, 0, 0..1);
    }

    // ── queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn has_room(&self) -> bool {
        self.slots.len() < self.max_sprites
    }

    #[inline]
    pub fn has_texture_room(&self) -> bool {
        self.textures.len() < MAX_BATCH_TEXTURES
    }

    pub fn has_texture(&self, texture: &TextureHandle) -> bool {
        self.textures.contains(texture)
    }

    /// Texture slot value written into vertices: `1 + index`, or `None`.
    pub fn texture_slot(&self, texture: &TextureHandle) -> Option<u32> {
        self.textures
            .iter()
            .position(|t| t == texture)
            .map(|i| i as u32 + 1)
    }

    #[inline]
    pub fn z_index(&self) -> ZIndex {
        self.z_index
    }

    #[inline]
    pub fn max_sprites(&self) -> usize {
        self.max_sprites
    }

    /// Live (non-removed) sprites.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Occupied slots, tombstones included. Sizes the draw call.
    #[inline]
    pub fn slots(&self) -> usize {
        self.slots.len()
    }

    pub fn textures(&self) -> &[TextureHandle] {
        &self.textures
    }

    /// CPU vertex mirror for every slot, occupied or not.
    pub fn vertices(&self) -> &[SpriteVertex] {
        &self.vertices
    }

    /// Texture unit for `texture`, registering it while the set has room.
    /// A texture that does not fit draws untextured (unit 0).
    fn register_texture(&mut self, slot: usize, texture: &TextureHandle) -> u32 {
        if let Some(unit) = self.texture_slot(texture) {
            return unit;
        }
        if !self.has_texture_room() {
            log::warn!(
                "batch z={}: texture set full, sprite in slot {slot} drawn untextured",
                self.z_index.get()
            );
            return 0;
        }
        self.textures.push(texture.clone());
        self.textures_changed = true;
        self.textures.len() as u32
    }

    fn write_slot(&mut self, slot: usize, r: &dyn Renderable) {
        let tex_slot = match r.texture() {
            Some(texture) => self.register_texture(slot, texture),
            None => 0,
        };
        let start = slot * VERTICES_PER_SPRITE;
        self.vertices[start..start + VERTICES_PER_SPRITE].copy_from_slice(&pack_quad(r, tex_slot));
    }
}

/// Vertices for one sprite: `position + corner * scale` per corner.
fn pack_quad(r: &dyn Renderable, tex_slot: u32) -> [SpriteVertex; VERTICES_PER_SPRITE] {
    let position = r.position();
    let scale = r.scale();
    let color = r.color().to_array();
    let uvs = r.tex_coords();

    std::array::from_fn(|i| SpriteVertex {
        position: (position + Vec2::from(CORNER_OFFSETS[i]) * scale).to_array(),
        color,
        uv: uvs[i].to_array(),
        tex_slot: tex_slot as f32,
    })
}

fn texture_bind_group(
    device: &wgpu::Device,
    textures: &[TextureHandle],
    shared: &BatchShared<'_>,
) -> wgpu::BindGroup {
    let views: Vec<&wgpu::TextureView> = (0..MAX_BATCH_TEXTURES)
        .map(|i| {
            textures
                .get(i)
                .and_then(|t| t.view())
                .unwrap_or(shared.fallback)
        })
        .collect();

    let mut entries: Vec<wgpu::BindGroupEntry<'_>> = views
        .iter()
        .enumerate()
        .map(|(i, view)| wgpu::BindGroupEntry {
            binding: i as u32,
            resource: wgpu::BindingResource::TextureView(*view),
        })
        .collect();
    entries.push(wgpu::BindGroupEntry {
        binding: MAX_BATCH_TEXTURES as u32,
        resource: wgpu::BindingResource::Sampler(shared.sampler),
    });

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("mosaic batch textures"),
        layout: shared.texture_layout,
        entries: &entries,
    })
}
