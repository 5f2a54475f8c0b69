use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use anyhow::{Context, Result};

use crate::camera::Camera;
use crate::sprite::{Renderable, RenderableRef};

use super::batch::{BatchShared, RenderBatch, MAX_BATCH_TEXTURES};
use super::common::{build_pipeline, PipelineSpec};
use super::ctx::{RenderCtx, RenderTarget, TargetFormats};
use super::shader::Shader;
use super::texture::Texture;
use super::uniforms::{UniformField, UniformKind};
use super::vertex::SpriteVertex;
use super::z_index::ZIndex;

const SPRITE_SHADER: &str = include_str!("shaders/sprite.wgsl");

pub(crate) const SPRITE_UNIFORMS: &[UniformField] = &[
    UniformField { name: "u_projection", kind: UniformKind::Mat4, offset: 0 },
    UniformField { name: "u_view", kind: UniformKind::Mat4, offset: 64 },
    UniformField {
        name: "u_textures",
        kind: UniformKind::IntArray(MAX_BATCH_TEXTURES),
        offset: 128,
    },
];

/// Texture units referenced by vertex slots 1..=16.
const TEXTURE_UNITS: [i32; MAX_BATCH_TEXTURES] =
    [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];

#[derive(Debug, Copy, Clone)]
pub struct RendererConfig {
    /// Sprite slots per batch.
    pub max_batch_size: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self { max_batch_size: 1000 }
    }
}

/// GPU objects shared by every batch, created on the first render.
struct SpriteGpu {
    shader: Shader,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    fallback: Texture,
}

/// Routes renderables into z-ordered batches and draws them.
///
/// Batches are kept sorted by z-index; batches with equal z keep their
/// creation order. Drawing walks them front to back of that list.
pub struct Renderer {
    config: RendererConfig,
    batches: Vec<RenderBatch>,
    /// Identities of every registered renderable; each sits in one slot.
    registered: HashSet<*const ()>,

    gpu: Option<SpriteGpu>,
    pipelines: HashMap<TargetFormats, wgpu::RenderPipeline>,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        let config = RendererConfig {
            max_batch_size: config.max_batch_size.max(1),
        };
        Self {
            config,
            batches: Vec::new(),
            registered: HashSet::new(),
            gpu: None,
            pipelines: HashMap::new(),
        }
    }

    pub fn config(&self) -> RendererConfig {
        self.config
    }

    /// Places `renderable` in the first batch with matching z-index, a free
    /// slot, and room for its texture; creates a batch otherwise.
    ///
    /// Returns `false` if `renderable` is already registered.
    pub fn add(&mut self, renderable: RenderableRef) -> bool {
        let key = identity(&renderable);
        if !self.registered.insert(key) {
            log::warn!("renderable {key:p} is already registered; ignored");
            return false;
        }

        let (z, texture) = {
            let r = renderable.borrow();
            (r.z_index(), r.texture().cloned())
        };

        let fits = |b: &RenderBatch| {
            b.z_index() == z
                && b.has_room()
                && texture
                    .as_ref()
                    .is_none_or(|t| b.has_texture(t) || b.has_texture_room())
        };

        let renderable = match self.batches.iter_mut().find(|b| fits(b)) {
            Some(batch) => match batch.add_renderable(renderable) {
                Ok(_) => return true,
                Err(back) => back,
            },
            None => renderable,
        };

        let mut batch = RenderBatch::new(self.config.max_batch_size, z);
        if batch.add_renderable(renderable).is_err() {
            // max_batch_size >= 1, so a fresh batch always has room.
            log::warn!("fresh batch rejected a renderable at z={}", z.get());
            self.registered.remove(&key);
            return false;
        }
        self.insert_batch(batch);
        true
    }

    /// Stable insert: after every batch with z <= the new batch's z.
    fn insert_batch(&mut self, batch: RenderBatch) {
        let z = batch.z_index();
        let at = self.batches.partition_point(|b| b.z_index() <= z);
        log::debug!(
            "new batch z={} at position {at} ({} batches)",
            z.get(),
            self.batches.len() + 1
        );
        self.batches.insert(at, batch);
    }

    /// Unregisters `renderable`. Batches left without live sprites are
    /// dropped, releasing their GPU buffers and texture references.
    pub fn remove<R: Renderable + ?Sized>(&mut self, renderable: &Rc<RefCell<R>>) -> bool {
        if !self.registered.remove(&identity(renderable)) {
            return false;
        }
        let Some(i) = self.batches.iter_mut().position(|b| b.remove(renderable)) else {
            return false;
        };
        if self.batches[i].is_empty() {
            let batch = self.batches.remove(i);
            log::debug!("batch z={} emptied and dropped", batch.z_index().get());
        }
        true
    }

    /// Batches in draw order.
    pub fn batches(&self) -> &[RenderBatch] {
        &self.batches
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn sprite_count(&self) -> usize {
        self.batches.iter().map(RenderBatch::len).sum()
    }

    /// Z-index of each batch, in draw order.
    pub fn z_order(&self) -> impl Iterator<Item = ZIndex> + '_ {
        self.batches.iter().map(RenderBatch::z_index)
    }

    /// Draws every batch into `target` on top of its current contents.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        camera: &mut Camera,
    ) -> Result<()> {
        if self.batches.is_empty() {
            return Ok(());
        }

        self.ensure_shared(ctx)?;
        let formats = target.format_key();
        self.ensure_pipeline(ctx, formats);

        let (Some(gpu), Some(pipeline)) = (self.gpu.as_mut(), self.pipelines.get(&formats)) else {
            return Ok(());
        };

        gpu.shader.upload_mat4("u_projection", &camera.projection());
        gpu.shader.upload_mat4("u_view", &camera.view());
        gpu.shader.upload_int_array("u_textures", &TEXTURE_UNITS);

        let mut pass = target.begin_load_pass("mosaic sprites");
        pass.set_pipeline(pipeline);
        gpu.shader.use_program(ctx, &mut pass);

        let Some(fallback) = gpu.fallback.view() else {
            return Ok(());
        };
        let shared = BatchShared {
            texture_layout: &gpu.texture_layout,
            sampler: &gpu.sampler,
            fallback,
        };

        for batch in &mut self.batches {
            batch.render(ctx, &mut pass, &shared);
        }

        drop(pass);
        gpu.shader.detach();
        Ok(())
    }

    // ── GPU resources ─────────────────────────────────────────────────────

    fn ensure_shared(&mut self, ctx: &RenderCtx<'_>) -> Result<()> {
        if self.gpu.is_some() {
            return Ok(());
        }

        let shader = Shader::compile(ctx.device, "mosaic sprite shader", SPRITE_SHADER, SPRITE_UNIFORMS)?;

        let mut entries: Vec<wgpu::BindGroupLayoutEntry> = (0..MAX_BATCH_TEXTURES as u32)
            .map(|binding| wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            })
            .collect();
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: MAX_BATCH_TEXTURES as u32,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });

        let texture_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mosaic batch texture layout"),
            entries: &entries,
        });

        // Pixel art: nearest filtering, clamped edges.
        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("mosaic sprite sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let fallback = Texture::from_rgba(ctx.device, ctx.queue, "mosaic white", 1, 1, &[255; 4])
            .context("creating fallback texture")?;

        self.gpu = Some(SpriteGpu {
            shader,
            texture_layout,
            sampler,
            fallback,
        });
        Ok(())
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, formats: TargetFormats) {
        if self.pipelines.contains_key(&formats) {
            return;
        }
        let Some(gpu) = self.gpu.as_ref() else { return };

        let pipeline = build_pipeline(
            ctx.device,
            PipelineSpec {
                label: "mosaic sprite pipeline",
                module: gpu.shader.module(),
                bind_group_layouts: &[gpu.shader.uniform_layout(), &gpu.texture_layout],
                vertex_layout: SpriteVertex::layout(),
                topology: wgpu::PrimitiveTopology::TriangleList,
            },
            formats,
        );
        log::debug!("sprite pipeline built for {formats:?}");
        self.pipelines.insert(formats, pipeline);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

fn identity<R: Renderable + ?Sized>(renderable: &Rc<RefCell<R>>) -> *const () {
    Rc::as_ptr(renderable) as *const ()
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::paint::Color;
    use crate::render::TextureHandle;
    use crate::sprite::{Sprite, SpriteRenderer, Transform};

    fn renderer(max: usize) -> Renderer {
        Renderer::new(RendererConfig { max_batch_size: max })
    }

    fn solid(z: i32) -> Rc<RefCell<SpriteRenderer>> {
        Rc::new(RefCell::new(
            SpriteRenderer::solid(Transform::default(), Color::WHITE).with_z_index(z),
        ))
    }

    fn textured(tex: &TextureHandle, z: i32) -> Rc<RefCell<SpriteRenderer>> {
        Rc::new(RefCell::new(
            SpriteRenderer::new(Transform::default(), Sprite::new(tex.clone())).with_z_index(z),
        ))
    }

    fn tex() -> TextureHandle {
        Rc::new(Texture::detached(4, 4))
    }

    fn batch_sizes(r: &Renderer) -> Vec<usize> {
        r.batches().iter().map(RenderBatch::len).collect()
    }

    // ── allocation ────────────────────────────────────────────────────────

    #[test]
    fn overflow_creates_second_batch_at_same_z() {
        let mut r = renderer(2);
        for _ in 0..3 {
            r.add(solid(0));
        }
        assert_eq!(r.batch_count(), 2);
        assert_eq!(batch_sizes(&r), vec![2, 1]);
        assert!(r.z_order().all(|z| z == ZIndex(0)));
    }

    #[test]
    fn seventeen_textures_need_two_batches() {
        let mut r = renderer(100);
        for _ in 0..17 {
            r.add(textured(&tex(), 0));
        }
        assert_eq!(r.batch_count(), 2);
        assert_eq!(batch_sizes(&r), vec![16, 1]);
        assert_eq!(r.batches()[0].textures().len(), MAX_BATCH_TEXTURES);
    }

    #[test]
    fn shared_texture_packs_into_one_batch() {
        let mut r = renderer(100);
        let t = tex();
        for _ in 0..50 {
            r.add(textured(&t, 0));
        }
        assert_eq!(r.batch_count(), 1);
        assert_eq!(r.batches()[0].textures().len(), 1);
    }

    #[test]
    fn known_texture_fits_a_texture_full_batch() {
        let mut r = renderer(100);
        let first = tex();
        r.add(textured(&first, 0));
        for _ in 0..15 {
            r.add(textured(&tex(), 0));
        }
        assert_eq!(r.batch_count(), 1);
        r.add(textured(&first, 0));
        r.add(solid(0));
        assert_eq!(r.batch_count(), 1);
        assert_eq!(r.sprite_count(), 18);
    }

    #[test]
    fn first_fit_prefers_earlier_batch() {
        let mut r = renderer(100);
        for _ in 0..17 {
            r.add(textured(&tex(), 0));
        }
        // The first batch is texture-full but still has slot room.
        r.add(solid(0));
        assert_eq!(batch_sizes(&r), vec![17, 1]);
    }

    #[test]
    fn every_renderable_lands_in_a_matching_batch() {
        let mut r = renderer(3);
        let zs = [5, -2, 0, 5, 5, 5, -2, 7, 0, 5];
        let items: Vec<_> = zs.iter().map(|&z| solid(z)).collect();
        for item in &items {
            r.add(item.clone());
        }

        for (item, &z) in items.iter().zip(&zs) {
            let owners: Vec<&RenderBatch> =
                r.batches().iter().filter(|b| b.contains(item)).collect();
            assert_eq!(owners.len(), 1);
            assert_eq!(owners[0].z_index(), ZIndex(z));
        }
        assert!(r.batches().iter().all(|b| b.len() <= 3));
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn batches_sorted_by_z() {
        let mut r = renderer(10);
        for z in [3, -1, 7, 0, 3] {
            r.add(solid(z));
        }
        let order: Vec<i32> = r.z_order().map(ZIndex::get).collect();
        assert_eq!(order, vec![-1, 0, 3, 7]);
    }

    #[test]
    fn equal_z_batches_keep_creation_order() {
        let mut r = renderer(1);
        let a = solid(1);
        let b = solid(1);
        r.add(solid(2));
        r.add(a.clone());
        r.add(solid(0));
        r.add(b.clone());

        let order: Vec<i32> = r.z_order().map(ZIndex::get).collect();
        assert_eq!(order, vec![0, 1, 1, 2]);
        assert!(r.batches()[1].contains(&a));
        assert!(r.batches()[2].contains(&b));
    }

    // ── removal ───────────────────────────────────────────────────────────

    #[test]
    fn remove_drops_emptied_batch() {
        let mut r = renderer(2);
        let a = solid(0);
        let b = solid(4);
        r.add(a.clone());
        r.add(b.clone());
        assert_eq!(r.batch_count(), 2);

        assert!(r.remove(&b));
        assert_eq!(r.batch_count(), 1);
        assert!(!r.remove(&b));
        assert_eq!(r.sprite_count(), 1);
    }

    #[test]
    fn remove_keeps_partially_live_batch() {
        let mut r = renderer(4);
        let a = solid(0);
        r.add(a.clone());
        r.add(solid(0));
        assert!(r.remove(&a));
        assert_eq!(r.batch_count(), 1);
        assert_eq!(r.batches()[0].slots(), 2);
    }

    // ── registration ──────────────────────────────────────────────────────

    #[test]
    fn adding_twice_keeps_one_slot() {
        let mut r = renderer(10);
        let a = solid(0);
        assert!(r.add(a.clone()));
        assert!(!r.add(a.clone()));
        assert_eq!(r.sprite_count(), 1);
        assert_eq!(r.batches()[0].slots(), 1);
    }

    #[test]
    fn removed_renderable_leaves_no_ghost_and_can_return() {
        let mut r = renderer(10);
        let a = solid(0);
        r.add(a.clone());
        r.add(a.clone());
        r.add(solid(0));

        assert!(r.remove(&a));
        assert!(!r.remove(&a));
        assert!(!r.batches()[0].contains(&a));
        assert_eq!(r.sprite_count(), 1);

        assert!(r.add(a.clone()));
        assert_eq!(r.sprite_count(), 2);
    }

    // ── dirty tracking ────────────────────────────────────────────────────

    #[test]
    fn refresh_cleans_every_renderable() {
        let mut r = renderer(2);
        let items: Vec<_> = (0..5).map(|_| solid(0)).collect();
        for item in &items {
            r.add(item.clone());
        }
        items[3]
            .borrow_mut()
            .set_position(Vec2::new(9.0, 9.0));

        for batch in &mut r.batches {
            batch.refresh();
        }
        assert!(items.iter().all(|i| !i.borrow().is_dirty()));
        assert_eq!(r.batches()[1].vertices()[4 + 2].position, [9.0, 9.0]);
    }

    #[test]
    fn zero_batch_size_is_clamped() {
        let mut r = renderer(0);
        r.add(solid(0));
        assert_eq!(r.config().max_batch_size, 1);
        assert_eq!(r.sprite_count(), 1);
    }
}
