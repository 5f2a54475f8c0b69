use std::collections::HashMap;

use anyhow::Result;
use glam::{Vec2, Vec3};

use crate::camera::Camera;
use crate::render::{
    build_pipeline, FrameSlots, LineVertex, PipelineSpec, RenderCtx, RenderTarget, Shader,
    TargetFormats, UniformField, UniformKind,
};

use super::line::Line2D;
use super::shapes::{box_corners, closed_loop, polygon_points, CIRCLE_SEGMENTS};

const LINE_SHADER: &str = include_str!("../render/shaders/line.wgsl");

const LINE_UNIFORMS: &[UniformField] = &[
    UniformField { name: "u_projection", kind: UniformKind::Mat4, offset: 0 },
    UniformField { name: "u_view", kind: UniformKind::Mat4, offset: 64 },
];

#[derive(Debug, Copy, Clone)]
pub struct DebugDrawConfig {
    /// Lines kept at once; further insertions are dropped.
    pub max_lines: usize,
    /// World z of every line vertex.
    pub line_depth: f32,
}

impl Default for DebugDrawConfig {
    fn default() -> Self {
        Self {
            max_lines: 500,
            line_depth: -10.0,
        }
    }
}

/// Color and frame lifetime of a debug shape.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DebugStyle {
    pub color: Vec3,
    pub lifetime: i32,
}

impl DebugStyle {
    pub const fn new(color: Vec3, lifetime: i32) -> Self {
        Self { color, lifetime }
    }

    /// `color` with a one-frame lifetime.
    pub const fn colored(color: Vec3) -> Self {
        Self { color, lifetime: 1 }
    }

    pub const fn with_lifetime(self, lifetime: i32) -> Self {
        Self { lifetime, ..self }
    }
}

impl Default for DebugStyle {
    fn default() -> Self {
        Self {
            color: Vec3::new(0.0, 1.0, 0.0),
            lifetime: 1,
        }
    }
}

/// Line geometry regions allocated up front; the buffer doubles past that.
const INITIAL_LINE_REGIONS: usize = 2;

struct LineGpu {
    shader: Shader,
    /// One region of `max_lines * 2` vertices per draw of a frame.
    slots: FrameSlots,
    vbo: wgpu::Buffer,
}

/// Immediate-style line overlay with per-line frame lifetimes.
///
/// Call [`begin_frame`](Self::begin_frame) once per frame before adding this
/// frame's lines, and [`draw`](Self::draw) after the sprite pass.
pub struct DebugDraw {
    config: DebugDrawConfig,
    lines: Vec<Line2D>,
    vertices: Vec<LineVertex>,

    gpu: Option<LineGpu>,
    pipelines: HashMap<TargetFormats, wgpu::RenderPipeline>,

    warned_full: bool,
    lines_changed: bool,
}

impl DebugDraw {
    pub fn new(config: DebugDrawConfig) -> Self {
        Self {
            config,
            lines: Vec::with_capacity(config.max_lines),
            vertices: vec![LineVertex::default(); config.max_lines * 2],
            gpu: None,
            pipelines: HashMap::new(),
            warned_full: false,
            lines_changed: true,
        }
    }

    /// Ages every line by one frame and evicts the expired ones.
    pub fn begin_frame(&mut self) {
        let before = self.lines.len();
        self.lines.retain_mut(|line| line.begin_frame() >= 0);
        let evicted = before - self.lines.len();
        if evicted > 0 {
            log::trace!("debug draw: {evicted} lines expired");
            self.lines_changed = true;
        }
        self.warned_full = false;
    }

    pub fn lines(&self) -> &[Line2D] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines_changed |= !self.lines.is_empty();
        self.lines.clear();
    }

    // ── insertion ─────────────────────────────────────────────────────────

    /// Returns `false` if the overlay is full and the line was dropped.
    pub fn push_line(&mut self, line: Line2D) -> bool {
        if self.lines.len() >= self.config.max_lines {
            if !self.warned_full {
                log::debug!("debug draw full ({} lines); dropping", self.config.max_lines);
                self.warned_full = true;
            }
            return false;
        }
        self.lines.push(line);
        self.lines_changed = true;
        true
    }

    pub fn add_line(&mut self, start: Vec2, end: Vec2, style: DebugStyle) -> bool {
        self.push_line(Line2D::new(start, end, style.color, style.lifetime))
    }

    /// Outline of a `dimensions`-sized box rotated `rotation` degrees about
    /// `center`.
    pub fn add_box(&mut self, center: Vec2, dimensions: Vec2, rotation: f32, style: DebugStyle) {
        let corners = box_corners(center, dimensions, rotation);
        for (a, b) in closed_loop(&corners) {
            self.add_line(a, b, style);
        }
    }

    pub fn add_polygon(
        &mut self,
        center: Vec2,
        radius: f32,
        edges: usize,
        rotation: f32,
        style: DebugStyle,
    ) {
        if edges < 3 {
            log::warn!("debug polygon with {edges} edges ignored");
            return;
        }
        let points = polygon_points(center, radius, edges, rotation);
        for (a, b) in closed_loop(&points) {
            self.add_line(a, b, style);
        }
    }

    pub fn add_circle(&mut self, center: Vec2, radius: f32, style: DebugStyle) {
        self.add_polygon(center, radius, CIRCLE_SEGMENTS, 0.0, style);
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// Rewrites the vertex prefix from the live lines; returns its length.
    fn rebuild_vertices(&mut self) -> usize {
        let z = self.config.line_depth;
        for (i, line) in self.lines.iter().enumerate() {
            let color = line.color.to_array();
            self.vertices[i * 2] = LineVertex {
                position: line.start.extend(z).to_array(),
                color,
            };
            self.vertices[i * 2 + 1] = LineVertex {
                position: line.end.extend(z).to_array(),
                color,
            };
        }
        self.lines.len() * 2
    }

    /// Draws all live lines into `target` over its current contents.
    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        camera: &mut Camera,
    ) -> Result<()> {
        if self.lines.is_empty() {
            return Ok(());
        }

        self.ensure_gpu(ctx)?;
        let formats = target.format_key();
        self.ensure_pipeline(ctx, formats);

        let count = self.rebuild_vertices();
        let (Some(gpu), Some(pipeline)) = (self.gpu.as_mut(), self.pipelines.get(&formats)) else {
            return Ok(());
        };

        let changed = std::mem::replace(&mut self.lines_changed, false);
        let claim = gpu.slots.claim(ctx.frame, changed);
        if claim.grew {
            log::debug!("debug draw: {} line regions", gpu.slots.capacity());
            gpu.vbo = line_buffer(ctx.device, &gpu.slots);
        }
        if claim.upload {
            ctx.queue.write_buffer(
                &gpu.vbo,
                claim.offset,
                bytemuck::cast_slice(&self.vertices[..count]),
            );
        }
        let region = claim.offset..claim.offset + gpu.slots.stride();

        gpu.shader.upload_mat4("u_projection", &camera.projection());
        gpu.shader.upload_mat4("u_view", &camera.view());

        let mut pass = target.begin_load_pass("mosaic debug lines");
        pass.set_pipeline(pipeline);
        gpu.shader.use_program(ctx, &mut pass);
        pass.set_vertex_buffer(0, gpu.vbo.slice(region));
        pass.draw(0..count as u32, 0..1);
        drop(pass);

        gpu.shader.detach();
        Ok(())
    }

    fn ensure_gpu(&mut self, ctx: &RenderCtx<'_>) -> Result<()> {
        if self.gpu.is_some() {
            return Ok(());
        }

        let shader = Shader::compile(ctx.device, "mosaic line shader", LINE_SHADER, LINE_UNIFORMS)?;
        let slots = FrameSlots::new(
            std::mem::size_of_val(self.vertices.as_slice()) as u64,
            wgpu::COPY_BUFFER_ALIGNMENT,
            INITIAL_LINE_REGIONS,
        );
        let vbo = line_buffer(ctx.device, &slots);
        log::debug!("debug draw started: {} line capacity", self.config.max_lines);

        self.gpu = Some(LineGpu { shader, slots, vbo });
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
                label: "mosaic line pipeline",
                module: gpu.shader.module(),
                bind_group_layouts: &[gpu.shader.uniform_layout()],
                vertex_layout: LineVertex::layout(),
                topology: wgpu::PrimitiveTopology::LineList,
            },
            formats,
        );
        self.pipelines.insert(formats, pipeline);
    }
}

impl Default for DebugDraw {
    fn default() -> Self {
        Self::new(DebugDrawConfig::default())
    }
}

fn line_buffer(device: &wgpu::Device, slots: &FrameSlots) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("mosaic debug line vbo"),
        size: slots.buffer_size(),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(max_lines: usize) -> DebugDraw {
        DebugDraw::new(DebugDrawConfig {
            max_lines,
            ..Default::default()
        })
    }

    // ── lifetime ──────────────────────────────────────────────────────────

    #[test]
    fn line_lives_for_its_lifetime() {
        let mut d = DebugDraw::default();
        d.add_line(Vec2::ZERO, Vec2::ONE, DebugStyle::default().with_lifetime(2));

        d.begin_frame();
        assert_eq!(d.len(), 1);
        d.begin_frame();
        assert_eq!(d.len(), 1);
        d.begin_frame();
        assert!(d.is_empty());
    }

    #[test]
    fn default_lifetime_is_one_frame() {
        let mut d = DebugDraw::default();
        d.add_line(Vec2::ZERO, Vec2::ONE, DebugStyle::default());
        d.begin_frame();
        assert_eq!(d.len(), 1);
        d.begin_frame();
        assert!(d.is_empty());
    }

    #[test]
    fn eviction_keeps_order_of_survivors() {
        let mut d = DebugDraw::default();
        d.add_line(Vec2::ZERO, Vec2::X, DebugStyle::default().with_lifetime(5));
        d.add_line(Vec2::ZERO, Vec2::Y, DebugStyle::default().with_lifetime(0));
        d.add_line(Vec2::ZERO, Vec2::ONE, DebugStyle::default().with_lifetime(5));
        d.begin_frame();
        let ends: Vec<Vec2> = d.lines().iter().map(|l| l.end).collect();
        assert_eq!(ends, vec![Vec2::X, Vec2::ONE]);
    }

    // ── capacity ──────────────────────────────────────────────────────────

    #[test]
    fn insertions_beyond_capacity_are_dropped() {
        let mut d = small(2);
        assert!(d.add_line(Vec2::ZERO, Vec2::X, DebugStyle::default()));
        assert!(d.add_line(Vec2::ZERO, Vec2::Y, DebugStyle::default()));
        let before = d.lines().to_vec();
        assert!(!d.add_line(Vec2::ONE, Vec2::ZERO, DebugStyle::default()));
        assert_eq!(d.lines(), before.as_slice());
    }

    #[test]
    fn box_stops_at_capacity() {
        let mut d = small(3);
        d.add_box(Vec2::ZERO, Vec2::ONE, 0.0, DebugStyle::default());
        assert_eq!(d.len(), 3);
    }

    // ── shapes ────────────────────────────────────────────────────────────

    #[test]
    fn box_emits_four_edges() {
        let mut d = DebugDraw::default();
        let red = DebugStyle::colored(Vec3::X);
        d.add_box(Vec2::new(5.0, 5.0), Vec2::new(2.0, 2.0), 0.0, red);
        assert_eq!(d.len(), 4);
        assert!(d.lines().iter().all(|l| l.color == Vec3::X));
        assert_eq!(d.lines()[0].start, Vec2::new(4.0, 4.0));
        assert_eq!(d.lines()[0].end, Vec2::new(4.0, 6.0));
        assert_eq!(d.lines()[3].end, Vec2::new(4.0, 4.0));
    }

    #[test]
    fn circle_is_thirty_two_segments() {
        let mut d = DebugDraw::default();
        d.add_circle(Vec2::ZERO, 10.0, DebugStyle::default());
        assert_eq!(d.len(), 32);
        assert!(d
            .lines()
            .iter()
            .all(|l| (l.start.length() - 10.0).abs() < 1e-3));
    }

    #[test]
    fn degenerate_polygon_is_ignored() {
        let mut d = DebugDraw::default();
        d.add_polygon(Vec2::ZERO, 1.0, 2, 0.0, DebugStyle::default());
        assert!(d.is_empty());
    }

    // ── geometry changes ──────────────────────────────────────────────────

    #[test]
    fn only_insertions_and_evictions_change_geometry() {
        let mut d = DebugDraw::default();
        d.add_line(Vec2::ZERO, Vec2::X, DebugStyle::default().with_lifetime(2));
        assert!(d.lines_changed);

        d.lines_changed = false;
        d.begin_frame();
        d.begin_frame();
        assert!(!d.lines_changed, "aging alone keeps the uploaded vertices");

        d.begin_frame();
        assert!(d.is_empty());
        assert!(d.lines_changed);
    }

    #[test]
    fn clearing_an_empty_overlay_changes_nothing() {
        let mut d = DebugDraw::default();
        d.lines_changed = false;
        d.clear();
        assert!(!d.lines_changed);
        d.add_line(Vec2::ZERO, Vec2::X, DebugStyle::default());
        d.lines_changed = false;
        d.clear();
        assert!(d.lines_changed);
    }

    // ── vertices ──────────────────────────────────────────────────────────

    #[test]
    fn vertices_rebuilt_from_live_lines() {
        let mut d = DebugDraw::default();
        d.add_line(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0), DebugStyle::colored(Vec3::Z));
        assert_eq!(d.rebuild_vertices(), 2);
        assert_eq!(d.vertices[0].position, [1.0, 2.0, -10.0]);
        assert_eq!(d.vertices[1].position, [3.0, 4.0, -10.0]);
        assert_eq!(d.vertices[1].color, [0.0, 0.0, 1.0]);

        d.begin_frame();
        d.begin_frame();
        assert_eq!(d.rebuild_vertices(), 0);
    }
}
