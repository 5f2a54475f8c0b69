//! Pipeline state and GPU helpers shared by the sprite and line renderers.

use anyhow::{bail, Result};

use super::ctx::TargetFormats;

// ── blend ─────────────────────────────────────────────────────────────────

/// Premultiplied-alpha "over" blending.
pub(crate) fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

// ── depth ─────────────────────────────────────────────────────────────────

/// Depth state for targets that carry a depth buffer.
///
/// Draw order is decided by z-index batching (painter's algorithm), so the
/// depth test always passes and nothing is written.
pub(crate) fn passthrough_depth(formats: TargetFormats) -> Option<wgpu::DepthStencilState> {
    formats.depth.map(|format| wgpu::DepthStencilState {
        format,
        depth_write_enabled: false,
        depth_compare: wgpu::CompareFunction::Always,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    })
}

// ── pipeline ──────────────────────────────────────────────────────────────

/// Parameters that differ between the sprite and line pipelines.
pub(crate) struct PipelineSpec<'a> {
    pub label: &'a str,
    pub module: &'a wgpu::ShaderModule,
    pub bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub vertex_layout: wgpu::VertexBufferLayout<'static>,
    pub topology: wgpu::PrimitiveTopology,
}

pub(crate) fn build_pipeline(
    device: &wgpu::Device,
    spec: PipelineSpec<'_>,
    formats: TargetFormats,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(spec.label),
        bind_group_layouts: spec.bind_group_layouts,
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(&layout),

        vertex: wgpu::VertexState {
            module: spec.module,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[spec.vertex_layout],
        },

        fragment: Some(wgpu::FragmentState {
            module: spec.module,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: formats.color,
                blend: Some(premul_alpha_blend()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: spec.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: passthrough_depth(formats),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

// ── validation ────────────────────────────────────────────────────────────

/// Runs `f` inside a validation error scope and fails if wgpu reported
/// anything. Used for startup-time objects whose failure is fatal.
pub(crate) fn validated<T>(
    device: &wgpu::Device,
    what: &str,
    f: impl FnOnce() -> T,
) -> Result<T> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    if let Some(err) = pollster::block_on(scope.pop()) {
        bail!("{what}: {err}");
    }
    Ok(value)
}
