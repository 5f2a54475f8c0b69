/// Renderer-facing GPU context (device + queue).
///
/// `frame` identifies the submission the draws are recorded for. Draws that
/// share a frame number must reach the queue in the same submit.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub frame: u64,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue, frame: u64) -> Self {
        Self {
            device,
            queue,
            frame,
        }
    }
}

/// Depth attachment of a render target.
pub struct DepthTarget<'a> {
    pub view: &'a wgpu::TextureView,
    pub format: wgpu::TextureFormat,
}

/// Where a draw lands: encoder + color view, plus an optional depth buffer.
///
/// Pipelines are built per `(color_format, depth_format)` pair, so the same
/// renderer can draw into the window surface and into a [`FrameBuffer`].
///
/// [`FrameBuffer`]: super::FrameBuffer
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub color_format: wgpu::TextureFormat,
    pub depth: Option<DepthTarget<'a>>,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            encoder,
            color_view,
            color_format,
            depth: None,
        }
    }

    #[inline]
    pub fn with_depth(mut self, view: &'a wgpu::TextureView, format: wgpu::TextureFormat) -> Self {
        self.depth = Some(DepthTarget { view, format });
        self
    }

    /// Formats a pipeline must be compatible with to draw here.
    #[inline]
    pub fn format_key(&self) -> TargetFormats {
        TargetFormats {
            color: self.color_format,
            depth: self.depth.as_ref().map(|d| d.format),
        }
    }

    /// Opens a pass that keeps the existing contents (color and depth).
    pub fn begin_load_pass(&mut self, label: &str) -> wgpu::RenderPass<'_> {
        self.begin_pass(label, wgpu::LoadOp::Load, None)
    }

    /// Opens a pass that clears color to `clear` and depth to 1.0.
    pub fn begin_clear_pass(&mut self, label: &str, clear: wgpu::Color) -> wgpu::RenderPass<'_> {
        self.begin_pass(label, wgpu::LoadOp::Clear(clear), Some(1.0))
    }

    fn begin_pass(
        &mut self,
        label: &str,
        color_load: wgpu::LoadOp<wgpu::Color>,
        depth_clear: Option<f32>,
    ) -> wgpu::RenderPass<'_> {
        let depth_stencil_attachment =
            self.depth
                .as_ref()
                .map(|d| wgpu::RenderPassDepthStencilAttachment {
                    view: d.view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_clear.map_or(wgpu::LoadOp::Load, wgpu::LoadOp::Clear),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                });

        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// Color/depth formats of a render target; used as the pipeline cache key.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TargetFormats {
    pub color: wgpu::TextureFormat,
    pub depth: Option<wgpu::TextureFormat>,
}
