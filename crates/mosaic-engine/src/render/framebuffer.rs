use std::rc::Rc;

use anyhow::{ensure, Context, Result};

use crate::paint::Color;

use super::common::validated;
use super::ctx::RenderTarget;
use super::texture::{Texture, TextureHandle};

/// Depth format of every framebuffer.
pub const FRAMEBUFFER_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Offscreen color target with a depth attachment, fixed size.
///
/// The color attachment is also sampleable, so the finished image can be
/// drawn as a sprite through [`color_texture`](Self::color_texture).
pub struct FrameBuffer {
    width: u32,
    height: u32,
    color_format: wgpu::TextureFormat,
    color: TextureHandle,
    color_view: wgpu::TextureView,
    _depth: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl FrameBuffer {
    /// Allocates both attachments. Any size or validation failure is fatal.
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        color_format: wgpu::TextureFormat,
    ) -> Result<Self> {
        ensure!(width > 0 && height > 0, "framebuffer size {width}x{height} is empty");
        let max = device.limits().max_texture_dimension_2d;
        ensure!(
            width <= max && height <= max,
            "framebuffer size {width}x{height} exceeds device limit {max}"
        );

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let (color, depth) = validated(device, "framebuffer incomplete", || {
            let color = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("mosaic framebuffer color"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: color_format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            });
            let depth = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("mosaic framebuffer depth"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: FRAMEBUFFER_DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            });
            (color, depth)
        })
        .with_context(|| format!("creating {width}x{height} {color_format:?} framebuffer"))?;

        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let sampled_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        log::debug!("framebuffer {width}x{height} {color_format:?} created");

        Ok(Self {
            width,
            height,
            color_format,
            color: Rc::new(Texture::with_gpu(width, height, color, sampled_view)),
            color_view,
            _depth: depth,
            depth_view,
        })
    }

    /// Targets this framebuffer for draws recorded into `encoder`.
    ///
    /// Dropping the returned target ends the binding; the window surface is
    /// untouched while it lives.
    pub fn bind<'a>(&'a self, encoder: &'a mut wgpu::CommandEncoder) -> RenderTarget<'a> {
        RenderTarget::new(encoder, &self.color_view, self.color_format)
            .with_depth(&self.depth_view, FRAMEBUFFER_DEPTH_FORMAT)
    }

    /// Clears color to `color` and depth to 1.0.
    pub fn clear(&self, encoder: &mut wgpu::CommandEncoder, color: Color) {
        let mut target = self.bind(encoder);
        let _pass = target.begin_clear_pass("mosaic framebuffer clear", color.to_wgpu());
    }

    pub fn color_texture(&self) -> &TextureHandle {
        &self.color
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color_format
    }
}
