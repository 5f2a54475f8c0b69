use anyhow::Result;
use winit::window::{Window, WindowId};

use crate::device::Gpu;
use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Per-window handles.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Window size in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }
}

/// The acquired surface image of one frame plus its command encoder.
///
/// Offscreen passes borrow `encoder` directly (see
/// [`FrameBuffer::bind`](crate::render::FrameBuffer::bind)); passes onto the
/// window go through [`target`](Self::target).
pub struct SurfaceFrame<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub view: &'a wgpu::TextureView,
    pub format: wgpu::TextureFormat,
}

impl<'a> SurfaceFrame<'a> {
    pub fn target(&mut self) -> RenderTarget<'_> {
        RenderTarget::new(self.encoder, self.view, self.format)
    }
}

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
///
/// `'a` is the callback borrow, `'w` the window borrow carried by `Gpu<'w>`.
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Acquires the surface, clears it to `clear`, runs `draw`, and presents.
    ///
    /// Surface loss is handled here. An error from `draw` is fatal: it is
    /// logged and the frame asks the runtime to exit.
    pub fn render<F>(&mut self, clear: Color, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut SurfaceFrame<'_>) -> Result<()>,
    {
        let mut frame = match self.gpu.acquire() {
            Ok(Some(frame)) => frame,
            Ok(None) => return AppControl::Continue,
            Err(e) => {
                log::error!("{e:#}");
                return AppControl::Exit;
            }
        };

        let format = self.gpu.surface_format();
        let rctx = RenderCtx::new(self.gpu.device(), self.gpu.queue(), self.time.frame_index);

        let result = {
            let mut surface = SurfaceFrame {
                encoder: &mut frame.encoder,
                view: &frame.view,
                format,
            };
            {
                let mut target = surface.target();
                let _clear = target.begin_clear_pass("mosaic surface clear", clear.to_wgpu());
            }
            draw(&rctx, &mut surface)
        };

        if let Err(e) = result {
            log::error!("frame rendering failed: {e:#}");
            return AppControl::Exit;
        }

        self.window.window.pre_present_notify();
        self.gpu.present(frame);
        AppControl::Continue
    }
}
