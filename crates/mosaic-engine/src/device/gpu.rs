use anyhow::{bail, ensure, Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::options::GpuInit;
use super::surface::{GpuFrame, SurfaceErrorAction};

/// Device, queue and the swapchain of one window.
///
/// The surface borrows the window for `'w`, so the runtime stores both in a
/// single self-referencing entry.
pub struct Gpu<'w> {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'w>,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl<'w> Gpu<'w> {
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        ensure!(
            size.width > 0 && size.height > 0,
            "cannot create a surface for a {}x{} window",
            size.width,
            size.height
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window)
            .context("creating window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no adapter can present to this window")?;

        let info = adapter.get_info();
        log::info!("adapter: {} on {:?}", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("mosaic device"),
                required_features: wgpu::Features::empty(),
                required_limits: init.limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("requesting device")?;

        let caps = surface.get_capabilities(&adapter);
        let Some(config) = init.surface_config(&caps, size.width, size.height) else {
            bail!("surface offers no texture formats");
        };
        surface.configure(&device, &config);
        log::debug!(
            "surface {}x{} {:?} {:?}",
            config.width,
            config.height,
            config.format,
            config.present_mode
        );

        Ok(Self {
            device,
            queue,
            surface,
            config,
            size,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Current drawable size in physical pixels; may be zero while minimized.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    fn is_drawable(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }

    /// Records the new size and reconfigures unless the window is minimized.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
        if !self.is_drawable() {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Next swapchain image with a fresh encoder.
    ///
    /// `Ok(None)` means there is nothing to draw into this frame (minimized,
    /// timed out, or the surface was just reconfigured).
    pub fn acquire(&mut self) -> Result<Option<GpuFrame>> {
        if !self.is_drawable() {
            return Ok(None);
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(err) => {
                return match SurfaceErrorAction::from(&err) {
                    SurfaceErrorAction::Reconfigure => {
                        log::debug!("surface {err}; reconfiguring");
                        self.surface.configure(&self.device, &self.config);
                        Ok(None)
                    }
                    SurfaceErrorAction::SkipFrame => {
                        log::trace!("skipping frame: {err}");
                        Ok(None)
                    }
                    SurfaceErrorAction::Fatal => Err(err).context("acquiring swapchain image"),
                };
            }
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("mosaic frame"),
            });

        Ok(Some(GpuFrame {
            surface_texture,
            view,
            encoder,
        }))
    }

    /// Submits the recorded commands, then presents.
    pub fn present(&self, frame: GpuFrame) {
        let GpuFrame {
            surface_texture,
            encoder,
            ..
        } = frame;
        self.queue.submit([encoder.finish()]);
        surface_texture.present();
    }
}
