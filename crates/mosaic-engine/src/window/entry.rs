use anyhow::{Context, Result};
use ouroboros::self_referencing;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::time::FrameClock;

use super::config::{RuntimeConfig, RuntimeCtx};

/// An open window with the GPU context that borrows it.
#[self_referencing]
struct Slot {
    clock: FrameClock,
    window: Window,
    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

pub(super) struct OpenWindow {
    id: WindowId,
    slot: Slot,
}

impl OpenWindow {
    pub(super) fn open(
        event_loop: &ActiveEventLoop,
        config: &RuntimeConfig,
        gpu_init: &GpuInit,
    ) -> Result<Self> {
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title(config.title.as_str())
                    .with_inner_size(config.initial_size)
                    .with_resizable(config.resizable),
            )
            .with_context(|| format!("opening window {:?}", config.title))?;
        let id = window.id();

        let slot = SlotTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init.clone())),
        }
        .try_build()
        .context("initializing GPU for window")?;

        log::debug!("window {id:?} open");
        Ok(Self { id, slot })
    }

    pub(super) fn id(&self) -> WindowId {
        self.id
    }

    pub(super) fn request_redraw(&self) {
        self.slot.borrow_window().request_redraw();
    }

    /// Pushes the window's current inner size to the surface.
    pub(super) fn sync_size(&mut self) {
        let size = self.slot.borrow_window().inner_size();
        self.slot.with_gpu_mut(|gpu| gpu.resize(size));
    }

    /// Ticks the clock and runs one app frame.
    pub(super) fn frame<A: App>(&mut self, app: &mut A, runtime: &mut RuntimeCtx) -> AppControl {
        let id = self.id;
        self.slot.with_mut(|slot| {
            let mut ctx = FrameCtx {
                window: WindowCtx {
                    id,
                    window: slot.window,
                },
                gpu: slot.gpu,
                time: slot.clock.tick(),
                runtime,
            };
            app.on_frame(&mut ctx)
        })
    }
}
