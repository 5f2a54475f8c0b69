use std::collections::HashMap;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::WindowId;

use crate::core::App;
use crate::device::GpuInit;

use super::config::{RuntimeConfig, RuntimeCtx};
use super::entry::OpenWindow;

/// Drives an [`App`] on the winit event loop.
pub struct Runtime;

impl Runtime {
    /// Opens a window from `config` and blocks until the app exits or its
    /// last window closes. A failure to open the window is returned.
    pub fn run<A: App + 'static>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()> {
        let event_loop = EventLoop::new().context("creating event loop")?;
        let mut handler = Handler {
            config,
            gpu_init,
            app,
            windows: HashMap::new(),
            started: false,
            error: None,
        };
        event_loop
            .run_app(&mut handler)
            .context("event loop failed")?;
        handler.error.map_or(Ok(()), Err)
    }
}

struct Handler<A> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,
    windows: HashMap<WindowId, OpenWindow>,
    started: bool,
    error: Option<anyhow::Error>,
}

impl<A: App> Handler<A> {
    fn close(&mut self, event_loop: &ActiveEventLoop, id: WindowId) {
        if self.windows.remove(&id).is_some() {
            log::debug!("window {id:?} closed");
        }
        if self.windows.is_empty() {
            event_loop.exit();
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, id: WindowId) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };

        let mut requests = RuntimeCtx::default();
        if window.frame(&mut self.app, &mut requests).is_exit() {
            requests.exit();
        }

        if requests.exit {
            event_loop.exit();
            return;
        }
        for id in requests.close {
            self.close(event_loop, id);
        }
    }
}

impl<A: App> ApplicationHandler for Handler<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        match OpenWindow::open(event_loop, &self.config, &self.gpu_init) {
            Ok(window) => {
                window.request_redraw();
                self.windows.insert(window.id(), window);
            }
            Err(e) => {
                log::error!("{e:#}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Animated scenes: keep a redraw queued for every window.
        for window in self.windows.values() {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if event_loop.exiting() {
            return;
        }
        if self.app.on_window_event(id, &event).is_exit() {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.close(event_loop, id),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = self.windows.get_mut(&id) {
                    window.sync_size();
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop, id),
            _ => {}
        }
    }
}
