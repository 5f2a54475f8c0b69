use winit::dpi::LogicalSize;
use winit::window::WindowId;

/// Settings of the window the runtime opens.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub resizable: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "mosaic".to_string(),
            initial_size: LogicalSize::new(1280.0, 672.0),
            resizable: true,
        }
    }
}

/// Requests an app makes during a frame. They take effect once
/// [`App::on_frame`](crate::core::App::on_frame) returns.
#[derive(Default)]
pub struct RuntimeCtx {
    pub(super) close: Vec<WindowId>,
    pub(super) exit: bool,
}

impl RuntimeCtx {
    pub fn close_window(&mut self, id: WindowId) {
        self.close.push(id);
    }

    pub fn exit(&mut self) {
        self.exit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_start_empty() {
        let mut ctx = RuntimeCtx::default();
        assert!(ctx.close.is_empty() && !ctx.exit);
        ctx.exit();
        assert!(ctx.exit);
    }
}
