use winit::event::WindowEvent;
use winit::window::WindowId;

use super::ctx::FrameCtx;

/// What the runtime should do after an app callback.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

impl AppControl {
    #[inline]
    pub fn is_exit(self) -> bool {
        self == AppControl::Exit
    }
}

/// Game or editor driven by [`Runtime`](crate::window::Runtime).
///
/// The runtime does not translate input; apps read raw winit events in
/// [`on_window_event`](Self::on_window_event) and keep whatever state they
/// need for the next frame.
pub trait App {
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per redraw. Scene update and rendering both happen here.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
