//! Contracts between the runtime loop and the application.
//!
//! Apps implement [`App`]; each redraw receives a [`FrameCtx`] holding the
//! window's GPU, frame timing, and a command buffer for the runtime.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, SurfaceFrame, WindowCtx};
