//! Device and swapchain of a window.
//!
//! [`Gpu`] owns the wgpu device for one window and hands out one
//! [`GpuFrame`] per redraw.

mod gpu;
mod options;
mod surface;

pub use gpu::Gpu;
pub use options::GpuInit;
pub use surface::{GpuFrame, SurfaceErrorAction};
