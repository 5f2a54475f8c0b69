//! Mosaic engine crate.
//!
//! Batched 2D sprite rendering on wgpu: sprites are packed into fixed-capacity
//! batches keyed by z-index, re-uploaded only when something changed, and drawn
//! back-to-front. A debug line overlay and an offscreen framebuffer sit next to
//! the batcher; the window/runtime pieces drive everything once per frame.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod paint;
pub mod camera;
pub mod sprite;
pub mod render;
pub mod debug;
