//! Window and event loop.
//!
//! Owns the winit event loop and windows, and gives each window its own
//! [`Gpu`](crate::device::Gpu).

mod config;
mod entry;
mod runtime;

pub use config::{RuntimeConfig, RuntimeCtx};
pub use runtime::Runtime;
