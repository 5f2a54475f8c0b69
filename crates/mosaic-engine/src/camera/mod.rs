//! Orthographic 2D camera.
//!
//! The camera is passed explicitly to everything that draws; there is no
//! global "current camera".

mod ortho;

pub use ortho::{Camera, CameraConfig};
