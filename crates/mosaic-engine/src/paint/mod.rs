//! Color types used by sprites, clears and the debug overlay.

mod color;

pub use color::Color;
