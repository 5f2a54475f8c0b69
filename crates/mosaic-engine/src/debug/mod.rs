//! Debug line overlay.
//!
//! Lines live for a caller-chosen number of frames and are drawn after the
//! sprite batches. Shape helpers expand boxes, polygons, and circles into
//! line segments.

mod draw;
mod grid;
mod line;
pub mod shapes;

pub use draw::{DebugDraw, DebugDrawConfig, DebugStyle};
pub use grid::{GridConfig, GridLines};
pub use line::Line2D;
