//! Mosaic level editor.
//!
//! Arrow keys or WASD pan the camera, Escape quits. Set `RUST_LOG=debug` to
//! watch batch allocation.

mod assets;
mod controls;
mod editor;

use anyhow::Result;
use winit::dpi::LogicalSize;

use mosaic_engine::device::GpuInit;
use mosaic_engine::logging::{init_logging, LoggingConfig};
use mosaic_engine::window::{Runtime, RuntimeConfig};

use editor::LevelEditor;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "Mosaic Level Editor".to_string(),
        initial_size: LogicalSize::new(1280.0, 672.0),
        ..Default::default()
    };

    Runtime::run(config, GpuInit::default(), LevelEditor::new())
}
