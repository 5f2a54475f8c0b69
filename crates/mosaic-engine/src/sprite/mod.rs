//! Renderable sprite components.
//!
//! The batching renderer only needs the [`Renderable`] contract; the concrete
//! types here cover the common case of a textured or solid axis-aligned quad.

mod renderable;
mod sheet;
mod sprite;
mod sprite_renderer;

pub use renderable::{Renderable, RenderableRef};
pub use sheet::SpriteSheet;
pub use sprite::{Sprite, Transform};
pub use sprite_renderer::SpriteRenderer;
