use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::paint::Color;
use crate::render::{TextureHandle, ZIndex};

/// A quad the batching renderer can draw.
///
/// The renderer only reads visual state and clears the dirty flag; owners
/// mutate everything else.
pub trait Renderable {
    /// Bottom-left corner in world units.
    fn position(&self) -> Vec2;

    /// Width and height in world units.
    fn scale(&self) -> Vec2;

    fn color(&self) -> Color;

    fn texture(&self) -> Option<&TextureHandle>;

    /// UVs for corners 0..3, in the order of [`CORNER_OFFSETS`].
    ///
    /// [`CORNER_OFFSETS`]: crate::render::CORNER_OFFSETS
    fn tex_coords(&self) -> [Vec2; 4];

    fn z_index(&self) -> ZIndex;

    /// True when visual state changed since the last GPU sync.
    fn is_dirty(&self) -> bool;

    fn set_clean(&mut self);
}

/// Shared, mutable renderable as registered with a [`Renderer`].
///
/// [`Renderer`]: crate::render::Renderer
pub type RenderableRef = Rc<RefCell<dyn Renderable>>;
