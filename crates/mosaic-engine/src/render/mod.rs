//! GPU rendering subsystem.
//!
//! Sprites are grouped into [`RenderBatch`]es by z-index and drawn by the
//! [`Renderer`] with one indexed call per batch. Each renderer owns its GPU
//! resources and builds them lazily on the first frame that carries a device.
//!
//! Convention:
//! - Geometry is in world units (bottom-left origin, +Y up).
//! - [`Camera`](crate::camera::Camera) matrices map world units to clip space.
//! - Colors are linear premultiplied RGBA.

mod batch;
mod common;
mod ctx;
mod framebuffer;
mod renderer;
mod shader;
mod slots;
mod texture;
mod uniforms;
mod vertex;
mod z_index;

pub use batch::{RenderBatch, MAX_BATCH_TEXTURES};
pub use ctx::{DepthTarget, RenderCtx, RenderTarget, TargetFormats};
pub use framebuffer::{FrameBuffer, FRAMEBUFFER_DEPTH_FORMAT};
pub use renderer::{Renderer, RendererConfig};
pub use shader::Shader;
pub use texture::{Texture, TextureHandle, TextureId};
pub use uniforms::{UniformField, UniformKind};
pub use vertex::{
    quad_indices, LineVertex, SpriteVertex, CORNER_OFFSETS, INDICES_PER_SPRITE,
    VERTICES_PER_SPRITE,
};
pub use z_index::ZIndex;

pub(crate) use common::{build_pipeline, PipelineSpec};
pub(crate) use slots::FrameSlots;
