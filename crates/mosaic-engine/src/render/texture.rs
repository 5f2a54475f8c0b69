use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{ensure, Context, Result};

use super::common::validated;

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique texture identity.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TextureId(u64);

impl TextureId {
    fn next() -> Self {
        Self(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Shared texture handle. Batches keep one clone per distinct texture.
pub type TextureHandle = Rc<Texture>;

/// Sampled 2D texture with a stable identity.
///
/// Two textures are equal only if they are the same handle; pixel contents
/// never participate in comparisons.
#[derive(Debug)]
pub struct Texture {
    id: TextureId,
    width: u32,
    height: u32,
    gpu: Option<GpuTexture>,
}

#[derive(Debug)]
struct GpuTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl Texture {
    /// Uploads tightly packed RGBA8 (sRGB) pixels.
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<Self> {
        ensure!(width > 0 && height > 0, "texture '{label}' has zero size");
        let expected = width as usize * height as usize * 4;
        ensure!(
            rgba.len() == expected,
            "texture '{label}': expected {expected} bytes for {width}x{height}, got {}",
            rgba.len()
        );

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = validated(device, "texture creation", || {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            })
        })
        .with_context(|| format!("creating texture '{label}'"))?;

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self::with_gpu(width, height, texture, view))
    }

    /// Wraps an existing GPU texture (e.g. a framebuffer color attachment).
    pub(crate) fn with_gpu(
        width: u32,
        height: u32,
        texture: wgpu::Texture,
        view: wgpu::TextureView,
    ) -> Self {
        let id = TextureId::next();
        log::trace!("texture {} allocated ({width}x{height})", id.get());
        Self {
            id,
            width,
            height,
            gpu: Some(GpuTexture {
                _texture: texture,
                view,
            }),
        }
    }

    /// Identity-only texture without GPU storage. Samples as white.
    pub fn detached(width: u32, height: u32) -> Self {
        Self {
            id: TextureId::next(),
            width,
            height,
            gpu: None,
        }
    }

    #[inline]
    pub fn id(&self) -> TextureId {
        self.id
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sampled view, if the texture lives on the GPU.
    pub fn view(&self) -> Option<&wgpu::TextureView> {
        self.gpu.as_ref().map(|g| &g.view)
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Texture {}

impl Hash for Texture {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = Texture::detached(4, 4);
        let b = Texture::detached(4, 4);
        assert_ne!(a.id(), b.id());
        assert!(b.id() > a.id());
    }

    #[test]
    fn equality_ignores_dimensions() {
        let a = Texture::detached(8, 8);
        let b = Texture::detached(8, 8);
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn shared_handles_compare_equal() {
        let a: TextureHandle = Rc::new(Texture::detached(2, 2));
        let b = Rc::clone(&a);
        assert_eq!(a, b);

        let set: HashSet<TextureHandle> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn detached_has_no_view() {
        let t = Texture::detached(16, 32);
        assert!(t.view().is_none());
        assert_eq!((t.width(), t.height()), (16, 32));
    }
}
