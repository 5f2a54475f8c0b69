use wgpu::SurfaceError;

/// Follow-up to a failed swapchain acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// The surface must be configured again before the next frame.
    Reconfigure,
    /// Drop this frame and try the next one.
    SkipFrame,
    /// Unrecoverable.
    Fatal,
}

impl From<&SurfaceError> for SurfaceErrorAction {
    fn from(err: &SurfaceError) -> Self {
        match err {
            SurfaceError::Lost | SurfaceError::Outdated => Self::Reconfigure,
            SurfaceError::OutOfMemory => Self::Fatal,
            SurfaceError::Timeout | SurfaceError::Other => Self::SkipFrame,
        }
    }
}

/// Swapchain image, its view, and the encoder recording this frame.
pub struct GpuFrame {
    pub(crate) surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
