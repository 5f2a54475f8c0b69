/// How the window surface and device are requested.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB swapchain format when one is offered.
    pub prefer_srgb: bool,
    /// `true` presents with FIFO, `false` asks for mailbox and falls back.
    pub vsync: bool,
    /// Frames the presentation engine may queue.
    pub frame_latency: u32,
    /// Passed straight to the adapter. Defaults cover 16 sampled textures
    /// per shader stage, which is all a sprite batch binds.
    pub limits: wgpu::Limits,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            vsync: true,
            frame_latency: 2,
            limits: wgpu::Limits::default(),
        }
    }
}

impl GpuInit {
    pub(crate) fn surface_config(
        &self,
        caps: &wgpu::SurfaceCapabilities,
        width: u32,
        height: u32,
    ) -> Option<wgpu::SurfaceConfiguration> {
        let format = choose_format(&caps.formats, self.prefer_srgb)?;
        Some(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: choose_present_mode(&caps.present_modes, self.vsync),
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: Vec::new(),
            desired_maximum_frame_latency: self.frame_latency,
        })
    }
}

pub(crate) fn choose_format(
    offered: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = offered.first().copied();
    if !prefer_srgb {
        return first;
    }
    offered.iter().copied().find(|f| f.is_srgb()).or(first)
}

pub(crate) fn choose_present_mode(offered: &[wgpu::PresentMode], vsync: bool) -> wgpu::PresentMode {
    if !vsync && offered.contains(&wgpu::PresentMode::Mailbox) {
        wgpu::PresentMode::Mailbox
    } else {
        wgpu::PresentMode::Fifo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{PresentMode, TextureFormat};

    // ── format ────────────────────────────────────────────────────────────

    #[test]
    fn srgb_format_wins_when_preferred() {
        let offered = [TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb];
        assert_eq!(
            choose_format(&offered, true),
            Some(TextureFormat::Bgra8UnormSrgb)
        );
        assert_eq!(choose_format(&offered, false), Some(TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn falls_back_to_first_format() {
        let offered = [TextureFormat::Rgba16Float, TextureFormat::Bgra8Unorm];
        assert_eq!(choose_format(&offered, true), Some(TextureFormat::Rgba16Float));
        assert_eq!(choose_format(&[], true), None);
    }

    // ── present mode ──────────────────────────────────────────────────────

    #[test]
    fn vsync_always_uses_fifo() {
        let offered = [PresentMode::Mailbox, PresentMode::Fifo];
        assert_eq!(choose_present_mode(&offered, true), PresentMode::Fifo);
        assert_eq!(choose_present_mode(&offered, false), PresentMode::Mailbox);
        assert_eq!(
            choose_present_mode(&[PresentMode::Fifo], false),
            PresentMode::Fifo
        );
    }
}
