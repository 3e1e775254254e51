use crate::config::EngineConfig;

/// Initialization parameters for the wgpu device and surface.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior). FIFO is the vsync'd, always-supported mode.
    pub present_mode: wgpu::PresentMode,

    /// Required wgpu features. Empty for portability.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Depth buffer format shared by the surface and every off-screen target.
    pub depth_format: wgpu::TextureFormat,

    /// Hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl GpuInit {
    /// Derives device options from the engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            present_mode: if config.vsync {
                wgpu::PresentMode::Fifo
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            ..Self::default()
        }
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            depth_format: wgpu::TextureFormat::Depth32Float,
            desired_maximum_frame_latency: 2,
        }
    }
}
