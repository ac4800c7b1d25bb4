/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    ///
    /// Off by default: the GL default framebuffer the lessons target stores
    /// shader output unconverted, so colors and clear values match only on a
    /// linear (`*Unorm`) surface.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior). FIFO blocks on vertical sync like
    /// `glfwSwapBuffers` with the default swap interval.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Features the device must support.
    pub required_features: wgpu::Features,

    /// Features requested only when the adapter offers them.
    ///
    /// Wireframe drawing and clamp-to-border sampling degrade gracefully when
    /// these are missing.
    pub optional_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    ///
    /// Downlevel defaults keep the GL backend usable.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface (a hint).
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            optional_features: wgpu::Features::POLYGON_MODE_LINE
                | wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER,
            required_limits: wgpu::Limits::downlevel_defaults(),
            desired_maximum_frame_latency: 2,
        }
    }
}
