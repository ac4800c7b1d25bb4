/// How texture coordinates outside `0..1` are resolved.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum WrapMode {
    #[default]
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    /// Transparent black outside the image. Needs
    /// `Features::ADDRESS_MODE_CLAMP_TO_BORDER`; falls back to `ClampToEdge`.
    ClampToBorder,
}

/// Texel filtering.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

impl FilterMode {
    fn to_wgpu(self) -> wgpu::FilterMode {
        match self {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        }
    }

    fn to_wgpu_mipmap(self) -> wgpu::MipmapFilterMode {
        match self {
            FilterMode::Nearest => wgpu::MipmapFilterMode::Nearest,
            FilterMode::Linear => wgpu::MipmapFilterMode::Linear,
        }
    }
}

/// Sampling and storage options for an uploaded texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureOptions {
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
    /// Minification filter within a mip level.
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    /// Generate the full mip chain on upload.
    pub mipmaps: bool,
    /// Filter between mip levels.
    pub mipmap_filter: FilterMode,
    /// Store as sRGB so sampling returns linear values.
    pub srgb: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            wrap_u: WrapMode::Repeat,
            wrap_v: WrapMode::Repeat,
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            mipmaps: true,
            mipmap_filter: FilterMode::Linear,
            srgb: false,
        }
    }
}

impl TextureOptions {
    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap_u = wrap;
        self.wrap_v = wrap;
        self
    }

    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.min_filter = filter;
        self.mag_filter = filter;
        self
    }

    pub fn with_mipmaps(mut self, mipmaps: bool) -> Self {
        self.mipmaps = mipmaps;
        self
    }

    pub(crate) fn uses_border(&self) -> bool {
        self.wrap_u == WrapMode::ClampToBorder || self.wrap_v == WrapMode::ClampToBorder
    }

    pub(crate) fn format(&self) -> wgpu::TextureFormat {
        if self.srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        }
    }

    /// Sampler matching these options.
    ///
    /// `border_supported` is whether the device has clamp-to-border addressing.
    pub(crate) fn sampler_descriptor(&self, border_supported: bool) -> wgpu::SamplerDescriptor<'static> {
        let address = |wrap: WrapMode| match wrap {
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
            WrapMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            WrapMode::ClampToBorder if border_supported => wgpu::AddressMode::ClampToBorder,
            WrapMode::ClampToBorder => wgpu::AddressMode::ClampToEdge,
        };

        let address_mode_u = address(self.wrap_u);
        let address_mode_v = address(self.wrap_v);
        let border_color = (address_mode_u == wgpu::AddressMode::ClampToBorder
            || address_mode_v == wgpu::AddressMode::ClampToBorder)
            .then_some(wgpu::SamplerBorderColor::TransparentBlack);

        wgpu::SamplerDescriptor {
            label: Some("lumen texture sampler"),
            address_mode_u,
            address_mode_v,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: self.mag_filter.to_wgpu(),
            min_filter: self.min_filter.to_wgpu(),
            mipmap_filter: if self.mipmaps {
                self.mipmap_filter.to_wgpu_mipmap()
            } else {
                wgpu::MipmapFilterMode::Nearest
            },
            border_color,
            ..Default::default()
        }
    }
}
