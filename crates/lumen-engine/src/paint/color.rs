/// Straight-alpha RGBA color with components in `[0, 1]`.
///
/// Values are passed to the GPU unchanged, matching `glClearColor` and
/// `glUniform4f` semantics: no premultiplication and no sRGB conversion.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// The teal clear color every lesson starts from.
    pub const SLATE: Self = Self::rgb(0.2, 0.3, 0.3);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Creates a color from 8-bit channels.
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Returns a copy with every component clamped to `[0, 1]`.
    pub fn clamped(self) -> Self {
        Self::rgba(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Conversion for render-pass clear operations.
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u8_scales_to_unit_range() {
        assert_eq!(Color::from_u8(255, 0, 255, 255), Color::rgb(1.0, 0.0, 1.0));
    }

    #[test]
    fn clamped_limits_components() {
        let c = Color::rgba(1.5, -0.2, 0.5, 2.0).clamped();
        assert_eq!(c, Color::rgba(1.0, 0.0, 0.5, 1.0));
    }

    #[test]
    fn to_wgpu_preserves_values() {
        let c = Color::SLATE.to_wgpu();
        assert_eq!((c.r as f32, c.g as f32, c.b as f32, c.a), (0.2, 0.3, 0.3, 1.0));
    }
}
