/// Rendering viewport in physical pixels.
///
/// Mirrors `glViewport(x, y, width, height)`: the rectangle of the drawable the
/// normalized device coordinate square is mapped onto.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering a whole drawable of `width` x `height`.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, or 1.0 for an empty viewport.
    pub fn aspect_ratio(self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Whether the viewport lies entirely inside a target of the given size.
    pub fn fits_within(self, width: u32, height: u32) -> bool {
        self.x.saturating_add(self.width) <= width && self.y.saturating_add(self.height) <= height
    }

    /// Maps an NDC position to a pixel position (origin top-left, +Y down).
    pub fn ndc_to_pixel(self, x: f32, y: f32) -> (f32, f32) {
        let px = self.x as f32 + (x + 1.0) * 0.5 * self.width as f32;
        let py = self.y as f32 + (1.0 - y) * 0.5 * self.height as f32;
        (px, py)
    }
}
