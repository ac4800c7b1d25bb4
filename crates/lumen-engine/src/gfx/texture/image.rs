use std::fs;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbaImage;

use super::TextureError;

/// Decodes image files into RGBA8 pixels.
///
/// `flip_vertical` puts the bottom row of the file first, so texture
/// coordinate `v = 0` samples the bottom of the image.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ImageLoader {
    pub flip_vertical: bool,
}

impl ImageLoader {
    pub const fn new() -> Self {
        Self {
            flip_vertical: false,
        }
    }

    pub const fn flipped() -> Self {
        Self {
            flip_vertical: true,
        }
    }

    pub fn decode(&self, path: impl AsRef<Path>) -> Result<DecodedImage, TextureError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| TextureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = self
            .decode_bytes(&bytes)
            .map_err(|source| TextureError::Decode {
                path: path.to_path_buf(),
                source,
            })?;

        log::debug!(
            "decoded {}: {}x{}, {} channel(s)",
            path.display(),
            decoded.width(),
            decoded.height(),
            decoded.channels()
        );
        Ok(decoded)
    }

    /// Decodes an in-memory encoded image; the format is guessed from its header.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<DecodedImage, image::ImageError> {
        let dynamic = image::load_from_memory(bytes)?;
        let channels = dynamic.color().channel_count();
        let mut rgba = dynamic.to_rgba8();
        if self.flip_vertical {
            imageops::flip_vertical_in_place(&mut rgba);
        }
        Ok(DecodedImage { rgba, channels })
    }
}

/// Pixels of a decoded image, always expanded to RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    rgba: RgbaImage,
    channels: u8,
}

impl DecodedImage {
    /// A `width` x `height` image filled with one color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            rgba: RgbaImage::from_pixel(width, height, image::Rgba(rgba)),
            channels: 4,
        }
    }

    /// Tightly packed RGBA8 rows.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        self.rgba.as_raw()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    /// Channel count of the source file (3 for RGB, 4 for RGBA, ...).
    #[inline]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        (x < self.width() && y < self.height()).then(|| self.rgba.get_pixel(x, y).0)
    }

    /// The base image followed by successively halved levels down to 1x1.
    pub(crate) fn mip_chain(&self, levels: u32) -> Vec<RgbaImage> {
        let mut chain = Vec::with_capacity(levels as usize);
        chain.push(self.rgba.clone());
        for _ in 1..levels {
            let Some(prev) = chain.last() else { break };
            let w = (prev.width() / 2).max(1);
            let h = (prev.height() / 2).max(1);
            let next = imageops::resize(prev, w, h, FilterType::Triangle);
            chain.push(next);
        }
        chain
    }
}

/// Number of levels in a full mip chain for a `width` x `height` image.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Write;

    const RED: [u8; 3] = [255, 0, 0];
    const BLUE: [u8; 3] = [0, 0, 255];

    /// 1x2 RGB image: red on top, blue below.
    fn write_png() -> tempfile::NamedTempFile {
        let mut img = RgbImage::new(1, 2);
        img.put_pixel(0, 0, Rgb(RED));
        img.put_pixel(0, 1, Rgb(BLUE));

        let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        img.save(file.path()).unwrap();
        file
    }

    #[test]
    fn decodes_rgb_into_rgba() {
        let file = write_png();
        let img = ImageLoader::new().decode(file.path()).unwrap();

        assert_eq!((img.width(), img.height()), (1, 2));
        assert_eq!(img.channels(), 3);
        assert_eq!(img.pixels().len(), 8);
        assert_eq!(img.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(img.pixel(0, 1), Some([0, 0, 255, 255]));
    }

    #[test]
    fn flip_puts_bottom_row_first() {
        let file = write_png();
        let img = ImageLoader::flipped().decode(file.path()).unwrap();
        assert_eq!(img.pixel(0, 0), Some([0, 0, 255, 255]));
        assert_eq!(img.pixel(0, 1), Some([255, 0, 0, 255]));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"definitely not a png").unwrap();

        let err = ImageLoader::new().decode(file.path()).unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }), "{err:?}");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageLoader::new()
            .decode(dir.path().join("container.jpg"))
            .unwrap_err();
        assert!(matches!(err, TextureError::Io { .. }), "{err:?}");
    }

    #[test]
    fn mip_level_count_reaches_one_texel() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(512, 512), 10);
        assert_eq!(mip_level_count(800, 600), 10);
        assert_eq!(mip_level_count(0, 0), 1);
    }

    #[test]
    fn mip_chain_halves_each_level() {
        let img = DecodedImage::solid(4, 2, [10, 20, 30, 255]);
        let chain = img.mip_chain(mip_level_count(4, 2));
        let sizes: Vec<(u32, u32)> = chain.iter().map(|l| l.dimensions()).collect();
        assert_eq!(sizes, vec![(4, 2), (2, 1), (1, 1)]);
        let last = chain[2].get_pixel(0, 0).0;
        for (got, want) in last.iter().zip([10u8, 20, 30, 255]) {
            assert!(got.abs_diff(want) <= 1, "{last:?}");
        }
    }
}
