//! Textures: decoding, sampler options and GPU upload.

mod image;
mod options;
mod texture;

use std::path::PathBuf;

use thiserror::Error;

pub use self::image::{mip_level_count, DecodedImage, ImageLoader};
pub use options::{FilterMode, TextureOptions, WrapMode};
pub use texture::Texture;

/// Failures while turning an image file into a texture.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to read image {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },

    #[error("image is {width}x{height}; textures need at least one texel per side")]
    Empty { width: u32, height: u32 },

    #[error("image is {width}x{height}; the device allows at most {max} texels per side")]
    TooLarge { width: u32, height: u32, max: u32 },
}
