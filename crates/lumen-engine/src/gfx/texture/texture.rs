use std::path::Path;

use crate::device::GpuDevice;
use crate::gfx::ResourceId;

use super::image::{mip_level_count, DecodedImage, ImageLoader};
use super::options::TextureOptions;
use super::TextureError;

/// A sampled 2D RGBA8 texture with its view and sampler.
///
/// Destroyed when dropped.
#[derive(Debug)]
pub struct Texture {
    id: ResourceId,
    label: String,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl Texture {
    /// Uploads `image`, generating mip levels when `options.mipmaps` is set.
    pub fn from_image(
        gpu: &GpuDevice,
        label: &str,
        image: &DecodedImage,
        options: &TextureOptions,
    ) -> Result<Self, TextureError> {
        let max = gpu.device().limits().max_texture_dimension_2d;
        check_extent(image.width(), image.height(), max)?;
        Ok(Self::upload(gpu, label, image, options))
    }

    /// Decodes the file at `path` and uploads it.
    pub fn load(
        gpu: &GpuDevice,
        label: &str,
        loader: &ImageLoader,
        path: impl AsRef<Path>,
        options: &TextureOptions,
    ) -> Result<Self, TextureError> {
        let image = loader.decode(path)?;
        Self::from_image(gpu, label, &image, options)
    }

    /// Like [`load`](Self::load), but logs a failure and returns [`fallback`](Self::fallback).
    pub fn load_or_fallback(
        gpu: &GpuDevice,
        label: &str,
        loader: &ImageLoader,
        path: impl AsRef<Path>,
        options: &TextureOptions,
    ) -> Self {
        match Self::load(gpu, label, loader, path, options) {
            Ok(texture) => texture,
            Err(err) => {
                log::error!("texture `{label}`: {err}; using fallback");
                Self::fallback(gpu, label)
            }
        }
    }

    /// A 1x1 opaque white texture.
    pub fn fallback(gpu: &GpuDevice, label: &str) -> Self {
        let white = DecodedImage::solid(1, 1, [255; 4]);
        let options = TextureOptions::default().with_mipmaps(false);
        Self::upload(gpu, label, &white, &options)
    }

    fn upload(gpu: &GpuDevice, label: &str, image: &DecodedImage, options: &TextureOptions) -> Self {
        let (width, height) = (image.width(), image.height());
        let levels = if options.mipmaps {
            mip_level_count(width, height)
        } else {
            1
        };

        let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: options.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        for (level, pixels) in image.mip_chain(levels).iter().enumerate() {
            let (w, h) = pixels.dimensions();
            gpu.queue().write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                pixels.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * w),
                    rows_per_image: Some(h),
                },
                wgpu::Extent3d {
                    width: w,
                    height: h,
                    depth_or_array_layers: 1,
                },
            );
        }

        let border_supported = gpu.supports(wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER);
        if options.uses_border() && !border_supported {
            log::warn!("texture `{label}`: clamp-to-border is unsupported; clamping to edge");
        }
        let sampler = gpu
            .device()
            .create_sampler(&options.sampler_descriptor(border_supported));
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        log::debug!("uploaded texture `{label}`: {width}x{height}, {levels} mip level(s)");

        Self {
            id: ResourceId::next(),
            label: label.to_string(),
            texture,
            view,
            sampler,
        }
    }

    #[inline]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.texture.height()
    }

    #[inline]
    pub fn mip_level_count(&self) -> u32 {
        self.texture.mip_level_count()
    }

    /// The underlying texture, for copies and read-back.
    pub fn raw(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.texture.destroy();
        log::trace!("released texture `{}`", self.label);
    }
}

fn check_extent(width: u32, height: u32, max: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::Empty { width, height });
    }
    if width > max || height > max {
        return Err(TextureError::TooLarge { width, height, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_images_are_rejected() {
        assert!(matches!(
            check_extent(0, 16, 8192),
            Err(TextureError::Empty { width: 0, height: 16 })
        ));
        assert!(matches!(
            check_extent(16, 0, 8192),
            Err(TextureError::Empty { .. })
        ));
    }

    #[test]
    fn extent_is_bounded_by_the_device_limit() {
        assert!(check_extent(1, 1, 8192).is_ok());
        assert!(check_extent(8192, 8192, 8192).is_ok());
        assert!(matches!(
            check_extent(8193, 4, 8192),
            Err(TextureError::TooLarge { max: 8192, .. })
        ));
    }
}
