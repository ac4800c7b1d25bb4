//! Copies GPU buffers and textures back to the CPU.
//!
//! Used to inspect uploaded vertex data and offscreen render results. Every
//! call blocks until the copy has completed.

use std::sync::mpsc;

use thiserror::Error;

use super::GpuDevice;

/// Failures while mapping a staging buffer.
#[derive(Debug, Error)]
pub enum ReadbackError {
    #[error("failed to map staging buffer: {0}")]
    Map(#[from] wgpu::BufferAsyncError),

    #[error("device poll failed: {0}")]
    Poll(String),

    #[error("map callback was dropped before completion")]
    Disconnected,

    #[error("texture format {0:?} is not a 4-byte-per-texel color format")]
    UnsupportedFormat(wgpu::TextureFormat),
}

/// Rows copied out of a texture must start on this byte boundary.
const ROW_ALIGNMENT: u32 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

/// Reads `size` bytes of `source` starting at offset 0.
///
/// `source` must have been created with `COPY_SRC` usage.
pub fn read_buffer(
    gpu: &GpuDevice,
    source: &wgpu::Buffer,
    size: u64,
) -> Result<Vec<u8>, ReadbackError> {
    let staging = gpu.device().create_buffer(&wgpu::BufferDescriptor {
        label: Some("lumen readback staging"),
        size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = gpu
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("lumen readback encoder"),
        });
    encoder.copy_buffer_to_buffer(source, 0, &staging, 0, size);
    gpu.queue().submit(std::iter::once(encoder.finish()));

    map_staging(gpu, &staging)
}

/// Reads the first mip level of an RGBA8/BGRA8 texture as tightly packed rows.
///
/// `texture` must have been created with `COPY_SRC` usage.
pub fn read_texture(gpu: &GpuDevice, texture: &wgpu::Texture) -> Result<Vec<u8>, ReadbackError> {
    let format = texture.format();
    if format.block_copy_size(None) != Some(4) {
        return Err(ReadbackError::UnsupportedFormat(format));
    }

    let width = texture.width();
    let height = texture.height();
    let tight_row = width * 4;
    let padded_row = tight_row.div_ceil(ROW_ALIGNMENT) * ROW_ALIGNMENT;

    let staging = gpu.device().create_buffer(&wgpu::BufferDescriptor {
        label: Some("lumen texture readback staging"),
        size: padded_row as u64 * height as u64,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = gpu
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("lumen texture readback encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    gpu.queue().submit(std::iter::once(encoder.finish()));

    let padded = map_staging(gpu, &staging)?;

    let mut pixels = Vec::with_capacity((tight_row * height) as usize);
    for row in padded.chunks_exact(padded_row as usize) {
        pixels.extend_from_slice(&row[..tight_row as usize]);
    }
    Ok(pixels)
}

fn map_staging(gpu: &GpuDevice, staging: &wgpu::Buffer) -> Result<Vec<u8>, ReadbackError> {
    let slice = staging.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        // The receiver outlives the poll below; a send failure only means it gave up.
        let _ = tx.send(result);
    });

    gpu.device()
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| ReadbackError::Poll(e.to_string()))?;

    rx.recv().map_err(|_| ReadbackError::Disconnected)??;

    let bytes = slice.get_mapped_range().to_vec();
    staging.unmap();
    Ok(bytes)
}
