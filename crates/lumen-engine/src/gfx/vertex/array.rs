use wgpu::util::DeviceExt;

use crate::device::readback::{self, ReadbackError};
use crate::device::GpuDevice;
use crate::gfx::ResourceId;

use super::layout::{VertexError, VertexLayout};

#[derive(Debug)]
struct IndexBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

/// Interleaved float vertices, an optional `u32` index list and their layout.
///
/// Immutable after upload. Buffers are destroyed when the array is dropped.
///
/// Every index must be smaller than the vertex count. This is not checked;
/// out-of-range indices produce undefined geometry on the GPU.
#[derive(Debug)]
pub struct VertexArray {
    id: ResourceId,
    label: String,
    layout: VertexLayout,
    vertices: wgpu::Buffer,
    vertex_count: u32,
    indices: Option<IndexBuffer>,
}

impl VertexArray {
    /// Validates `data` against `layout` and copies it (and `indices`) to the GPU.
    pub fn upload(
        gpu: &GpuDevice,
        label: &str,
        data: &[f32],
        layout: VertexLayout,
        indices: Option<&[u32]>,
    ) -> Result<Self, VertexError> {
        layout.validate()?;
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let vertex_count = layout.vertex_count(bytes.len() as u64)?;

        if matches!(indices, Some([])) {
            return Err(VertexError::EmptyIndices);
        }

        let vertices = gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} vertices")),
                contents: bytes,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_SRC,
            });

        let indices = indices.map(|idx| IndexBuffer {
            buffer: gpu
                .device()
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{label} indices")),
                    contents: bytemuck::cast_slice(idx),
                    usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_SRC,
                }),
            count: idx.len() as u32,
        });

        log::debug!(
            "uploaded vertex array `{label}`: {vertex_count} vertices, stride {}, {} indices",
            layout.stride,
            indices.as_ref().map_or(0, |i| i.count)
        );

        Ok(Self {
            id: ResourceId::next(),
            label: label.to_string(),
            layout,
            vertices,
            vertex_count,
            indices,
        })
    }

    #[inline]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Index count, or `None` for a sequential draw.
    #[inline]
    pub fn index_count(&self) -> Option<u32> {
        self.indices.as_ref().map(|i| i.count)
    }

    pub(crate) fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertices
    }

    pub(crate) fn index_buffer(&self) -> Option<&wgpu::Buffer> {
        self.indices.as_ref().map(|i| &i.buffer)
    }

    /// Copies the vertex buffer back to the CPU.
    pub fn read_back(&self, gpu: &GpuDevice) -> Result<Vec<f32>, ReadbackError> {
        let bytes = readback::read_buffer(gpu, &self.vertices, self.vertices.size())?;
        Ok(bytemuck::pod_collect_to_vec(&bytes))
    }

    /// Copies the index buffer back to the CPU.
    pub fn read_back_indices(&self, gpu: &GpuDevice) -> Result<Option<Vec<u32>>, ReadbackError> {
        let Some(indices) = &self.indices else {
            return Ok(None);
        };
        let bytes = readback::read_buffer(gpu, &indices.buffer, indices.buffer.size())?;
        Ok(Some(bytemuck::pod_collect_to_vec(&bytes)))
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        self.vertices.destroy();
        if let Some(indices) = &self.indices {
            indices.buffer.destroy();
        }
        log::trace!("released vertex array `{}`", self.label);
    }
}
