use crate::device::GpuDevice;
use crate::gfx::ResourceId;

use super::reflect::UniformBlock;
use super::uniforms::UniformStore;

/// Slots a ring starts with; doubled whenever a pass runs out.
const INITIAL_SLOTS: u32 = 4;

/// Where the next draw reads its uniforms from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum SlotStep {
    /// Nothing changed since the previous draw of this pass.
    Reuse,
    /// Upload a snapshot into `slot`; `grow` when the ring must get bigger first.
    Write { slot: u32, grow: bool },
}

/// Slot bookkeeping, separate from the GPU buffers.
///
/// The first draw of a pass writes slot 0; every later draw in the same pass
/// that follows a uniform write takes the next slot. Slots are reused by the
/// next pass, which must therefore belong to a later queue submission.
#[derive(Debug)]
pub(crate) struct SlotCursor {
    pass: Option<ResourceId>,
    slot: u32,
    capacity: u32,
}

impl SlotCursor {
    pub fn new(capacity: u32) -> Self {
        Self {
            pass: None,
            slot: 0,
            capacity,
        }
    }

    pub fn step(&mut self, pass: ResourceId, dirty: bool) -> SlotStep {
        if self.pass != Some(pass) {
            self.pass = Some(pass);
            self.slot = 0;
        } else if dirty {
            self.slot += 1;
        } else {
            return SlotStep::Reuse;
        }

        let grow = self.slot >= self.capacity;
        if grow {
            self.capacity = (self.capacity * 2).max(self.slot + 1);
        }
        SlotStep::Write {
            slot: self.slot,
            grow,
        }
    }

    #[inline]
    pub fn slot(&self) -> u32 {
        self.slot
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

struct RingBuffer {
    name: String,
    binding: u32,
    size: u64,
    stride: u64,
    buffer: wgpu::Buffer,
}

/// Uniform buffers of one program, bound with dynamic offsets.
pub(crate) struct UniformRing {
    label: String,
    buffers: Vec<RingBuffer>,
    cursor: SlotCursor,
    /// Bumped when the buffers are replaced; bind groups built before are stale.
    generation: u64,
}

impl UniformRing {
    pub fn new(gpu: &GpuDevice, label: &str, blocks: &[UniformBlock]) -> Self {
        let align = gpu.device().limits().min_uniform_buffer_offset_alignment as u64;

        let mut sorted: Vec<&UniformBlock> = blocks.iter().collect();
        sorted.sort_by_key(|b| b.binding);

        let cursor = SlotCursor::new(INITIAL_SLOTS);
        let buffers = sorted
            .into_iter()
            .map(|block| {
                let size = block.size as u64;
                let stride = size.div_ceil(align) * align;
                RingBuffer {
                    name: block.name.clone(),
                    binding: block.binding,
                    size,
                    stride,
                    buffer: create_buffer(gpu, label, &block.name, stride * cursor.capacity() as u64),
                }
            })
            .collect();

        Self {
            label: label.to_string(),
            buffers,
            cursor,
            generation: 0,
        }
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Uploads `store` if this draw needs a fresh snapshot.
    pub fn stage(&mut self, gpu: &GpuDevice, pass: ResourceId, store: &mut UniformStore) {
        if self.buffers.is_empty() {
            return;
        }

        let SlotStep::Write { slot, grow } = self.cursor.step(pass, store.is_dirty()) else {
            return;
        };

        if grow {
            let capacity = self.cursor.capacity() as u64;
            for ring in &mut self.buffers {
                ring.buffer = create_buffer(gpu, &self.label, &ring.name, ring.stride * capacity);
            }
            self.generation += 1;
            log::debug!(
                "program `{}`: uniform ring grown to {capacity} slots",
                self.label
            );
        }

        let buffers = &self.buffers;
        store.take(|binding, bytes| {
            if let Some(ring) = buffers.iter().find(|r| r.binding == binding) {
                gpu.queue()
                    .write_buffer(&ring.buffer, slot as u64 * ring.stride, bytes);
            }
        });
    }

    /// Offsets for `set_bind_group`, in binding order.
    pub fn dynamic_offsets(&self) -> Vec<u32> {
        let slot = self.cursor.slot() as u64;
        self.buffers
            .iter()
            .map(|ring| (slot * ring.stride) as u32)
            .collect()
    }

    /// Binding resource covering one slot of the block at `binding`.
    pub fn binding_resource(&self, binding: u32) -> Option<wgpu::BindingResource<'_>> {
        let ring = self.buffers.iter().find(|r| r.binding == binding)?;
        Some(wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer: &ring.buffer,
            offset: 0,
            size: wgpu::BufferSize::new(ring.size),
        }))
    }
}

fn create_buffer(gpu: &GpuDevice, label: &str, block: &str, size: u64) -> wgpu::Buffer {
    gpu.device().create_buffer(&wgpu::BufferDescriptor {
        label: Some(&format!("{label} uniform `{block}`")),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
