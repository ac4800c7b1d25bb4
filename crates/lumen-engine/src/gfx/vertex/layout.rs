use thiserror::Error;

use crate::gfx::shader::IoVariable;

const FLOAT_SIZE: u64 = std::mem::size_of::<f32>() as u64;

/// Layout or data problems detected at upload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VertexError {
    #[error("vertex data is empty")]
    EmptyData,

    #[error("index data is present but empty")]
    EmptyIndices,

    #[error("layout has no attributes")]
    NoAttributes,

    #[error("stride {stride} is not a non-zero multiple of 4 bytes")]
    InvalidStride { stride: u64 },

    #[error("attribute {location} has {components} components; expected 1..=4")]
    ComponentCount { location: u32, components: u8 },

    #[error("attribute {location} at offset {offset} is not 4-byte aligned")]
    UnalignedOffset { location: u32, offset: u64 },

    #[error("attribute {location} ({offset}..{end}) does not fit in stride {stride}")]
    AttributeOutOfBounds {
        location: u32,
        offset: u64,
        end: u64,
        stride: u64,
    },

    #[error("attribute location {location} is declared twice")]
    DuplicateLocation { location: u32 },

    #[error("{bytes} bytes of vertex data is not a whole number of {stride}-byte vertices")]
    PartialVertex { bytes: u64, stride: u64 },
}

/// One float attribute inside an interleaved vertex.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Shader input `@location`.
    pub location: u32,
    /// Float components, 1..=4.
    pub components: u8,
    /// Byte offset from the start of the vertex.
    pub offset: u64,
}

impl VertexAttribute {
    pub const fn new(location: u32, components: u8, offset: u64) -> Self {
        Self {
            location,
            components,
            offset,
        }
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.components as u64 * FLOAT_SIZE
    }

    fn format(&self) -> wgpu::VertexFormat {
        match self.components {
            1 => wgpu::VertexFormat::Float32,
            2 => wgpu::VertexFormat::Float32x2,
            3 => wgpu::VertexFormat::Float32x3,
            _ => wgpu::VertexFormat::Float32x4,
        }
    }
}

/// Byte stride plus the attributes of one vertex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    pub stride: u64,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn new(stride: u64, attributes: Vec<VertexAttribute>) -> Self {
        Self { stride, attributes }
    }

    /// Tightly packed attributes at locations `0..n`.
    ///
    /// `interleaved(&[3, 2])` is position then texture coordinate, 20 bytes per vertex.
    pub fn interleaved(components: &[u8]) -> Result<Self, VertexError> {
        let mut attributes = Vec::with_capacity(components.len());
        let mut offset = 0;
        for (location, &n) in components.iter().enumerate() {
            let attr = VertexAttribute::new(location as u32, n, offset);
            offset += attr.size();
            attributes.push(attr);
        }
        let layout = Self::new(offset, attributes);
        layout.validate()?;
        Ok(layout)
    }

    /// Checks stride, alignment, bounds and location uniqueness.
    pub fn validate(&self) -> Result<(), VertexError> {
        if self.attributes.is_empty() {
            return Err(VertexError::NoAttributes);
        }
        if self.stride == 0 || self.stride % FLOAT_SIZE != 0 {
            return Err(VertexError::InvalidStride {
                stride: self.stride,
            });
        }

        for (i, attr) in self.attributes.iter().enumerate() {
            if !(1..=4).contains(&attr.components) {
                return Err(VertexError::ComponentCount {
                    location: attr.location,
                    components: attr.components,
                });
            }
            if attr.offset % FLOAT_SIZE != 0 {
                return Err(VertexError::UnalignedOffset {
                    location: attr.location,
                    offset: attr.offset,
                });
            }
            let end = attr.offset + attr.size();
            if end > self.stride {
                return Err(VertexError::AttributeOutOfBounds {
                    location: attr.location,
                    offset: attr.offset,
                    end,
                    stride: self.stride,
                });
            }
            if self.attributes[..i]
                .iter()
                .any(|a| a.location == attr.location)
            {
                return Err(VertexError::DuplicateLocation {
                    location: attr.location,
                });
            }
        }
        Ok(())
    }

    /// Number of whole vertices in `bytes` of data.
    pub fn vertex_count(&self, bytes: u64) -> Result<u32, VertexError> {
        if bytes == 0 {
            return Err(VertexError::EmptyData);
        }
        if bytes % self.stride != 0 {
            return Err(VertexError::PartialVertex {
                bytes,
                stride: self.stride,
            });
        }
        Ok((bytes / self.stride) as u32)
    }

    pub fn attribute(&self, location: u32) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.location == location)
    }

    /// The wgpu attributes feeding `inputs`, or a description of the first mismatch.
    ///
    /// Attributes the shader does not read are left out of the pipeline.
    pub(crate) fn attributes_for(
        &self,
        inputs: &[IoVariable],
    ) -> Result<Vec<wgpu::VertexAttribute>, String> {
        inputs
            .iter()
            .map(|input| {
                let Some(wanted) = input.ty.float_components() else {
                    return Err(format!(
                        "vertex input {} is {}; only float attributes can be uploaded",
                        input.describe(),
                        input.ty
                    ));
                };
                let attr = self.attribute(input.location).ok_or_else(|| {
                    format!(
                        "vertex input {} has no attribute in the layout",
                        input.describe()
                    )
                })?;
                if attr.components != wanted {
                    return Err(format!(
                        "vertex input {} reads {} but the layout provides {} component(s)",
                        input.describe(),
                        input.ty,
                        attr.components
                    ));
                }
                Ok(wgpu::VertexAttribute {
                    format: attr.format(),
                    offset: attr.offset,
                    shader_location: attr.location,
                })
            })
            .collect()
    }
}
