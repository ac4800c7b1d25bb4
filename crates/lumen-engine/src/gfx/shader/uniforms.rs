use crate::coords::Mat4;
use crate::paint::Color;

use super::reflect::{ScalarType, UniformBlock, ValueType};

/// A value written to a named uniform.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    F32(f32),
    I32(i32),
    U32(u32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4(Mat4),
}

impl UniformValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            UniformValue::F32(_) => ValueType::Scalar(ScalarType::F32),
            UniformValue::I32(_) => ValueType::Scalar(ScalarType::I32),
            UniformValue::U32(_) => ValueType::Scalar(ScalarType::U32),
            UniformValue::Vec2(_) => vector(2),
            UniformValue::Vec3(_) => vector(3),
            UniformValue::Vec4(_) => vector(4),
            UniformValue::Mat4(_) => ValueType::Matrix {
                columns: 4,
                rows: 4,
            },
        }
    }

    fn write_bytes(&self, dst: &mut [u8]) {
        match self {
            UniformValue::F32(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::I32(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::U32(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Vec2(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Vec3(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Vec4(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Mat4(m) => dst.copy_from_slice(m.as_bytes()),
        }
    }
}

fn vector(size: u8) -> ValueType {
    ValueType::Vector {
        size,
        scalar: ScalarType::F32,
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::F32(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(m: Mat4) -> Self {
        UniformValue::Mat4(m)
    }
}

impl From<Color> for UniformValue {
    fn from(c: Color) -> Self {
        UniformValue::Vec4(c.to_array())
    }
}

/// Result of a uniform write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UniformWrite {
    Written,
    /// No uniform with that name; nothing changed.
    Unresolved,
    /// The uniform exists with a different type; nothing changed.
    TypeMismatch { expected: ValueType },
}

#[derive(Debug)]
struct ShadowBlock {
    layout: UniformBlock,
    bytes: Vec<u8>,
    dirty: bool,
}

/// CPU copy of a program's uniform buffers.
///
/// Writes land here and are snapshotted by the next draw that uses the
/// program, so each draw sees the values written before it.
#[derive(Debug, Default)]
pub struct UniformStore {
    blocks: Vec<ShadowBlock>,
}

impl UniformStore {
    /// Zero-initialized storage for `blocks`.
    pub fn new(blocks: &[UniformBlock]) -> Self {
        Self {
            blocks: blocks
                .iter()
                .map(|layout| ShadowBlock {
                    bytes: vec![0; layout.size as usize],
                    layout: layout.clone(),
                    dirty: false,
                })
                .collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blocks.iter().any(|b| b.layout.field(name).is_some())
    }

    /// Type of the named uniform.
    pub fn field_type(&self, name: &str) -> Option<ValueType> {
        self.blocks
            .iter()
            .find_map(|b| b.layout.field(name))
            .map(|f| f.ty)
    }

    pub fn write(&mut self, name: &str, value: UniformValue) -> UniformWrite {
        for block in &mut self.blocks {
            let Some(field) = block.layout.field(name) else {
                continue;
            };
            if field.ty != value.value_type() {
                return UniformWrite::TypeMismatch { expected: field.ty };
            }

            let start = field.offset as usize;
            let end = start + field.ty.size() as usize;
            value.write_bytes(&mut block.bytes[start..end]);
            block.dirty = true;
            return UniformWrite::Written;
        }
        UniformWrite::Unresolved
    }

    /// Current bytes of the named uniform.
    pub fn read(&self, name: &str) -> Option<&[u8]> {
        self.blocks.iter().find_map(|b| {
            let field = b.layout.field(name)?;
            let start = field.offset as usize;
            Some(&b.bytes[start..start + field.ty.size() as usize])
        })
    }

    pub fn is_dirty(&self) -> bool {
        self.blocks.iter().any(|b| b.dirty)
    }

    /// Hands every block to `upload` as `(binding, bytes)` and marks the store clean.
    pub fn take(&mut self, mut upload: impl FnMut(u32, &[u8])) {
        for block in &mut self.blocks {
            upload(block.layout.binding, &block.bytes);
            block.dirty = false;
        }
    }
}
