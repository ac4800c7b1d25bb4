//! Draw passes.
//!
//! A [`DrawPass`] wraps one render pass that clears its target and then
//! records draws. Programs are made current with [`DrawPass::use_program`];
//! the returned [`ActiveProgram`] is the only way to write uniforms or draw.

mod active;
mod bind_state;
mod draw;

use thiserror::Error;

pub use active::ActiveProgram;
pub use bind_state::BindState;
pub use draw::DrawPass;

use crate::gfx::ResourceId;

/// Number of texture units a pass exposes.
pub const MAX_TEXTURE_UNITS: usize = 16;

/// Rasterization mode for subsequent draws.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum PolygonMode {
    #[default]
    Fill,
    /// Triangle outlines. Needs `Features::POLYGON_MODE_LINE`.
    Line,
}

impl PolygonMode {
    pub(crate) fn to_wgpu(self) -> wgpu::PolygonMode {
        match self {
            PolygonMode::Fill => wgpu::PolygonMode::Fill,
            PolygonMode::Line => wgpu::PolygonMode::Line,
        }
    }
}

/// A texture bound to a unit for the rest of the pass.
#[derive(Debug, Clone)]
pub(crate) struct BoundTexture {
    pub id: ResourceId,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// A draw that was rejected. The pass stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("program `{program}` failed to build; draw skipped")]
    InvalidProgram { program: String },

    #[error("program `{program}` cannot draw `{vertices}`: {reason}")]
    LayoutMismatch {
        program: String,
        vertices: String,
        reason: String,
    },

    #[error("program `{program}` samples `{texture}` from texture unit {unit}, but no texture is bound there")]
    MissingTexture {
        program: String,
        texture: String,
        unit: u32,
    },

    #[error("texture unit {unit} is out of range (0..{MAX_TEXTURE_UNITS})")]
    TextureUnit { unit: u32 },

    #[error("program `{program}`: render pipeline rejected by the device: {message}")]
    Pipeline { program: String, message: String },
}
