//! Shader programs.
//!
//! A program is built in three steps: each WGSL stage is parsed and validated
//! on its own ([`compile_stage`]), the two stages are checked against each
//! other ([`link`]), and the linked modules become GPU shader modules plus a
//! lazily filled render-pipeline cache ([`ShaderProgram`]).

mod compile;
mod error;
mod link;
mod program;
mod reflect;
mod source;
mod uniform_ring;
mod uniforms;

pub use compile::{compile_stage, CompiledStage};
pub use error::{ShaderError, ShaderStage};
pub use link::{link, LinkedStages, ProgramInterface, TextureSlot};
pub use program::ShaderProgram;
pub use reflect::{IoVariable, ScalarType, UniformBlock, UniformField, ValueType};
pub use source::ShaderSource;
pub use uniforms::{UniformStore, UniformValue, UniformWrite};

pub(crate) use program::PipelineKey;
