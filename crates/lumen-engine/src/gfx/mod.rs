//! Pipeline toolkit used by the lessons.
//!
//! - `shader`: compile two WGSL stages, link them into a program, stage uniforms
//! - `vertex`: interleaved float layouts and the vertex array that owns the buffers
//! - `texture`: image decoding, sampler options and GPU upload
//! - `pass`: the draw pass that binds programs, textures and vertex arrays
//!
//! Every GPU object carries a [`ResourceId`]; the draw pass compares ids to skip
//! redundant binds.

mod id;
pub mod pass;
pub mod shader;
pub mod texture;
pub mod vertex;

pub use id::ResourceId;
pub use pass::{ActiveProgram, DrawError, DrawPass, PolygonMode, MAX_TEXTURE_UNITS};
pub use shader::{ShaderError, ShaderProgram, ShaderSource, ShaderStage};
pub use texture::{
    DecodedImage, FilterMode, ImageLoader, Texture, TextureError, TextureOptions, WrapMode,
};
pub use vertex::{VertexArray, VertexAttribute, VertexError, VertexLayout};
