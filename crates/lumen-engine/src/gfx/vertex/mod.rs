//! Vertex data upload.

mod array;
mod layout;

pub use array::VertexArray;
pub use layout::{VertexAttribute, VertexError, VertexLayout};
