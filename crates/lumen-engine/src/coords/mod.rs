//! Coordinate and transform types.
//!
//! Conventions follow the GL tutorials the demos are built from:
//! - vertex positions are authored in normalized device coordinates or in a
//!   right-handed world space transformed by column-major `Mat4`s
//! - the viewport is expressed in physical pixels with its origin at (0, 0)
//!
//! Clip-space depth is 0..1 (the wgpu convention), so projection helpers map
//! the near plane to 0 rather than -1.

mod mat4;
mod vec3;
mod viewport;

pub use mat4::Mat4;
pub use vec3::Vec3;
pub use viewport::Viewport;
