//! Lumen engine crate.
//!
//! Owns the window runtime, the GPU device and the small pipeline toolkit
//! (shader programs, vertex arrays, textures, draw passes) the lesson demos
//! are written against.

pub mod core;
pub mod coords;
pub mod device;
pub mod error;
pub mod gfx;
pub mod input;
pub mod logging;
pub mod paint;
pub mod time;
pub mod window;
