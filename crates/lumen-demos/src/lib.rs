//! Shared pieces of the lesson binaries.
//!
//! Every binary under `src/bin` is one lesson. They share asset lookup, the
//! geometry tables, the per-frame [`RenderParams`] and the [`run_demo`]
//! launcher; everything else stays in the lesson's own file.

pub mod assets;
pub mod geometry;
mod launch;
pub mod params;

pub use assets::AssetDir;
pub use launch::{run_demo, WINDOW_TITLE};
pub use params::RenderParams;
