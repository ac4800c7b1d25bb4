//! Startup error taxonomy.
//!
//! Shader, texture, vertex and draw errors live next to the code that raises
//! them (`gfx::shader`, `gfx::texture`, `gfx::vertex`, `gfx::pass`). The errors
//! here are the ones that abort startup.

use thiserror::Error;

/// Fatal initialization failures.
#[derive(Debug, Error)]
pub enum InitError {
    /// The windowing layer refused to create the window.
    #[error("failed to create window: {0}")]
    WindowCreation(String),

    /// No usable graphics adapter, device or surface could be obtained.
    #[error("failed to initialize graphics: {0}")]
    GraphicsInit(String),
}
