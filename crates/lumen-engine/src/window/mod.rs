//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single Window, and wires them to the GPU
//! layer and the render-loop state machine.

mod runtime;

pub use runtime::{LoopEvent, LoopState, Runtime, RuntimeConfig};
