//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and
//! the lesson demos: the `App` callbacks and the contexts passed to them.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{DrawErrorLatch, FrameCtx, StartCtx};
