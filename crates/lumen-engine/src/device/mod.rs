//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue (`GpuDevice`)
//! - creating and configuring the window Surface, tracking the viewport (`Gpu`)
//! - acquiring frames and copying GPU buffers back for inspection

mod context;
mod error;
mod frame;
mod gpu;
mod init;
pub mod readback;
mod surface;

pub use context::GpuDevice;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
pub use readback::ReadbackError;
