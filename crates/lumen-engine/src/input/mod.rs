//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types. The runtime
//! translates window events into `InputEvent`s through `platform::winit`.

mod frame;
pub(crate) mod platform;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{InputEvent, Key, KeyState};
