//! Color values used for clearing and as uniform inputs.

mod color;

pub use color::Color;
