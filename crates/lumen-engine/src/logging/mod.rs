//! Logging utilities.
//!
//! Demos and engine code log through the `log` facade; this module only owns
//! the one-time backend setup.

mod init;

pub use init::{init_logging, LoggingConfig};
