//! HID protocol implementation for NZXT Kraken X3/Z3 coolers.
//!
//! Low-level HID command constants, builders and response parsing, based on
//! the reverse-engineered protocol from liquidctl.

pub mod commands;
pub mod status;

pub use commands::*;
pub use status::*;
