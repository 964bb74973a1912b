//! Device families supported by the controller.
//!
//! Static per-family knowledge: USB ids, where each telemetry value sits in a
//! raw status report, and which lighting modes the family accepts.

pub mod family;
pub mod lighting;
pub mod status;

pub use family::{DeviceFamily, StatusField, StatusFieldMap};
pub use lighting::{
    LightingChannel, LightingCommand, LightingDirection, LightingMode, LightingModes,
    LightingRequest, LightingSpeed, Rgb, compatible_lighting_modes,
};
pub use status::{Status, decode, resolve};
