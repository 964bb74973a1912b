//! Cooling control module.
//!
//! Speed channels, temperature/duty curves with their interpolation, and
//! duty estimation for devices that do not report duty.

mod channel;
mod controller;
mod curve;

pub use channel::Channel;
pub use controller::{AppliedCurves, fill_missing_duties};
pub use curve::{CurvePoint, SpeedCurve, duty_for_temperature};
