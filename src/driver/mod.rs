//! Hardware driver boundary.
//!
//! The repository never talks USB itself. It works against [`DeviceDriver`]
//! handles handed out by a [`DriverProvider`], and exchanges plain
//! `(label, value, unit)` telemetry tuples and duty/color commands with them.

pub mod kraken3;
#[cfg(test)]
pub(crate) mod testing;

pub use kraken3::{HidProvider, Kraken3Driver};

use crate::cooling::Channel;
use crate::device::lighting::{LightingChannel, LightingDirection, LightingSpeed, Rgb};
use crate::error::DriverError;

/// Result type alias for driver calls.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

// =============================================================================
// Telemetry Tuples
// =============================================================================

/// A single reported value.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusValue {
    Number(f64),
    Text(String),
    Missing,
}

impl StatusValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StatusValue::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }
}

impl From<f64> for StatusValue {
    fn from(value: f64) -> Self {
        StatusValue::Number(value)
    }
}

impl From<u32> for StatusValue {
    fn from(value: u32) -> Self {
        StatusValue::Number(value as f64)
    }
}

impl From<&str> for StatusValue {
    fn from(value: &str) -> Self {
        StatusValue::Text(value.to_string())
    }
}

impl<T: Into<StatusValue>> From<Option<T>> for StatusValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(StatusValue::Missing)
    }
}

/// One `(label, value, unit)` telemetry tuple as reported by a driver.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEntry {
    pub label: String,
    pub value: StatusValue,
    pub unit: String,
}

impl StatusEntry {
    pub fn new(label: &str, value: impl Into<StatusValue>, unit: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
            unit: unit.to_string(),
        }
    }
}

// =============================================================================
// Driver Traits
// =============================================================================

/// A connectable handle to one physical cooler.
pub trait DeviceDriver: Send {
    /// USB `(vendor_id, product_id)` of the device behind this handle.
    fn usb_id(&self) -> (u16, u16);

    /// Human readable device name.
    fn description(&self) -> String;

    /// Open and initialize the device.
    ///
    /// Returns the firmware version when the device reports it in its init
    /// response instead of the periodic status.
    fn connect(&mut self) -> DriverResult<Option<String>>;

    fn disconnect(&mut self) -> DriverResult<()>;

    fn get_status(&mut self) -> DriverResult<Vec<StatusEntry>>;

    fn set_fixed_duty(&mut self, channel: Channel, duty: u8) -> DriverResult<()>;

    fn set_profile(&mut self, channel: Channel, points: &[(u8, u8)]) -> DriverResult<()>;

    fn set_color(
        &mut self,
        channel: LightingChannel,
        mode: &str,
        colors: &[Rgb],
        speed: LightingSpeed,
        direction: LightingDirection,
    ) -> DriverResult<()>;
}

/// Enumerates connectable handles for every supported device.
pub trait DriverProvider: Send + Sync {
    fn find_supported(&self) -> DriverResult<Vec<Box<dyn DeviceDriver>>>;
}

impl<F> DriverProvider for F
where
    F: Fn() -> DriverResult<Vec<Box<dyn DeviceDriver>>> + Send + Sync,
{
    fn find_supported(&self) -> DriverResult<Vec<Box<dyn DeviceDriver>>> {
        self()
    }
}
