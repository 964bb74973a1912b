//! Custom error types for NZXT Kraken control.
//!
//! Two layers: [`DriverError`] is what a hardware driver surfaces while talking
//! to the device, [`KrakenError`] is what the library hands to its callers.
//! Only transport failures (`Hid`, `Io`, `Timeout`) become
//! [`KrakenError::Communication`]. Malformed responses, refused commands and
//! unsupported operations map to their own variants and leave the device
//! handle open.

use thiserror::Error;

/// Errors raised by a device driver during USB communication.
#[derive(Error, Debug)]
pub enum DriverError {
    /// HID communication error.
    #[error("HID communication error: {0}")]
    Hid(#[from] hidapi::HidError),

    /// OS-level I/O error (permissions, disconnected cable, ...).
    #[error("USB I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed response from device.
    #[error("Invalid response from device: {message}")]
    InvalidResponse { message: String },

    /// A command could not be encoded for the device.
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Timeout waiting for device response.
    #[error("Timeout waiting for device response")]
    Timeout,

    /// The driver does not implement the requested command.
    #[error("Operation not supported by {device}: {operation}")]
    Unsupported { device: String, operation: String },
}

impl DriverError {
    /// Whether the error comes from the USB transport rather than the device's answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            DriverError::Hid(_) | DriverError::Io(_) | DriverError::Timeout
        )
    }
}

/// Main error type for Kraken control operations.
#[derive(Error, Debug)]
pub enum KrakenError {
    /// No supported device found during enumeration.
    #[error("No supported NZXT Kraken found. Check USB connection and permissions.")]
    DeviceUnavailable,

    /// Transport error raised during an in-progress operation.
    #[error("Unable to communicate with the Kraken: {0}")]
    Communication(#[source] DriverError),

    /// The device or its driver cannot perform the requested operation.
    #[error("Operation not supported by {device}: {operation}")]
    Unsupported { device: String, operation: String },

    /// The driver refused to encode a command.
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// A handle was obtained but no device family matches it.
    #[error("Driver instance is not recognized: {vendor_id:04x}:{product_id:04x}")]
    UnrecognizedDevice { vendor_id: u16, product_id: u16 },

    /// A decoded status was rejected by a family-specific rule.
    #[error("Invalid reading: {0}")]
    InvalidReading(String),

    /// Duty cycle value out of valid range.
    #[error("Invalid duty cycle {value}% for {channel}. Valid range: {min}%-{max}%")]
    InvalidDuty {
        channel: String,
        value: u8,
        min: u8,
        max: u8,
    },

    /// Temperature value out of valid range for profile.
    #[error("Invalid temperature {value}°C. Valid range: {min}-{max}°C")]
    InvalidTemperature { value: u8, min: u8, max: u8 },

    /// Speed profile has invalid format.
    #[error("Invalid speed profile: {0}")]
    InvalidProfile(String),

    /// No stored profile with this id.
    #[error("Speed profile {0} not found")]
    ProfileNotFound(u32),

    /// Built-in profiles cannot be edited or deleted.
    #[error("Speed profile {0} is read-only")]
    ReadOnlyProfile(u32),

    /// Lighting mode id not advertised by the device family.
    #[error("Lighting mode {mode_id} is not supported on the {channel} channel")]
    UnsupportedLightingMode { channel: String, mode_id: u8 },

    /// Number of colors outside the mode's accepted range.
    #[error("Lighting mode '{mode}' takes {min}-{max} colors, got {count}")]
    InvalidColorCount {
        mode: String,
        count: usize,
        min: u8,
        max: u8,
    },

    /// Profile store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Profile store content could not be (de)serialized.
    #[error("Storage format error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic invalid input error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl KrakenError {
    /// Whether this error comes from the USB transport.
    ///
    /// Callers should stop polling and point the user at permissions / udev
    /// rules when this returns `true`.
    pub fn is_communication(&self) -> bool {
        matches!(self, KrakenError::Communication(_))
    }
}

impl From<DriverError> for KrakenError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::InvalidResponse { message } => KrakenError::InvalidReading(message),
            DriverError::InvalidCommand(message) => KrakenError::InvalidCommand(message),
            DriverError::Unsupported { device, operation } => {
                KrakenError::Unsupported { device, operation }
            }
            transport => KrakenError::Communication(transport),
        }
    }
}

/// Result type alias for Kraken operations.
pub type Result<T> = std::result::Result<T, KrakenError>;
