//! Status and firmware frame parsing for Kraken X3/Z3 coolers.

use crate::error::DriverError;
use crate::protocol::commands::{RESP_FIRMWARE, RESP_STATUS};

// =============================================================================
// Status Frame Offsets
// =============================================================================

const OFFSET_TEMP_INT: usize = 15;
const OFFSET_TEMP_DEC: usize = 16;
/// Pump RPM, little-endian.
const OFFSET_PUMP_RPM: usize = 17;
const OFFSET_PUMP_DUTY: usize = 19;
const OFFSET_FAN_DUTY: usize = 20;
/// Fan RPM, little-endian.
const OFFSET_FAN_RPM: usize = 23;

const STATUS_MIN_LENGTH: usize = 25;

/// Invalid temperature sentinel value (firmware fault indicator).
const INVALID_TEMP_SENTINEL: [u8; 2] = [0xFF, 0xFF];

/// Readings of one status frame.
///
/// X3 coolers have no fan header; their fan fields carry no meaning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusFrame {
    pub liquid_temp_c: f64,
    pub pump_rpm: u16,
    pub pump_duty: u8,
    pub fan_rpm: u16,
    pub fan_duty: u8,
}

/// Whether `buf` is a status frame.
pub fn is_status_frame(buf: &[u8]) -> bool {
    buf.starts_with(&RESP_STATUS)
}

fn read_u16_le(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

impl StatusFrame {
    /// Parse a `RESP_STATUS` frame.
    ///
    /// # Errors
    /// `InvalidResponse` for short or foreign frames, and for the 0xFFFF
    /// temperature the firmware sends when its sensor faults.
    pub fn parse(buf: &[u8]) -> Result<Self, DriverError> {
        if buf.len() < STATUS_MIN_LENGTH {
            return Err(DriverError::InvalidResponse {
                message: format!(
                    "Buffer too short: {} bytes, expected at least {}",
                    buf.len(),
                    STATUS_MIN_LENGTH
                ),
            });
        }

        if !is_status_frame(buf) {
            return Err(DriverError::InvalidResponse {
                message: format!("Unknown status header: [{:#04x}, {:#04x}]", buf[0], buf[1]),
            });
        }

        if buf[OFFSET_TEMP_INT..=OFFSET_TEMP_DEC] == INVALID_TEMP_SENTINEL {
            return Err(DriverError::InvalidResponse {
                message: "Invalid temperature reading (0xFFFF). Possible firmware fault. \
                          Try resetting the device or updating firmware."
                    .into(),
            });
        }

        Ok(StatusFrame {
            liquid_temp_c: f64::from(buf[OFFSET_TEMP_INT]) + f64::from(buf[OFFSET_TEMP_DEC]) / 10.0,
            pump_rpm: read_u16_le(buf, OFFSET_PUMP_RPM),
            pump_duty: buf[OFFSET_PUMP_DUTY],
            fan_rpm: read_u16_le(buf, OFFSET_FAN_RPM),
            fan_duty: buf[OFFSET_FAN_DUTY],
        })
    }
}

/// Firmware version from the init response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl FirmwareVersion {
    /// Parse a `RESP_FIRMWARE` frame.
    pub fn parse(buf: &[u8]) -> Result<Self, DriverError> {
        if buf.len() < 0x14 {
            return Err(DriverError::InvalidResponse {
                message: "Firmware response too short".into(),
            });
        }

        if !buf.starts_with(&RESP_FIRMWARE) {
            return Err(DriverError::InvalidResponse {
                message: format!(
                    "Invalid firmware response header: [{:#04x}, {:#04x}]",
                    buf[0], buf[1]
                ),
            });
        }

        Ok(FirmwareVersion {
            major: buf[0x11],
            minor: buf[0x12],
            patch: buf[0x13],
        })
    }
}

impl std::fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_buf() -> [u8; 64] {
        let mut buf = [0u8; 64];
        buf[..2].copy_from_slice(&RESP_STATUS);
        // 32.5°C
        buf[15] = 32;
        buf[16] = 5;
        // 2500 RPM
        buf[17] = 0xC4;
        buf[18] = 0x09;
        buf[19] = 75;
        buf[20] = 50;
        // 1200 RPM
        buf[23] = 0xB0;
        buf[24] = 0x04;
        buf
    }

    #[test]
    fn test_parse_status() {
        let frame = StatusFrame::parse(&status_buf()).unwrap();
        assert_eq!(frame.liquid_temp_c, 32.5);
        assert_eq!(frame.pump_rpm, 2500);
        assert_eq!(frame.pump_duty, 75);
        assert_eq!(frame.fan_rpm, 1200);
        assert_eq!(frame.fan_duty, 50);
    }

    #[test]
    fn test_invalid_temp() {
        let mut buf = status_buf();
        buf[15] = 0xFF;
        buf[16] = 0xFF;
        assert!(StatusFrame::parse(&buf).is_err());
    }

    #[test]
    fn test_rejects_foreign_frames() {
        let mut buf = status_buf();
        buf[0] = 0x11;
        assert!(!is_status_frame(&buf));
        assert!(StatusFrame::parse(&buf).is_err());
        assert!(StatusFrame::parse(&buf[..20]).is_err());
    }

    #[test]
    fn test_firmware_parse() {
        let mut buf = [0u8; 64];
        buf[..2].copy_from_slice(&RESP_FIRMWARE);
        buf[0x11] = 2;
        buf[0x12] = 1;
        buf[0x13] = 5;

        let fw = FirmwareVersion::parse(&buf).unwrap();
        assert_eq!(fw.to_string(), "2.1.5");
        assert!(FirmwareVersion::parse(&status_buf()).is_err());
    }
}
