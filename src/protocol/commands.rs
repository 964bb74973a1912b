//! HID command definitions and builders for Kraken X3/Z3 coolers.
//!
//! Protocol based on reverse-engineering from liquidctl project:
//! https://github.com/liquidctl/liquidctl/blob/main/liquidctl/driver/kraken3.py

use crate::cooling::{Channel, SpeedCurve, duty_for_temperature};
use crate::error::DriverError;

// =============================================================================
// Constants
// =============================================================================

/// HID report length for reads and writes.
pub const HID_REPORT_LENGTH: usize = 64;

/// Critical temperature threshold (device enforced).
pub const CRITICAL_TEMPERATURE: u8 = 59;

/// First temperature of the device curve.
pub const CURVE_START_TEMP: u8 = 20;

/// Number of duty points in a speed curve (20°C to 59°C inclusive).
pub const CURVE_POINTS: usize = 40;

// =============================================================================
// HID Commands
// =============================================================================

/// Request firmware version info.
pub const CMD_FIRMWARE_INFO: [u8; 2] = [0x10, 0x01];

/// Initialize device - step 1 (set update interval).
/// Format: [0x70, 0x02, 0x01, 0xB8, interval]
/// Default interval = 0x01 (500ms updates)
pub const CMD_INIT_INTERVAL: [u8; 5] = [0x70, 0x02, 0x01, 0xB8, 0x01];

/// Initialize device - step 2 (complete initialization).
pub const CMD_INIT_COMPLETE: [u8; 2] = [0x70, 0x01];

/// Request device status (temperature, RPM, duty).
pub const CMD_REQUEST_STATUS: [u8; 2] = [0x74, 0x01];

/// Set speed header: [0x72, channel_id, ...]
pub const CMD_SET_SPEED_HEADER: u8 = 0x72;

// =============================================================================
// Response Headers (from device)
// =============================================================================

/// Device status response header (0x75 0x01).
pub const RESP_STATUS: [u8; 2] = [0x75, 0x01];

/// Firmware info response header (0x11 0x01).
pub const RESP_FIRMWARE: [u8; 2] = [0x11, 0x01];

// =============================================================================
// Speed Channels
// =============================================================================

/// HID channel identifier byte.
pub const fn channel_id(channel: Channel) -> u8 {
    match channel {
        Channel::Pump => 0x01,
        Channel::Fan => 0x02,
    }
}

/// Lowest duty the firmware accepts on a channel.
pub const fn hardware_min_duty(channel: Channel) -> u8 {
    match channel {
        Channel::Pump => 20,
        Channel::Fan => 0,
    }
}

fn clamp_duty(channel: Channel, duty: u8) -> u8 {
    duty.clamp(hardware_min_duty(channel), 100)
}

// =============================================================================
// Command Builders
// =============================================================================

/// Build a speed profile command.
///
/// The device expects 40 duty values corresponding to temperatures 20°C to 59°C.
pub fn build_speed_profile_cmd(
    channel: Channel,
    duties: &[u8; CURVE_POINTS],
) -> [u8; HID_REPORT_LENGTH] {
    let mut buf = [0u8; HID_REPORT_LENGTH];

    buf[0] = CMD_SET_SPEED_HEADER;
    buf[1] = channel_id(channel);
    buf[2..2 + CURVE_POINTS].copy_from_slice(duties);

    buf
}

/// Build a fixed speed command: a flat curve at `duty`.
pub fn build_fixed_speed_cmd(channel: Channel, duty: u8) -> [u8; HID_REPORT_LENGTH] {
    let duties = [clamp_duty(channel, duty); CURVE_POINTS];
    build_speed_profile_cmd(channel, &duties)
}

/// Expand sparse `(temperature, duty)` points into the full 40-point device curve.
///
/// Points may come in any order; for duplicate temperatures the first one wins.
/// Duties are clamped to what the firmware accepts on the channel.
pub fn interpolate_profile(
    channel: Channel,
    points: &[(u8, u8)],
) -> Result<[u8; CURVE_POINTS], DriverError> {
    if points.is_empty() {
        return Err(DriverError::InvalidCommand("profile cannot be empty".into()));
    }

    let mut sorted = points.to_vec();
    sorted.sort_by_key(|(temp, _)| *temp);
    sorted.dedup_by_key(|(temp, _)| *temp);
    let curve = SpeedCurve::new(sorted).map_err(|e| DriverError::InvalidCommand(e.to_string()))?;

    let mut duties = [0u8; CURVE_POINTS];
    for (duty, temp) in duties.iter_mut().zip(CURVE_START_TEMP..=CRITICAL_TEMPERATURE) {
        let interpolated = duty_for_temperature(&curve, f64::from(temp)).round();
        *duty = clamp_duty(channel, interpolated as u8);
    }

    Ok(duties)
}
