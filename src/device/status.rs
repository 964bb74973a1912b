//! Canonical device status and its decoding from raw driver telemetry.

use std::fmt;

use tracing::error;

use crate::cooling::Channel;
use crate::device::DeviceFamily;
use crate::device::family::StatusField;
use crate::driver::{StatusEntry, StatusValue};
use crate::error::{KrakenError, Result};

/// Fan speeds at or above this are mis-decoded frames on Kraken 2 controllers.
pub const KRAKEN_2_MAX_PLAUSIBLE_FAN_RPM: u32 = 3500;

/// Device status in a family independent form.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub family: DeviceFamily,
    /// Liquid temperature in °C.
    pub liquid_temperature: f64,
    pub firmware_version: String,
    pub fan_rpm: Option<u32>,
    pub fan_duty: Option<f64>,
    pub pump_rpm: Option<u32>,
    pub pump_duty: Option<f64>,
    pub device_description: String,
}

impl Status {
    /// Reported RPM of `channel`. `None` means the device does not drive it.
    pub fn rpm(&self, channel: Channel) -> Option<u32> {
        match channel {
            Channel::Fan => self.fan_rpm,
            Channel::Pump => self.pump_rpm,
        }
    }

    /// Kraken 2 firmware 2.x predates speed profiles.
    pub fn has_legacy_firmware(&self) -> bool {
        self.firmware_version.starts_with("2.")
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn rpm(value: Option<u32>) -> String {
            value.map_or_else(|| "-".to_string(), |v| format!("{} RPM", v))
        }
        fn duty(value: Option<f64>) -> String {
            value.map_or_else(|| "-".to_string(), |v| format!("{:.0}%", v))
        }

        write!(
            f,
            "Liquid: {:.1}°C | Pump: {} ({}) | Fan: {} ({})",
            self.liquid_temperature,
            rpm(self.pump_rpm),
            duty(self.pump_duty),
            rpm(self.fan_rpm),
            duty(self.fan_duty),
        )
    }
}

/// Map a raw status list onto a [`Status`], or `None` if the reading is rejected.
///
/// `init_firmware` is the firmware reported at connect time. It takes
/// precedence over the status list.
pub fn resolve(
    raw: &[StatusEntry],
    family: DeviceFamily,
    description: &str,
    init_firmware: Option<&str>,
) -> Option<Status> {
    match decode(raw, family, description, init_firmware) {
        Ok(status) => Some(status),
        Err(e) => {
            error!("Invalid status from {}: {}", description, e);
            None
        }
    }
}

/// Like [`resolve`], reporting why a reading was rejected.
pub fn decode(
    raw: &[StatusEntry],
    family: DeviceFamily,
    description: &str,
    init_firmware: Option<&str>,
) -> Result<Status> {
    let map = family.status_field_map();
    let value = |field| map.index(field).and_then(|i| raw.get(i)).map(|e| &e.value);

    let liquid_temperature = value(StatusField::LiquidTemperature)
        .and_then(StatusValue::as_f64)
        .ok_or_else(|| KrakenError::InvalidReading("no liquid temperature".into()))?;

    let firmware_version = match init_firmware {
        Some(firmware) => firmware.to_string(),
        None => value(StatusField::FirmwareVersion)
            .map(firmware_text)
            .unwrap_or_default(),
    };

    let status = Status {
        family,
        liquid_temperature,
        firmware_version,
        fan_rpm: value(StatusField::FanRpm).and_then(rpm),
        fan_duty: value(StatusField::FanDuty).and_then(StatusValue::as_f64),
        pump_rpm: value(StatusField::PumpRpm).and_then(rpm),
        pump_duty: value(StatusField::PumpDuty).and_then(StatusValue::as_f64),
        device_description: description.to_string(),
    };

    check_plausible(&status)?;
    Ok(status)
}

/// Family specific rejection of known bad frames.
fn check_plausible(status: &Status) -> Result<()> {
    match status.family {
        DeviceFamily::Kraken2 => match status.fan_rpm {
            Some(rpm) if rpm < KRAKEN_2_MAX_PLAUSIBLE_FAN_RPM => Ok(()),
            Some(rpm) => Err(KrakenError::InvalidReading(format!(
                "implausible fan speed {} RPM",
                rpm
            ))),
            None => Err(KrakenError::InvalidReading("no fan speed".into())),
        },
        DeviceFamily::Legacy | DeviceFamily::KrakenX3 | DeviceFamily::KrakenZ3 => Ok(()),
    }
}

fn rpm(value: &StatusValue) -> Option<u32> {
    value
        .as_f64()
        .filter(|v| *v >= 0.0 && *v <= u32::MAX as f64)
        .map(|v| v.round() as u32)
}

fn firmware_text(value: &StatusValue) -> String {
    match value {
        StatusValue::Text(text) => text.clone(),
        StatusValue::Number(n) => n.to_string(),
        StatusValue::Missing => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kraken2_raw(fan_rpm: f64) -> Vec<StatusEntry> {
        vec![
            StatusEntry::new("Liquid temperature", 31.4, "°C"),
            StatusEntry::new("Fan speed", fan_rpm, "rpm"),
            StatusEntry::new("Pump speed", 2140.0, "rpm"),
            StatusEntry::new("Firmware version", "6.0.2", ""),
        ]
    }

    #[test]
    fn test_kraken2_fan_guard() {
        let rejected = resolve(&kraken2_raw(3500.0), DeviceFamily::Kraken2, "X62", None);
        assert!(rejected.is_none());

        let status = resolve(&kraken2_raw(3499.0), DeviceFamily::Kraken2, "X62", None).unwrap();
        assert_eq!(status.fan_rpm, Some(3499));
        assert_eq!(status.pump_rpm, Some(2140));
        assert_eq!(status.firmware_version, "6.0.2");
        assert_eq!(status.liquid_temperature, 31.4);
        assert_eq!(status.fan_duty, None);
    }

    #[test]
    fn test_guard_is_kraken2_only() {
        // Same layout, but the Asetek controller has no fan quirk
        let status = resolve(&kraken2_raw(4200.0), DeviceFamily::Legacy, "X61", None).unwrap();
        assert_eq!(status.fan_rpm, Some(4200));

        let z3 = vec![
            StatusEntry::new("Liquid temperature", 30.0, "°C"),
            StatusEntry::new("Pump speed", 2000.0, "rpm"),
            StatusEntry::new("Pump duty", 70.0, "%"),
            StatusEntry::new("Fan speed", 5000.0, "rpm"),
            StatusEntry::new("Fan duty", 100.0, "%"),
        ];
        let status = resolve(&z3, DeviceFamily::KrakenZ3, "Z63", None).unwrap();
        assert_eq!(status.fan_rpm, Some(5000));
        assert_eq!(status.fan_duty, Some(100.0));
    }

    #[test]
    fn test_kraken2_missing_fan_rejected() {
        let mut raw = kraken2_raw(1000.0);
        raw[1].value = StatusValue::Missing;
        let err = decode(&raw, DeviceFamily::Kraken2, "X62", None).unwrap_err();
        assert!(matches!(err, KrakenError::InvalidReading(_)));
    }

    #[test]
    fn test_firmware_resolution() {
        let raw = vec![
            StatusEntry::new("Liquid temperature", 30.0, "°C"),
            StatusEntry::new("Pump speed", 2000.0, "rpm"),
        ];
        // X3 has no firmware index
        let status = resolve(&raw, DeviceFamily::KrakenX3, "X63", None).unwrap();
        assert_eq!(status.firmware_version, "");

        // Legacy firmware index 3 is out of range
        let status = resolve(&raw, DeviceFamily::Legacy, "X61", None).unwrap();
        assert_eq!(status.firmware_version, "");

        let status = resolve(&raw, DeviceFamily::Legacy, "X61", Some("1.2.3")).unwrap();
        assert_eq!(status.firmware_version, "1.2.3");

        // init firmware wins over the reported one
        let status =
            resolve(&kraken2_raw(900.0), DeviceFamily::Kraken2, "X62", Some("1.2.3")).unwrap();
        assert_eq!(status.firmware_version, "1.2.3");
    }

    #[test]
    fn test_x3_layout() {
        let raw = vec![
            StatusEntry::new("Liquid temperature", 33.2, "°C"),
            StatusEntry::new("Pump speed", 1987.0, "rpm"),
            StatusEntry::new("Pump duty", 61.0, "%"),
        ];
        let status = resolve(&raw, DeviceFamily::KrakenX3, "NZXT Kraken X63", None).unwrap();
        assert_eq!(status.pump_rpm, Some(1987));
        assert_eq!(status.pump_duty, Some(61.0));
        assert_eq!(status.fan_rpm, None);
        assert_eq!(status.fan_duty, None);
        assert_eq!(status.device_description, "NZXT Kraken X63");
    }

    #[test]
    fn test_short_list_leaves_fields_empty() {
        let raw = vec![StatusEntry::new("Liquid temperature", 28.0, "°C")];
        let status = resolve(&raw, DeviceFamily::KrakenZ3, "Z63", None).unwrap();
        assert_eq!(status.pump_rpm, None);
        assert_eq!(status.fan_duty, None);
    }

    #[test]
    fn test_missing_temperature_is_invalid() {
        assert!(resolve(&[], DeviceFamily::KrakenX3, "X63", None).is_none());

        let raw = vec![StatusEntry::new("Liquid temperature", "n/a", "°C")];
        let err = decode(&raw, DeviceFamily::KrakenX3, "X63", None).unwrap_err();
        assert!(matches!(err, KrakenError::InvalidReading(_)));
    }

    #[test]
    fn test_numeric_firmware() {
        let mut raw = kraken2_raw(900.0);
        raw[3].value = StatusValue::Number(6.0);
        let status = resolve(&raw, DeviceFamily::Kraken2, "X62", None).unwrap();
        assert_eq!(status.firmware_version, "6");
    }

    #[test]
    fn test_display() {
        let status = resolve(&kraken2_raw(900.0), DeviceFamily::Kraken2, "X62", None).unwrap();
        assert_eq!(
            status.to_string(),
            "Liquid: 31.4°C | Pump: 2140 RPM (-) | Fan: 900 RPM (-)"
        );
    }

    #[test]
    fn test_channel_rpm() {
        let status = resolve(&kraken2_raw(1200.0), DeviceFamily::Kraken2, "X62", None).unwrap();
        assert_eq!(status.rpm(Channel::Fan), Some(1200));
        assert_eq!(status.rpm(Channel::Pump), Some(2140));

        let x3 = vec![
            StatusEntry::new("Liquid temperature", 30.0, "°C"),
            StatusEntry::new("Pump speed", 2000.0, "rpm"),
            StatusEntry::new("Pump duty", 70.0, "%"),
        ];
        let status = resolve(&x3, DeviceFamily::KrakenX3, "X63", None).unwrap();
        assert_eq!(status.rpm(Channel::Fan), None);
        assert_eq!(status.rpm(Channel::Pump), Some(2000));
    }

    #[test]
    fn test_legacy_firmware() {
        let mut raw = kraken2_raw(1200.0);
        assert!(!resolve(&raw, DeviceFamily::Kraken2, "X62", None).unwrap().has_legacy_firmware());

        raw[3] = StatusEntry::new("Firmware version", "2.1.0", "");
        assert!(resolve(&raw, DeviceFamily::Kraken2, "X62", None).unwrap().has_legacy_firmware());

        // init firmware wins over the status list
        let status = resolve(&raw, DeviceFamily::Kraken2, "X62", Some("6.0.2")).unwrap();
        assert!(!status.has_legacy_firmware());
    }
}
