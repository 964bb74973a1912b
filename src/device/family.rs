//! Supported device families and their status layouts.

use serde::{Deserialize, Serialize};

// =============================================================================
// USB Identifiers
// =============================================================================

/// NZXT Vendor ID.
pub const NZXT_VID: u16 = 0x1E71;

/// Asetek Vendor ID (OEM of the first Kraken generation).
pub const ASETEK_VID: u16 = 0x2433;

/// Kraken X31/X41/X61 (Asetek 690LC) Product ID.
pub const LEGACY_690LC_PID: u16 = 0xB200;

/// Kraken X42/X52/X62/X72 Product ID.
pub const KRAKEN_2_PID: u16 = 0x170E;

/// Kraken X53/X63/X73 Product IDs.
pub const KRAKEN_X3_PIDS: [u16; 2] = [0x2007, 0x2014];

/// Kraken Z53/Z63/Z73 Product ID.
pub const KRAKEN_Z3_PID: u16 = 0x3008;

// =============================================================================
// Families
// =============================================================================

/// A generation of supported hardware with its own status layout and lighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceFamily {
    /// Kraken X31/X41/X61.
    Legacy,
    /// Kraken X42/X52/X62/X72.
    Kraken2,
    /// Kraken X53/X63/X73.
    KrakenX3,
    /// Kraken Z53/Z63/Z73.
    KrakenZ3,
}

/// Static USB id to family table.
const USB_IDS: [(u16, u16, DeviceFamily); 5] = [
    (ASETEK_VID, LEGACY_690LC_PID, DeviceFamily::Legacy),
    (NZXT_VID, KRAKEN_2_PID, DeviceFamily::Kraken2),
    (NZXT_VID, KRAKEN_X3_PIDS[0], DeviceFamily::KrakenX3),
    (NZXT_VID, KRAKEN_X3_PIDS[1], DeviceFamily::KrakenX3),
    (NZXT_VID, KRAKEN_Z3_PID, DeviceFamily::KrakenZ3),
];

impl DeviceFamily {
    pub const ALL: [DeviceFamily; 4] = [
        DeviceFamily::Legacy,
        DeviceFamily::Kraken2,
        DeviceFamily::KrakenX3,
        DeviceFamily::KrakenZ3,
    ];

    /// Look up the family of a USB device.
    pub fn from_usb_id(vendor_id: u16, product_id: u16) -> Option<Self> {
        USB_IDS
            .iter()
            .find(|(vid, pid, _)| *vid == vendor_id && *pid == product_id)
            .map(|(_, _, family)| *family)
    }

    /// Where each telemetry field sits in this family's raw status list.
    pub const fn status_field_map(&self) -> StatusFieldMap {
        match self {
            DeviceFamily::Legacy | DeviceFamily::Kraken2 => StatusFieldMap {
                liquid_temperature: Some(0),
                fan_rpm: Some(1),
                pump_rpm: Some(2),
                firmware_version: Some(3),
                ..StatusFieldMap::EMPTY
            },
            DeviceFamily::KrakenX3 => StatusFieldMap {
                liquid_temperature: Some(0),
                pump_rpm: Some(1),
                pump_duty: Some(2),
                ..StatusFieldMap::EMPTY
            },
            DeviceFamily::KrakenZ3 => StatusFieldMap {
                liquid_temperature: Some(0),
                pump_rpm: Some(1),
                pump_duty: Some(2),
                fan_rpm: Some(3),
                fan_duty: Some(4),
                ..StatusFieldMap::EMPTY
            },
        }
    }

    /// Product line name for display.
    pub fn name(&self) -> &'static str {
        match self {
            DeviceFamily::Legacy => "Kraken X31/X41/X61",
            DeviceFamily::Kraken2 => "Kraken X42/X52/X62/X72",
            DeviceFamily::KrakenX3 => "Kraken X53/X63/X73",
            DeviceFamily::KrakenZ3 => "Kraken Z53/Z63/Z73",
        }
    }
}

impl std::fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Status Field Map
// =============================================================================

/// Telemetry fields a family may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusField {
    LiquidTemperature,
    FirmwareVersion,
    PumpRpm,
    PumpDuty,
    FanRpm,
    FanDuty,
}

/// Index of each telemetry field in the raw status list; `None` when the
/// family does not report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFieldMap {
    pub liquid_temperature: Option<usize>,
    pub firmware_version: Option<usize>,
    pub pump_rpm: Option<usize>,
    pub pump_duty: Option<usize>,
    pub fan_rpm: Option<usize>,
    pub fan_duty: Option<usize>,
}

impl StatusFieldMap {
    const EMPTY: Self = Self {
        liquid_temperature: None,
        firmware_version: None,
        pump_rpm: None,
        pump_duty: None,
        fan_rpm: None,
        fan_duty: None,
    };

    pub const fn index(&self, field: StatusField) -> Option<usize> {
        match field {
            StatusField::LiquidTemperature => self.liquid_temperature,
            StatusField::FirmwareVersion => self.firmware_version,
            StatusField::PumpRpm => self.pump_rpm,
            StatusField::PumpDuty => self.pump_duty,
            StatusField::FanRpm => self.fan_rpm,
            StatusField::FanDuty => self.fan_duty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usb_id_lookup() {
        assert_eq!(
            DeviceFamily::from_usb_id(NZXT_VID, KRAKEN_Z3_PID),
            Some(DeviceFamily::KrakenZ3)
        );
        assert_eq!(
            DeviceFamily::from_usb_id(NZXT_VID, 0x2014),
            Some(DeviceFamily::KrakenX3)
        );
        assert_eq!(
            DeviceFamily::from_usb_id(ASETEK_VID, LEGACY_690LC_PID),
            Some(DeviceFamily::Legacy)
        );
        // Corsair HID PSU
        assert_eq!(DeviceFamily::from_usb_id(0x1B1C, 0x1C05), None);
        // Right product id, wrong vendor
        assert_eq!(DeviceFamily::from_usb_id(ASETEK_VID, KRAKEN_Z3_PID), None);
    }

    #[test]
    fn test_field_maps() {
        let x3 = DeviceFamily::KrakenX3.status_field_map();
        assert_eq!(x3.index(StatusField::PumpDuty), Some(2));
        assert_eq!(x3.index(StatusField::FanRpm), None);
        assert_eq!(x3.index(StatusField::FirmwareVersion), None);

        let z3 = DeviceFamily::KrakenZ3.status_field_map();
        assert_eq!(z3.index(StatusField::FanDuty), Some(4));

        let k2 = DeviceFamily::Kraken2.status_field_map();
        assert_eq!(k2.index(StatusField::FirmwareVersion), Some(3));
        assert_eq!(k2.index(StatusField::PumpDuty), None);
    }
}
