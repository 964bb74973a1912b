//! HID driver for NZXT Kraken X3 and Z3 coolers.
//!
//! Both generations share the same speed and status protocol. The Z3 adds a
//! fan header, so its status carries fan speed and duty as well.

use std::ffi::CString;
use std::thread::sleep;
use std::time::Duration;

use hidapi::{HidApi, HidDevice};
use tracing::debug;

use crate::cooling::Channel;
use crate::device::family::{KRAKEN_X3_PIDS, KRAKEN_Z3_PID, NZXT_VID};
use crate::device::{DeviceFamily, LightingChannel, LightingDirection, LightingSpeed, Rgb};
use crate::driver::{DeviceDriver, DriverProvider, DriverResult, StatusEntry};
use crate::error::DriverError;
use crate::protocol::{
    CMD_FIRMWARE_INFO, CMD_INIT_COMPLETE, CMD_INIT_INTERVAL, CMD_REQUEST_STATUS,
    FirmwareVersion, HID_REPORT_LENGTH, RESP_FIRMWARE, StatusFrame, build_fixed_speed_cmd,
    build_speed_profile_cmd, interpolate_profile, is_status_frame,
};

/// Default HID read timeout in milliseconds.
const READ_TIMEOUT_MS: i32 = 2000;

/// Frames read while waiting for a specific response.
const MAX_READS: usize = 10;

// =============================================================================
// Kraken3Driver
// =============================================================================

/// Handle to one Kraken X53/X63/X73 or Z53/Z63/Z73.
///
/// Created closed by [`HidProvider`]; [`DeviceDriver::connect`] opens and
/// initializes it.
pub struct Kraken3Driver {
    path: CString,
    product_id: u16,
    description: String,
    device: Option<HidDevice>,
}

impl Kraken3Driver {
    pub fn new(path: CString, product_id: u16) -> Self {
        let description = match DeviceFamily::from_usb_id(NZXT_VID, product_id) {
            Some(family) => format!("NZXT {}", family.name()),
            None => format!("NZXT device {:04x}", product_id),
        };
        Self {
            path,
            product_id,
            description,
            device: None,
        }
    }

    /// Whether this product has a fan header.
    fn has_fan(&self) -> bool {
        self.product_id == KRAKEN_Z3_PID
    }

    /// X3 coolers only drive the pump.
    fn check_channel(&self, channel: Channel) -> DriverResult<()> {
        if channel == Channel::Fan && !self.has_fan() {
            return Err(DriverError::Unsupported {
                device: self.description.clone(),
                operation: "fan speed control".into(),
            });
        }
        Ok(())
    }

    fn device(&self) -> DriverResult<&HidDevice> {
        self.device.as_ref().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, "device is not open").into()
        })
    }

    fn write(&self, data: &[u8]) -> DriverResult<()> {
        let mut buf = [0u8; HID_REPORT_LENGTH];
        let len = data.len().min(HID_REPORT_LENGTH);
        buf[..len].copy_from_slice(&data[..len]);

        self.device()?.write(&buf)?;
        Ok(())
    }

    /// Clear enqueued reports (like liquidctl does).
    fn drain(&self) -> DriverResult<()> {
        let device = self.device()?;
        let mut buf = [0u8; HID_REPORT_LENGTH];
        while matches!(device.read_timeout(&mut buf, 1), Ok(n) if n > 0) {}
        Ok(())
    }

    fn read_firmware(&self) -> DriverResult<Option<FirmwareVersion>> {
        let device = self.device()?;
        let mut buf = [0u8; HID_REPORT_LENGTH];

        // Try reading for up to 200ms (10 * 20ms)
        for _ in 0..MAX_READS {
            let read = device.read_timeout(&mut buf, 20)?;
            if read > 0 && buf.starts_with(&RESP_FIRMWARE) {
                return FirmwareVersion::parse(&buf).map(Some);
            }
        }
        Ok(None)
    }
}

/// Telemetry tuples of a status frame, in the order the family map expects.
fn status_entries(frame: &StatusFrame, has_fan: bool) -> Vec<StatusEntry> {
    let mut entries = vec![
        StatusEntry::new("Liquid temperature", frame.liquid_temp_c, "°C"),
        StatusEntry::new("Pump speed", u32::from(frame.pump_rpm), "rpm"),
        StatusEntry::new("Pump duty", f64::from(frame.pump_duty), "%"),
    ];
    if has_fan {
        entries.push(StatusEntry::new("Fan speed", u32::from(frame.fan_rpm), "rpm"));
        entries.push(StatusEntry::new("Fan duty", f64::from(frame.fan_duty), "%"));
    }
    entries
}

impl DeviceDriver for Kraken3Driver {
    fn usb_id(&self) -> (u16, u16) {
        (NZXT_VID, self.product_id)
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn connect(&mut self) -> DriverResult<Option<String>> {
        let api = HidApi::new()?;
        self.device = Some(api.open_path(&self.path)?);

        self.drain()?;

        self.write(&CMD_FIRMWARE_INFO)?;
        let firmware = self.read_firmware()?;
        sleep(Duration::from_millis(50));

        // Initialize device with update interval (500ms)
        self.write(&CMD_INIT_INTERVAL)?;
        sleep(Duration::from_millis(100));
        self.write(&CMD_INIT_COMPLETE)?;
        sleep(Duration::from_millis(100));

        debug!("Connected to {} (firmware {:?})", self.description, firmware);
        Ok(firmware.map(|fw| fw.to_string()))
    }

    fn disconnect(&mut self) -> DriverResult<()> {
        // Dropping the handle closes it
        self.device = None;
        Ok(())
    }

    fn get_status(&mut self) -> DriverResult<Vec<StatusEntry>> {
        self.drain()?;

        self.write(&CMD_REQUEST_STATUS)?;
        sleep(Duration::from_millis(50));

        let device = self.device()?;
        let mut buf = [0u8; HID_REPORT_LENGTH];

        // Skip info responses until the status frame arrives
        for _ in 0..MAX_READS {
            let read = device.read_timeout(&mut buf, READ_TIMEOUT_MS)?;
            if read > 0 && is_status_frame(&buf) {
                let frame = StatusFrame::parse(&buf)?;
                debug!("Status frame: {:?}", frame);
                return Ok(status_entries(&frame, self.has_fan()));
            }
        }

        Err(DriverError::Timeout)
    }

    fn set_fixed_duty(&mut self, channel: Channel, duty: u8) -> DriverResult<()> {
        self.check_channel(channel)?;
        self.write(&build_fixed_speed_cmd(channel, duty))
    }

    fn set_profile(&mut self, channel: Channel, points: &[(u8, u8)]) -> DriverResult<()> {
        self.check_channel(channel)?;
        let duties = interpolate_profile(channel, points)?;
        self.write(&build_speed_profile_cmd(channel, &duties))
    }

    fn set_color(
        &mut self,
        channel: LightingChannel,
        mode: &str,
        _colors: &[Rgb],
        _speed: LightingSpeed,
        _direction: LightingDirection,
    ) -> DriverResult<()> {
        Err(DriverError::Unsupported {
            device: self.description.clone(),
            operation: format!("lighting mode '{}' on {}", mode, channel),
        })
    }
}

impl std::fmt::Debug for Kraken3Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kraken3Driver")
            .field("description", &self.description)
            .field("open", &self.device.is_some())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// HidProvider
// =============================================================================

/// Finds Kraken X3/Z3 coolers on the HID bus.
#[derive(Debug, Default, Clone, Copy)]
pub struct HidProvider;

fn is_kraken3(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == NZXT_VID && (product_id == KRAKEN_Z3_PID || KRAKEN_X3_PIDS.contains(&product_id))
}

impl DriverProvider for HidProvider {
    fn find_supported(&self) -> DriverResult<Vec<Box<dyn DeviceDriver>>> {
        let api = HidApi::new()?;

        let drivers = api
            .device_list()
            .filter(|info| is_kraken3(info.vendor_id(), info.product_id()))
            .map(|info| {
                Box::new(Kraken3Driver::new(info.path().to_owned(), info.product_id()))
                    as Box<dyn DeviceDriver>
            })
            .collect();

        Ok(drivers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::resolve;

    fn frame() -> StatusFrame {
        StatusFrame {
            liquid_temp_c: 31.5,
            pump_rpm: 2100,
            pump_duty: 60,
            fan_rpm: 850,
            fan_duty: 35,
        }
    }

    #[test]
    fn test_supported_ids() {
        assert!(is_kraken3(NZXT_VID, 0x2007));
        assert!(is_kraken3(NZXT_VID, 0x2014));
        assert!(is_kraken3(NZXT_VID, KRAKEN_Z3_PID));
        assert!(!is_kraken3(NZXT_VID, 0x170E));
        assert!(!is_kraken3(0x2433, 0xB200));
    }

    #[test]
    fn test_z3_entries_resolve() {
        let driver = Kraken3Driver::new(CString::default(), KRAKEN_Z3_PID);
        assert_eq!(driver.description(), "NZXT Kraken Z53/Z63/Z73");
        assert_eq!(driver.usb_id(), (NZXT_VID, KRAKEN_Z3_PID));

        let entries = status_entries(&frame(), driver.has_fan());
        let status = resolve(&entries, DeviceFamily::KrakenZ3, "Z63", Some("2.1.5")).unwrap();
        assert_eq!(status.liquid_temperature, 31.5);
        assert_eq!(status.pump_rpm, Some(2100));
        assert_eq!(status.pump_duty, Some(60.0));
        assert_eq!(status.fan_rpm, Some(850));
        assert_eq!(status.fan_duty, Some(35.0));
        assert_eq!(status.firmware_version, "2.1.5");
    }

    #[test]
    fn test_x3_entries_have_no_fan() {
        let driver = Kraken3Driver::new(CString::default(), KRAKEN_X3_PIDS[0]);
        let entries = status_entries(&frame(), driver.has_fan());
        assert_eq!(entries.len(), 3);

        let status = resolve(&entries, DeviceFamily::KrakenX3, "X63", None).unwrap();
        assert_eq!(status.fan_rpm, None);
        assert_eq!(status.pump_duty, Some(60.0));
    }

    #[test]
    fn test_closed_driver_reports_io_error() {
        let mut driver = Kraken3Driver::new(CString::default(), KRAKEN_Z3_PID);
        assert!(matches!(driver.get_status(), Err(DriverError::Io(_))));
        assert!(driver.disconnect().is_ok());
    }

    fn closed(product_id: u16) -> Kraken3Driver {
        Kraken3Driver::new(CString::new("/dev/hidraw-test").unwrap(), product_id)
    }

    #[test]
    fn test_x3_rejects_fan_commands() {
        let mut driver = closed(0x2007);

        let err = driver.set_fixed_duty(Channel::Fan, 50).unwrap_err();
        assert!(matches!(err, DriverError::Unsupported { .. }));
        assert!(!err.is_transport());

        let err = driver.set_profile(Channel::Fan, &[(20, 30), (60, 100)]).unwrap_err();
        assert!(matches!(err, DriverError::Unsupported { .. }));
    }

    #[test]
    fn test_channel_gate_passes_supported_channels() {
        // past the gate the closed handle fails on the transport
        let mut x3 = closed(0x2014);
        assert!(x3.set_fixed_duty(Channel::Pump, 60).unwrap_err().is_transport());

        let mut z3 = closed(KRAKEN_Z3_PID);
        assert!(z3.set_fixed_duty(Channel::Fan, 50).unwrap_err().is_transport());
        assert!(z3.set_profile(Channel::Pump, &[(20, 60), (60, 100)]).unwrap_err().is_transport());
    }
}
