//! In-memory drivers for repository and poller tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::Duration;

use crate::cooling::Channel;
use crate::device::family::{ASETEK_VID, KRAKEN_2_PID, KRAKEN_Z3_PID, NZXT_VID};
use crate::device::{LightingChannel, LightingDirection, LightingSpeed, Rgb};
use crate::driver::{DeviceDriver, DriverProvider, DriverResult, StatusEntry, StatusValue};
use crate::error::DriverError;

/// Driver calls in the order they happened, shared by every clone.
///
/// Each call is logged when it starts and again, prefixed with `end `, when
/// it returns.
#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    /// Start and end markers.
    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Calls only, without end markers.
    pub fn calls(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| !e.starts_with("end "))
            .collect()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FakeDriver {
    usb_id: (u16, u16),
    description: String,
    init_firmware: Option<String>,
    status: Vec<StatusEntry>,
    delay: Duration,
    failure: Arc<Mutex<Option<DriverError>>>,
    log: CallLog,
}

impl FakeDriver {
    fn new(usb_id: (u16, u16), description: &str, status: Vec<StatusEntry>, log: &CallLog) -> Self {
        Self {
            usb_id,
            description: description.to_string(),
            init_firmware: None,
            status,
            delay: Duration::ZERO,
            failure: Arc::new(Mutex::new(None)),
            log: log.clone(),
        }
    }

    /// Kraken X62 reporting 31.5°C, fan 1100 RPM, pump 2400 RPM.
    pub fn kraken2(log: &CallLog) -> Self {
        Self::new(
            (NZXT_VID, KRAKEN_2_PID),
            "NZXT Kraken X62",
            vec![
                StatusEntry::new("Liquid temperature", 31.5, "°C"),
                StatusEntry::new("Fan speed", 1100.0, "rpm"),
                StatusEntry::new("Pump speed", 2400.0, "rpm"),
                StatusEntry::new("Firmware version", "6.0.2", ""),
            ],
            log,
        )
    }

    /// Kraken Z63 reporting every field, firmware from the init response.
    pub fn kraken_z3(log: &CallLog) -> Self {
        let mut driver = Self::new(
            (NZXT_VID, KRAKEN_Z3_PID),
            "NZXT Kraken Z63",
            vec![
                StatusEntry::new("Liquid temperature", 29.0, "°C"),
                StatusEntry::new("Pump speed", 2000.0, "rpm"),
                StatusEntry::new("Pump duty", 60.0, "%"),
                StatusEntry::new("Fan speed", 900.0, "rpm"),
                StatusEntry::new("Fan duty", 40.0, "%"),
            ],
            log,
        );
        driver.init_firmware = Some("5.7.0".to_string());
        driver
    }

    /// Kraken X61, the Asetek unit.
    pub fn legacy(log: &CallLog) -> Self {
        Self::kraken2(log).with_usb_id((ASETEK_VID, 0xB200))
    }

    pub fn with_usb_id(mut self, usb_id: (u16, u16)) -> Self {
        self.usb_id = usb_id;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_fan_rpm(mut self, rpm: f64) -> Self {
        self.status[1].value = StatusValue::Number(rpm);
        self
    }

    /// Make the next driver call fail with a permission error.
    pub fn fail_next(&self) {
        self.fail_next_with(
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied").into(),
        );
    }

    /// Make the next driver call fail with `err`.
    pub fn fail_next_with(&self, err: DriverError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    fn call(&self, name: String) -> DriverResult<()> {
        self.log.push(name.clone());
        sleep(self.delay);
        self.log.push(format!("end {}", name));

        match self.failure.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl DeviceDriver for FakeDriver {
    fn usb_id(&self) -> (u16, u16) {
        self.usb_id
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn connect(&mut self) -> DriverResult<Option<String>> {
        self.log.push("connect".to_string());
        Ok(self.init_firmware.clone())
    }

    fn disconnect(&mut self) -> DriverResult<()> {
        self.log.push("disconnect".to_string());
        Ok(())
    }

    fn get_status(&mut self) -> DriverResult<Vec<StatusEntry>> {
        self.call("get_status".to_string())?;
        Ok(self.status.clone())
    }

    fn set_fixed_duty(&mut self, channel: Channel, duty: u8) -> DriverResult<()> {
        self.call(format!("set_fixed_duty {} {}", channel.as_str(), duty))
    }

    fn set_profile(&mut self, channel: Channel, points: &[(u8, u8)]) -> DriverResult<()> {
        self.call(format!("set_profile {} {:?}", channel.as_str(), points))
    }

    fn set_color(
        &mut self,
        channel: LightingChannel,
        mode: &str,
        colors: &[Rgb],
        speed: LightingSpeed,
        direction: LightingDirection,
    ) -> DriverResult<()> {
        let colors: Vec<String> = colors
            .iter()
            .map(|c| format!("{:02x}{:02x}{:02x}", c.red, c.green, c.blue))
            .collect();
        self.call(format!(
            "set_color {} {} [{}] {} {}",
            channel,
            mode,
            colors.join(","),
            speed.as_str(),
            direction.as_str()
        ))
    }
}

/// Hands out clones of one [`FakeDriver`] while the device is plugged in.
#[derive(Debug, Clone)]
pub(crate) struct FakeProvider {
    template: FakeDriver,
    plugged: Arc<AtomicBool>,
    broken: Arc<AtomicBool>,
}

impl FakeProvider {
    pub fn new(template: FakeDriver) -> Self {
        Self {
            template,
            plugged: Arc::new(AtomicBool::new(true)),
            broken: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The driver handed out by the next enumeration.
    pub fn driver(&self) -> &FakeDriver {
        &self.template
    }

    pub fn set_plugged(&self, plugged: bool) {
        self.plugged.store(plugged, Ordering::SeqCst);
    }

    /// Make enumeration itself fail, like a missing HID backend.
    pub fn set_broken(&self, broken: bool) {
        self.broken.store(broken, Ordering::SeqCst);
    }
}

impl DriverProvider for FakeProvider {
    fn find_supported(&self) -> DriverResult<Vec<Box<dyn DeviceDriver>>> {
        self.template.log.push("find_supported".to_string());
        if self.broken.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("HID backend unavailable").into());
        }
        if !self.plugged.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        Ok(vec![Box::new(self.template.clone())])
    }
}
