//! Device session manager.
//!
//! [`KrakenRepository`] owns the one hardware handle of the process. Every
//! public operation takes the same lock for its whole duration, connects on
//! demand, and tears the handle down on transport errors so that the next
//! call starts from a fresh connection.

use std::sync::mpsc::Sender;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, error, warn};

use crate::cooling::Channel;
use crate::device::{
    DeviceFamily, LightingModes, LightingRequest, Status, compatible_lighting_modes, resolve,
};
use crate::driver::{DeviceDriver, DriverProvider, DriverResult};
use crate::error::{DriverError, KrakenError, Result};

/// Whether the repository currently holds a device handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Lifecycle notifications, sent after the repository lock is released.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// A handle was opened. `family` is `None` for unrecognized devices.
    Connected {
        description: String,
        family: Option<DeviceFamily>,
    },
    /// A driver call failed; the handle is being torn down.
    Faulted { message: String },
    Disconnected,
}

/// The live connection.
struct Session {
    driver: Box<dyn DeviceDriver>,
    family: Option<DeviceFamily>,
    init_firmware: Option<String>,
}

type Slot = Option<Session>;

/// Serialized access to a single cooler.
pub struct KrakenRepository {
    provider: Box<dyn DriverProvider>,
    session: Mutex<Slot>,
    events: Option<Sender<DeviceEvent>>,
}

impl KrakenRepository {
    pub fn new(provider: impl DriverProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            session: Mutex::new(None),
            events: None,
        }
    }

    /// Like [`new`](Self::new), reporting lifecycle changes to `events`.
    pub fn with_events(provider: impl DriverProvider + 'static, events: Sender<DeviceEvent>) -> Self {
        Self {
            provider: Box::new(provider),
            session: Mutex::new(None),
            events: Some(events),
        }
    }

    // =========================================================================
    // Public Operations
    // =========================================================================

    /// Connect to the first supported device unless a handle is already held.
    pub fn connect(&self) -> Result<()> {
        self.locked(|slot, events| self.ensure_connected(slot, events).map(|_| ()))
    }

    /// Try to connect; report whether a handle is now held.
    pub fn has_supported_device(&self) -> bool {
        match self.connect() {
            Ok(()) => true,
            Err(KrakenError::DeviceUnavailable) => false,
            Err(e) => {
                error!("Failed to connect to device: {}", e);
                false
            }
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.locked(|slot, _| match slot {
            Some(_) => ConnectionState::Connected,
            None => ConnectionState::Disconnected,
        })
    }

    /// Read and decode the current device status.
    ///
    /// `Ok(None)` when the device is not recognized, answers with a malformed
    /// frame, or the reading is rejected. Transport errors tear the handle
    /// down and are returned as [`KrakenError::Communication`].
    pub fn get_status(&self) -> Result<Option<Status>> {
        let status = self.locked(|slot, events| {
            self.call(slot, events, |session| {
                let Some(family) = session.family else {
                    error!("Driver instance is not recognized");
                    return Ok(None);
                };
                let raw = session.driver.get_status()?;
                debug!("Raw status: {:?}", raw);
                Ok(resolve(
                    &raw,
                    family,
                    &session.driver.description(),
                    session.init_firmware.as_deref(),
                ))
            })
        });

        match status {
            Err(KrakenError::InvalidReading(message)) => {
                error!("Invalid status frame: {}", message);
                Ok(None)
            }
            other => other,
        }
    }

    /// Apply a speed curve. A single point sets a fixed duty; no points is a no-op.
    pub fn set_speed_profile(&self, channel: Channel, points: &[(u8, u8)]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        self.locked(|slot, events| {
            self.call(slot, events, |session| {
                if let [(_, duty)] = points {
                    debug!("Setting fixed {} duty to {}%", channel, duty);
                    session.driver.set_fixed_duty(channel, *duty)
                } else {
                    debug!("Setting {} profile {:?}", channel, points);
                    session.driver.set_profile(channel, points)
                }
            })
        })
    }

    /// Lighting modes of the connected device, `None` if it is not recognized.
    pub fn get_lighting_modes(&self) -> Result<Option<LightingModes>> {
        self.locked(|slot, events| {
            let session = self.ensure_connected(slot, events)?;
            match session.family {
                Some(family) => Ok(Some(compatible_lighting_modes(family))),
                None => {
                    error!("Driver instance is not recognized");
                    Ok(None)
                }
            }
        })
    }

    /// Validate `request` against the device's lighting modes and apply it.
    pub fn set_lighting(&self, request: &LightingRequest) -> Result<()> {
        self.locked(|slot, events| {
            let session = self.ensure_connected(slot, events)?;
            let Some(family) = session.family else {
                let (vendor_id, product_id) = session.driver.usb_id();
                error!("Driver instance is not recognized");
                return Err(KrakenError::UnrecognizedDevice {
                    vendor_id,
                    product_id,
                });
            };

            let command = request.resolve(&compatible_lighting_modes(family))?;
            debug!("Setting lighting {:?}", command);

            self.call(slot, events, |session| {
                session.driver.set_color(
                    command.channel,
                    command.mode,
                    &command.colors,
                    command.speed,
                    command.direction,
                )
            })
        })
    }

    /// Release the device. Does nothing when no handle is held.
    pub fn cleanup(&self) {
        self.locked(|slot, events| teardown(slot, events, None));
    }

    /// Alias of [`cleanup`](Self::cleanup).
    pub fn disconnect(&self) {
        self.cleanup();
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Run `f` under the session lock, then send the events it collected.
    fn locked<T>(&self, f: impl FnOnce(&mut Slot, &mut Vec<DeviceEvent>) -> T) -> T {
        let mut events = Vec::new();
        let result = {
            let mut slot = self.session.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut *slot, &mut events)
        };
        self.emit(events);
        result
    }

    fn emit(&self, events: Vec<DeviceEvent>) {
        if let Some(sender) = &self.events {
            for event in events {
                // Nobody listening is fine
                let _ = sender.send(event);
            }
        }
    }

    fn ensure_connected<'s>(
        &self,
        slot: &'s mut Slot,
        events: &mut Vec<DeviceEvent>,
    ) -> Result<&'s mut Session> {
        if slot.is_none() {
            let session = self.open_session()?;
            events.push(DeviceEvent::Connected {
                description: session.driver.description(),
                family: session.family,
            });
            *slot = Some(session);
        }
        slot.as_mut().ok_or(KrakenError::DeviceUnavailable)
    }

    fn open_session(&self) -> Result<Session> {
        let Some(mut driver) = self.provider.find_supported()?.into_iter().next() else {
            return Err(KrakenError::DeviceUnavailable);
        };

        let init_firmware = match driver.connect() {
            Ok(firmware) => firmware,
            Err(e) => {
                if let Err(close) = driver.disconnect() {
                    warn!("Failed to close device after connect error: {}", close);
                }
                return Err(e.into());
            }
        };

        let (vendor_id, product_id) = driver.usb_id();
        let family = DeviceFamily::from_usb_id(vendor_id, product_id);
        match family {
            Some(family) => debug!("Connected to {} ({})", driver.description(), family),
            None => error!(
                "Driver instance is not recognized: {:04x}:{:04x}",
                vendor_id, product_id
            ),
        }

        Ok(Session {
            driver,
            family,
            init_firmware,
        })
    }

    /// Run a driver call on the session, tearing it down if the transport fails.
    fn call<T>(
        &self,
        slot: &mut Slot,
        events: &mut Vec<DeviceEvent>,
        f: impl FnOnce(&mut Session) -> DriverResult<T>,
    ) -> Result<T> {
        let session = self.ensure_connected(slot, events)?;
        f(session).map_err(|e| {
            if e.is_transport() {
                teardown(slot, events, Some(&e));
            } else {
                warn!("Device refused the request: {}", e);
            }
            KrakenError::from(e)
        })
    }
}

/// Drop the handle, disconnecting it on a best-effort basis.
fn teardown(slot: &mut Slot, events: &mut Vec<DeviceEvent>, cause: Option<&DriverError>) {
    let Some(mut session) = slot.take() else {
        return;
    };

    if let Some(cause) = cause {
        warn!("Device communication failed, closing handle: {}", cause);
        events.push(DeviceEvent::Faulted {
            message: cause.to_string(),
        });
    }
    if let Err(e) = session.driver.disconnect() {
        warn!("Failed to disconnect device: {}", e);
    }
    events.push(DeviceEvent::Disconnected);
}

impl Drop for KrakenRepository {
    fn drop(&mut self) {
        let slot = self.session.get_mut().unwrap_or_else(PoisonError::into_inner);
        teardown(slot, &mut Vec::new(), None);
    }
}
