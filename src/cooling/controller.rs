//! Duty estimation for channels the device reports without a duty value.
//!
//! Some coolers report RPM but not duty for a channel. The duty is then
//! derived from the curve currently applied to that channel and the liquid
//! temperature of the same status report.

use tracing::debug;

use crate::cooling::{Channel, SpeedCurve, duty_for_temperature};
use crate::device::Status;

/// Curves currently applied to each channel, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedCurves {
    pub fan: Option<SpeedCurve>,
    pub pump: Option<SpeedCurve>,
}

impl AppliedCurves {
    pub fn get(&self, channel: Channel) -> Option<&SpeedCurve> {
        match channel {
            Channel::Fan => self.fan.as_ref(),
            Channel::Pump => self.pump.as_ref(),
        }
    }
}

/// Return a copy of `status` with missing duties computed from the applied curves.
///
/// A duty is only filled in when the device is active on that channel (RPM
/// present) but silent about duty, and a curve is applied to it.
pub fn fill_missing_duties(status: &Status, applied: &AppliedCurves) -> Status {
    let mut filled = status.clone();

    if let Some(curve) = applied.fan.as_ref()
        && status.fan_duty.is_none()
        && status.fan_rpm.is_some()
    {
        debug!("No fan duty reported from device, calculating from speed profile");
        filled.fan_duty = Some(duty_for_temperature(curve, status.liquid_temperature));
    }

    if let Some(curve) = applied.pump.as_ref()
        && status.pump_duty.is_none()
        && status.pump_rpm.is_some()
    {
        debug!("No pump duty reported from device, calculating from speed profile");
        filled.pump_duty = Some(duty_for_temperature(curve, status.liquid_temperature));
    }

    filled
}
