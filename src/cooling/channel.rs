//! Speed-controlled channels.

use serde::{Deserialize, Serialize};

use crate::config::{FAN_MIN_DUTY, MAX_DUTY, PUMP_MIN_DUTY};
use crate::error::{KrakenError, Result};

/// Speed control channel identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Pump channel.
    Pump,
    /// Fan channel.
    Fan,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Fan, Channel::Pump];

    /// Lowercase name, as used by drivers and the profile store.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Channel::Pump => "pump",
            Channel::Fan => "fan",
        }
    }

    /// Get the minimum duty cycle a curve may request on this channel.
    pub const fn min_duty(&self) -> u8 {
        match self {
            Channel::Pump => PUMP_MIN_DUTY,
            Channel::Fan => FAN_MIN_DUTY,
        }
    }

    /// Get the maximum duty cycle for this channel.
    pub const fn max_duty(&self) -> u8 {
        MAX_DUTY
    }

    /// Validate a duty cycle value for this channel.
    pub fn validate_duty(&self, duty: u8) -> Result<u8> {
        let min = self.min_duty();
        let max = self.max_duty();

        if duty < min || duty > max {
            return Err(KrakenError::InvalidDuty {
                channel: self.to_string(),
                value: duty,
                min,
                max,
            });
        }

        Ok(duty)
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Pump => write!(f, "Pump"),
            Channel::Fan => write!(f, "Fan"),
        }
    }
}
