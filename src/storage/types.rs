use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_LOAD_LAST_PROFILE, DEFAULT_REFRESH_INTERVAL_SECS};
use crate::cooling::{Channel, SpeedCurve};
use crate::error::Result;

/// A named speed curve for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProfile {
    pub id: u32,
    pub channel: Channel,
    pub name: String,
    /// Built-in profiles cannot be edited or deleted.
    #[serde(default)]
    pub read_only: bool,
    /// Fixed-duty profiles hold exactly one step.
    #[serde(default)]
    pub single_step: bool,
    /// `(temperature, duty)` pairs.
    pub steps: Vec<(u8, u8)>,
}

impl StoredProfile {
    pub fn curve(&self) -> Result<SpeedCurve> {
        SpeedCurve::new(self.steps.iter().copied())
    }
}

/// Currently applied profile per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentProfiles {
    pub fan: Option<u32>,
    pub pump: Option<u32>,
}

impl CurrentProfiles {
    pub fn get(&self, channel: Channel) -> Option<u32> {
        match channel {
            Channel::Fan => self.fan,
            Channel::Pump => self.pump,
        }
    }

    pub fn set(&mut self, channel: Channel, id: Option<u32>) {
        match channel {
            Channel::Fan => self.fan = id,
            Channel::Pump => self.pump = id,
        }
    }
}

/// User preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Seconds between two status polls.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Re-apply the current profiles on start.
    #[serde(default = "default_load_last_profile")]
    pub load_last_profile: bool,
}

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}

fn default_load_last_profile() -> bool {
    DEFAULT_LOAD_LAST_PROFILE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            load_last_profile: default_load_last_profile(),
        }
    }
}

/// On-disk layout of `profiles.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFile {
    pub profiles: Vec<StoredProfile>,
    #[serde(default)]
    pub current: CurrentProfiles,
    #[serde(default)]
    pub settings: Settings,
}

/// Change notifications of the profile store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Inserted(u32),
    Updated(u32),
    Deleted(u32),
    CurrentChanged { channel: Channel, id: Option<u32> },
    SettingsChanged,
}
