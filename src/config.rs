//! Application constants and built-in speed presets.
//!
//! The presets seed the profile store on first start; every one of them is a
//! plain `(temperature, duty)` step list.

use crate::cooling::Channel;

// =============================================================================
// Application
// =============================================================================

/// Directory name under the user's config dir.
pub const APP_NAME: &str = "nzxt-kraken-control";

pub const SUPPORTED_MODELS: &str = "NZXT Kraken X31, X41, X61, X42, X52, X62, X72, X53, X63, X73, Z53, Z63 or Z73";

// =============================================================================
// Duty / Temperature Limits
// =============================================================================

/// Lowest temperature a curve point may use.
pub const MIN_CURVE_TEMP: u8 = 20;

/// Highest temperature a curve point may use.
pub const MAX_CURVE_TEMP: u8 = 60;

pub const FAN_MIN_DUTY: u8 = 25;
pub const PUMP_MIN_DUTY: u8 = 30;
pub const MAX_DUTY: u8 = 100;

// =============================================================================
// Settings Defaults
// =============================================================================

/// Seconds between two status polls.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3;

/// Re-apply the last applied profiles when monitoring starts.
pub const DEFAULT_LOAD_LAST_PROFILE: bool = true;

// =============================================================================
// Pre-defined Profile Curves
// =============================================================================

/// Fan silent profile - minimal noise, ramps at 35°C+.
pub const FAN_SILENT: [(u8, u8); 4] = [(20, 25), (35, 25), (50, 55), (60, 100)];

/// Fan performance profile - aggressive cooling.
pub const FAN_PERFORMANCE: [(u8, u8); 3] = [(20, 50), (35, 50), (60, 100)];

/// Pump silent profile - maintains minimum flow.
pub const PUMP_SILENT: [(u8, u8); 4] = [(20, 60), (35, 60), (55, 100), (60, 100)];

/// Pump performance profile - maximum cooling.
pub const PUMP_PERFORMANCE: [(u8, u8); 4] = [(20, 70), (35, 70), (40, 80), (60, 100)];

/// Built-in preset kinds, in the order they are seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Silent,
    Performance,
    Fixed,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Silent, Preset::Performance, Preset::Fixed];

    /// Get preset name for display.
    pub fn name(&self) -> &'static str {
        match self {
            Preset::Silent => "Silent",
            Preset::Performance => "Performance",
            Preset::Fixed => "Fixed",
        }
    }

    /// Built-in presets are read-only, except for the editable fixed duty.
    pub fn read_only(&self) -> bool {
        !matches!(self, Preset::Fixed)
    }

    /// Steps of this preset for a channel.
    pub fn steps(&self, channel: Channel) -> Vec<(u8, u8)> {
        match (self, channel) {
            (Preset::Silent, Channel::Fan) => FAN_SILENT.to_vec(),
            (Preset::Silent, Channel::Pump) => PUMP_SILENT.to_vec(),
            (Preset::Performance, Channel::Fan) => FAN_PERFORMANCE.to_vec(),
            (Preset::Performance, Channel::Pump) => PUMP_PERFORMANCE.to_vec(),
            (Preset::Fixed, channel) => vec![(MIN_CURVE_TEMP, channel.min_duty())],
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
