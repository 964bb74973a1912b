//! Lighting capabilities per device family and lighting requests.
//!
//! Mode tables mirror the modes each family's firmware accepts. Some modes
//! with a single logo LED are narrowed to sensible color counts.

use std::collections::BTreeMap;

use crate::device::DeviceFamily;
use crate::error::{KrakenError, Result};

// =============================================================================
// Lighting Modes
// =============================================================================

/// A lighting mode a device family supports on one lighting channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightingMode {
    pub mode_id: u8,
    /// Name the driver expects.
    pub internal_name: &'static str,
    pub display_name: &'static str,
    pub min_colors: u8,
    pub max_colors: u8,
    pub speed_enabled: bool,
    pub direction_enabled: bool,
}

const fn mode(
    mode_id: u8,
    internal_name: &'static str,
    display_name: &'static str,
    min_colors: u8,
    max_colors: u8,
    speed_enabled: bool,
    direction_enabled: bool,
) -> LightingMode {
    LightingMode {
        mode_id,
        internal_name,
        display_name,
        min_colors,
        max_colors,
        speed_enabled,
        direction_enabled,
    }
}

const LEGACY_LOGO: &[LightingMode] = &[
    mode(1, "blackout", "Blackout", 0, 0, false, false),
    mode(2, "fixed", "Fixed", 1, 1, false, false),
    mode(3, "fading", "Fade", 2, 2, false, false),
    mode(4, "blinking", "Blinking", 1, 1, true, true),
];

const KRAKEN_2_LOGO: &[LightingMode] = &[
    mode(1, "off", "Off", 0, 0, false, false),
    mode(2, "fixed", "Fixed", 1, 1, false, false),
    mode(4, "fading", "Fade", 2, 8, true, false),
    mode(5, "spectrum-wave", "Spectrum Wave", 0, 0, true, true),
    mode(14, "breathing", "Breathing", 1, 8, true, false),
    mode(16, "pulse", "Pulse", 1, 8, true, false),
];

const KRAKEN_2_RING: &[LightingMode] = &[
    mode(1, "off", "Off", 0, 0, false, false),
    mode(2, "fixed", "Fixed", 1, 1, false, false),
    mode(3, "super-fixed", "Fixed Individual", 8, 8, false, false),
    mode(4, "fading", "Fade", 2, 8, true, false),
    mode(5, "spectrum-wave", "Spectrum Wave", 0, 0, true, true),
    mode(6, "super-wave", "Wave Individual", 8, 8, true, true),
    mode(7, "marquee-3", "Marquee 3", 1, 1, true, true),
    mode(8, "marquee-4", "Marquee 4", 1, 1, true, true),
    mode(9, "marquee-5", "Marquee 5", 1, 1, true, true),
    mode(10, "marquee-6", "Marquee 6", 1, 1, true, true),
    mode(11, "covering-marquee", "Covering Marquee", 2, 8, true, true),
    mode(12, "alternating", "Alternating", 2, 2, true, false),
    mode(13, "moving-alternating", "Moving Alternating", 2, 2, true, true),
    mode(14, "breathing", "Breathing", 1, 8, true, false),
    mode(15, "super-breathing", "Breathing Individual", 8, 8, true, false),
    mode(16, "pulse", "Pulse", 1, 8, true, false),
    mode(17, "tai-chi", "Tai-Chi", 2, 2, true, false),
    mode(18, "water-cooler", "Water Cooler", 0, 0, true, false),
    mode(19, "loading", "Loading", 1, 1, false, false),
    mode(20, "wings", "Wings", 1, 1, true, false),
];

const KRAKEN_X3_LOGO: &[LightingMode] = &[
    mode(1, "off", "Off", 0, 0, false, false),
    mode(2, "fixed", "Fixed", 1, 1, false, false),
    mode(4, "fading", "Fade", 2, 8, true, false),
    mode(5, "spectrum-wave", "Spectrum Wave", 0, 0, true, true),
    mode(6, "marquee-3", "Marquee", 1, 1, true, false),
    mode(11, "alternating-3", "Alternating", 1, 2, true, false),
    mode(15, "moving-alternating-3", "Moving Alternating", 1, 2, true, false),
    mode(19, "pulse", "Pulse", 1, 8, true, false),
    mode(20, "breathing", "Breathing", 1, 8, true, false),
    mode(22, "candle", "Candle", 1, 1, false, false),
    mode(23, "starry-night", "Starry Night", 1, 1, true, false),
    mode(24, "rainbow-flow", "Rainbow Flow", 0, 0, true, true),
    mode(25, "super-rainbow", "Rainbow Fade", 0, 0, true, true),
    mode(26, "rainbow-pulse", "Rainbow Pulse", 0, 0, true, true),
    mode(27, "loading", "Loading", 1, 1, false, false),
    mode(28, "tai-chi", "Tai-Chi", 1, 2, true, false),
    mode(30, "wings", "Wings", 1, 1, true, false),
];

const KRAKEN_X3_RING: &[LightingMode] = &[
    mode(1, "off", "Off", 0, 0, false, false),
    mode(2, "fixed", "Fixed", 1, 1, false, false),
    mode(3, "super-fixed", "Fixed Individual", 8, 8, false, false),
    mode(4, "fading", "Fade", 2, 8, true, false),
    mode(5, "spectrum-wave", "Spectrum Wave", 0, 0, true, true),
    mode(6, "marquee-3", "Marquee 3", 1, 1, true, true),
    mode(7, "marquee-4", "Marquee 4", 1, 1, true, true),
    mode(8, "marquee-5", "Marquee 5", 1, 1, true, true),
    mode(9, "marquee-6", "Marquee 6", 1, 1, true, true),
    mode(10, "covering-marquee", "Covering Marquee", 2, 8, true, true),
    mode(11, "alternating-3", "Alternating 3", 1, 2, true, false),
    mode(12, "alternating-4", "Alternating 4", 1, 2, true, false),
    mode(13, "alternating-5", "Alternating 5", 1, 2, true, false),
    mode(14, "alternating-6", "Alternating 6", 1, 2, true, false),
    mode(15, "moving-alternating-3", "Moving Alternating 3", 1, 2, true, true),
    mode(16, "moving-alternating-4", "Moving Alternating 4", 1, 2, true, true),
    mode(17, "moving-alternating-5", "Moving Alternating 5", 1, 2, true, true),
    mode(18, "moving-alternating-6", "Moving Alternating 6", 1, 2, true, true),
    mode(19, "pulse", "Pulse", 1, 8, true, false),
    mode(20, "breathing", "Breathing", 1, 8, true, false),
    mode(21, "super-breathing", "Breathing Individual", 8, 8, true, false),
    mode(22, "candle", "Candle", 1, 1, false, false),
    mode(23, "starry-night", "Starry Night", 1, 1, true, false),
    mode(24, "rainbow-flow", "Rainbow Flow", 0, 0, true, true),
    mode(25, "super-rainbow", "Rainbow Fade", 0, 0, true, true),
    mode(26, "rainbow-pulse", "Rainbow Pulse", 0, 0, true, true),
    mode(27, "loading", "Loading", 1, 1, false, false),
    mode(28, "tai-chi", "Tai-Chi", 1, 2, true, false),
    mode(29, "water-cooler", "Water Cooler", 2, 2, true, false),
    mode(30, "wings", "Wings", 1, 1, true, false),
];

/// Lighting modes of both lighting channels, keyed by mode id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LightingModes {
    pub logo: BTreeMap<u8, LightingMode>,
    pub ring: BTreeMap<u8, LightingMode>,
}

impl LightingModes {
    pub fn for_channel(&self, channel: LightingChannel) -> &BTreeMap<u8, LightingMode> {
        match channel {
            LightingChannel::Logo => &self.logo,
            LightingChannel::Ring => &self.ring,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.logo.is_empty() && self.ring.is_empty()
    }
}

/// Static lighting capability table of a family.
pub fn compatible_lighting_modes(family: DeviceFamily) -> LightingModes {
    // Z3 lighting is not supported yet
    let (logo, ring): (&[LightingMode], &[LightingMode]) = match family {
        DeviceFamily::Legacy => (LEGACY_LOGO, &[]),
        DeviceFamily::Kraken2 => (KRAKEN_2_LOGO, KRAKEN_2_RING),
        DeviceFamily::KrakenX3 => (KRAKEN_X3_LOGO, KRAKEN_X3_RING),
        DeviceFamily::KrakenZ3 => (&[], &[]),
    };

    let by_id = |modes: &[LightingMode]| modes.iter().map(|m| (m.mode_id, *m)).collect();
    LightingModes {
        logo: by_id(logo),
        ring: by_id(ring),
    }
}

// =============================================================================
// Lighting Parameters
// =============================================================================

/// Lighting zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightingChannel {
    Logo,
    Ring,
}

impl LightingChannel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LightingChannel::Logo => "logo",
            LightingChannel::Ring => "ring",
        }
    }
}

impl std::fmt::Display for LightingChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Animation speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightingSpeed {
    Slowest,
    Slower,
    #[default]
    Normal,
    Faster,
    Fastest,
}

impl LightingSpeed {
    pub const ALL: [LightingSpeed; 5] = [
        LightingSpeed::Slowest,
        LightingSpeed::Slower,
        LightingSpeed::Normal,
        LightingSpeed::Faster,
        LightingSpeed::Fastest,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            LightingSpeed::Slowest => "slowest",
            LightingSpeed::Slower => "slower",
            LightingSpeed::Normal => "normal",
            LightingSpeed::Faster => "faster",
            LightingSpeed::Fastest => "fastest",
        }
    }
}

/// Animation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightingDirection {
    #[default]
    Forward,
    Backward,
}

impl LightingDirection {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LightingDirection::Forward => "forward",
            LightingDirection::Backward => "backward",
        }
    }
}

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    /// Sent for modes that take no color; the devices reject an empty list.
    pub const PLACEHOLDER: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}

// =============================================================================
// Lighting Requests
// =============================================================================

/// A lighting change as asked for by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightingRequest {
    pub channel: LightingChannel,
    pub mode_id: u8,
    pub colors: Vec<Rgb>,
    /// `None` selects the default speed.
    pub speed: Option<LightingSpeed>,
    /// `None` selects the default direction.
    pub direction: Option<LightingDirection>,
}

/// A validated lighting request, ready for the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightingCommand {
    pub channel: LightingChannel,
    pub mode: &'static str,
    pub colors: Vec<Rgb>,
    pub speed: LightingSpeed,
    pub direction: LightingDirection,
}

impl LightingRequest {
    pub fn new(channel: LightingChannel, mode_id: u8) -> Self {
        Self {
            channel,
            mode_id,
            colors: Vec::new(),
            speed: None,
            direction: None,
        }
    }

    pub fn with_colors(mut self, colors: impl IntoIterator<Item = Rgb>) -> Self {
        self.colors = colors.into_iter().collect();
        self
    }

    pub fn with_speed(mut self, speed: LightingSpeed) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_direction(mut self, direction: LightingDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Validate against the advertised modes and resolve defaults.
    pub fn resolve(&self, modes: &LightingModes) -> Result<LightingCommand> {
        let mode = modes
            .for_channel(self.channel)
            .get(&self.mode_id)
            .ok_or_else(|| KrakenError::UnsupportedLightingMode {
                channel: self.channel.to_string(),
                mode_id: self.mode_id,
            })?;

        let colors = if mode.max_colors == 0 {
            vec![Rgb::PLACEHOLDER]
        } else {
            let count = self.colors.len();
            if count < usize::from(mode.min_colors) || count > usize::from(mode.max_colors) {
                return Err(KrakenError::InvalidColorCount {
                    mode: mode.display_name.to_string(),
                    count,
                    min: mode.min_colors,
                    max: mode.max_colors,
                });
            }
            self.colors.clone()
        };

        let speed = if mode.speed_enabled {
            self.speed.unwrap_or_default()
        } else {
            LightingSpeed::default()
        };
        let direction = if mode.direction_enabled {
            self.direction.unwrap_or_default()
        } else {
            LightingDirection::default()
        };

        Ok(LightingCommand {
            channel: self.channel,
            mode: mode.internal_name,
            colors,
            speed,
            direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_counts_per_family() {
        let counts = |family| {
            let modes = compatible_lighting_modes(family);
            (modes.logo.len(), modes.ring.len())
        };
        assert_eq!(counts(DeviceFamily::Legacy), (4, 0));
        assert_eq!(counts(DeviceFamily::Kraken2), (6, 20));
        assert_eq!(counts(DeviceFamily::KrakenX3), (17, 30));
        assert_eq!(counts(DeviceFamily::KrakenZ3), (0, 0));
    }

    #[test]
    fn test_mode_tables_are_consistent() {
        for family in DeviceFamily::ALL {
            let modes = compatible_lighting_modes(family);
            for (id, mode) in modes.logo.iter().chain(modes.ring.iter()) {
                assert_eq!(*id, mode.mode_id);
                assert!(mode.min_colors <= mode.max_colors, "{}", mode.internal_name);
            }
        }
    }

    #[test]
    fn test_zero_color_mode_sends_placeholder() {
        let modes = compatible_lighting_modes(DeviceFamily::Kraken2);
        let request = LightingRequest::new(LightingChannel::Ring, 5);
        let command = request.resolve(&modes).unwrap();
        assert_eq!(command.mode, "spectrum-wave");
        assert_eq!(command.colors, vec![Rgb::PLACEHOLDER]);

        // colors given by the user are dropped as well
        let command = LightingRequest::new(LightingChannel::Ring, 1)
            .with_colors([Rgb::new(255, 0, 0), Rgb::new(0, 255, 0)])
            .resolve(&modes)
            .unwrap();
        assert_eq!(command.colors.len(), 1);
    }

    #[test]
    fn test_color_count_out_of_range() {
        let modes = compatible_lighting_modes(DeviceFamily::Kraken2);
        let too_few = LightingRequest::new(LightingChannel::Ring, 3)
            .with_colors([Rgb::new(1, 2, 3)])
            .resolve(&modes);
        assert!(matches!(
            too_few,
            Err(KrakenError::InvalidColorCount { count: 1, min: 8, max: 8, .. })
        ));

        let too_many = LightingRequest::new(LightingChannel::Logo, 2)
            .with_colors([Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)])
            .resolve(&modes);
        assert!(too_many.is_err());
    }

    #[test]
    fn test_unknown_mode() {
        let modes = compatible_lighting_modes(DeviceFamily::Legacy);
        let result = LightingRequest::new(LightingChannel::Ring, 2)
            .with_colors([Rgb::new(1, 2, 3)])
            .resolve(&modes);
        assert!(matches!(
            result,
            Err(KrakenError::UnsupportedLightingMode { mode_id: 2, .. })
        ));
    }

    #[test]
    fn test_speed_and_direction_defaults() {
        let modes = compatible_lighting_modes(DeviceFamily::KrakenX3);

        // fixed: neither speed nor direction
        let command = LightingRequest::new(LightingChannel::Ring, 2)
            .with_colors([Rgb::new(10, 20, 30)])
            .with_speed(LightingSpeed::Fastest)
            .with_direction(LightingDirection::Backward)
            .resolve(&modes)
            .unwrap();
        assert_eq!(command.speed, LightingSpeed::Normal);
        assert_eq!(command.direction, LightingDirection::Forward);

        // marquee-3: both
        let command = LightingRequest::new(LightingChannel::Ring, 6)
            .with_colors([Rgb::new(10, 20, 30)])
            .with_speed(LightingSpeed::Fastest)
            .with_direction(LightingDirection::Backward)
            .resolve(&modes)
            .unwrap();
        assert_eq!(command.speed, LightingSpeed::Fastest);
        assert_eq!(command.direction, LightingDirection::Backward);

        // pulse: speed only, unset speed falls back to normal
        let command = LightingRequest::new(LightingChannel::Ring, 19)
            .with_colors([Rgb::new(10, 20, 30)])
            .with_direction(LightingDirection::Backward)
            .resolve(&modes)
            .unwrap();
        assert_eq!(command.speed, LightingSpeed::Normal);
        assert_eq!(command.direction, LightingDirection::Forward);
    }
}
