//! Parsing utilities for CLI arguments.
//!
//! Every parser returns [`KrakenError::InvalidInput`] with a hint of the
//! accepted values.

use crate::cooling::Channel;
use crate::device::{LightingChannel, LightingDirection, LightingSpeed, Rgb};
use crate::error::{KrakenError, Result};

// =============================================================================
// Color Parsing
// =============================================================================

/// Parse a hex color string.
///
/// Accepts formats: `#RRGGBB` or `RRGGBB`
///
/// # Example
/// ```
/// use nzxt_kraken_control::utils::parsing::parse_hex_color;
///
/// let color = parse_hex_color("#FF5500").unwrap();
/// assert_eq!((color.red, color.green, color.blue), (255, 85, 0));
/// ```
pub fn parse_hex_color(hex: &str) -> Result<Rgb> {
    let digits = hex.trim().trim_start_matches('#');
    let invalid = || KrakenError::InvalidInput(format!("Invalid color hex: {}", hex));

    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let component =
        |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).map_err(|_| invalid());

    Ok(Rgb::new(component(0..2)?, component(2..4)?, component(4..6)?))
}

// =============================================================================
// Speed Curve Parsing
// =============================================================================

/// Parse curve steps written as `temp:duty` pairs separated by commas.
///
/// # Example
/// ```
/// use nzxt_kraken_control::utils::parsing::parse_curve_points;
///
/// let points = parse_curve_points("20:30, 40:60,60:100").unwrap();
/// assert_eq!(points, vec![(20, 30), (40, 60), (60, 100)]);
/// ```
pub fn parse_curve_points(input: &str) -> Result<Vec<(u8, u8)>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|pair| -> Result<(u8, u8)> {
            let invalid = || {
                KrakenError::InvalidInput(format!(
                    "Invalid curve point '{}'. Use TEMP:DUTY, e.g. 40:60",
                    pair
                ))
            };
            let (temp, duty) = pair.split_once(':').ok_or_else(invalid)?;
            let temp = temp.trim().parse::<u8>().map_err(|_| invalid())?;
            let duty = duty.trim().trim_end_matches('%').parse::<u8>().map_err(|_| invalid())?;
            Ok((temp, duty))
        })
        .collect()
}

// =============================================================================
// Channel Parsing
// =============================================================================

/// Parse a channel name string into a Channel enum.
///
/// # Arguments
/// * `name` - Channel name: "fan" or "pump"
pub fn parse_channel(name: &str) -> Result<Channel> {
    match name.to_lowercase().as_str() {
        "fan" => Ok(Channel::Fan),
        "pump" => Ok(Channel::Pump),
        _ => Err(KrakenError::InvalidInput(format!(
            "Unknown channel '{}'. Use: fan or pump",
            name
        ))),
    }
}

/// Parse a lighting channel: "logo" or "ring".
pub fn parse_lighting_channel(name: &str) -> Result<LightingChannel> {
    match name.to_lowercase().as_str() {
        "logo" => Ok(LightingChannel::Logo),
        "ring" => Ok(LightingChannel::Ring),
        _ => Err(KrakenError::InvalidInput(format!(
            "Unknown lighting channel '{}'. Use: logo or ring",
            name
        ))),
    }
}

// =============================================================================
// Lighting Parameters
// =============================================================================

pub fn parse_lighting_speed(name: &str) -> Result<LightingSpeed> {
    let lower = name.to_lowercase();
    LightingSpeed::ALL
        .into_iter()
        .find(|speed| speed.as_str() == lower)
        .ok_or_else(|| {
            KrakenError::InvalidInput(format!(
                "Unknown speed '{}'. Use: slowest, slower, normal, faster or fastest",
                name
            ))
        })
}

pub fn parse_lighting_direction(name: &str) -> Result<LightingDirection> {
    match name.to_lowercase().as_str() {
        "forward" => Ok(LightingDirection::Forward),
        "backward" | "backwards" => Ok(LightingDirection::Backward),
        _ => Err(KrakenError::InvalidInput(format!(
            "Unknown direction '{}'. Use: forward or backward",
            name
        ))),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color_with_hash() {
        assert_eq!(parse_hex_color("#FF0000").unwrap(), Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_parse_hex_color_without_hash() {
        assert_eq!(parse_hex_color("00ff7f").unwrap(), Rgb::new(0, 255, 127));
    }

    #[test]
    fn test_parse_hex_color_invalid() {
        assert!(parse_hex_color("FFF").is_err());
        assert!(parse_hex_color("").is_err());
        assert!(parse_hex_color("GG0000").is_err());
        assert!(parse_hex_color("ÿÿÿ").is_err());
        assert!(parse_hex_color("+F0000").is_err());
    }

    #[test]
    fn test_parse_curve_points() {
        assert_eq!(
            parse_curve_points("20:25,35:25 , 60:100%").unwrap(),
            vec![(20, 25), (35, 25), (60, 100)]
        );
        assert_eq!(parse_curve_points("40:50").unwrap(), vec![(40, 50)]);
        assert!(parse_curve_points("").unwrap().is_empty());
        assert!(parse_curve_points("20-30").is_err());
        assert!(parse_curve_points("20:300").is_err());
        assert!(parse_curve_points("twenty:30").is_err());
    }

    #[test]
    fn test_parse_channel() {
        assert!(matches!(parse_channel("fan").unwrap(), Channel::Fan));
        assert!(matches!(parse_channel("PUMP").unwrap(), Channel::Pump));
        assert!(parse_channel("invalid").is_err());
    }

    #[test]
    fn test_parse_lighting() {
        assert_eq!(parse_lighting_channel("Ring").unwrap(), LightingChannel::Ring);
        assert!(parse_lighting_channel("fan").is_err());
        assert_eq!(parse_lighting_speed("FASTEST").unwrap(), LightingSpeed::Fastest);
        assert!(parse_lighting_speed("warp").is_err());
        assert_eq!(
            parse_lighting_direction("backward").unwrap(),
            LightingDirection::Backward
        );
        assert!(parse_lighting_direction("sideways").is_err());
    }
}
