//! Temperature to duty curves and their interpolation.

use serde::{Deserialize, Serialize};

use crate::config::{MAX_CURVE_TEMP, MIN_CURVE_TEMP};
use crate::cooling::Channel;
use crate::error::{KrakenError, Result};

/// One `(temperature, duty)` point of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Liquid temperature in Celsius.
    pub temperature: u8,
    /// Duty percentage (0-100).
    pub duty: u8,
}

impl From<(u8, u8)> for CurvePoint {
    fn from((temperature, duty): (u8, u8)) -> Self {
        Self { temperature, duty }
    }
}

/// An ordered temperature to duty mapping.
///
/// Temperatures are strictly increasing. A single point means a fixed duty
/// across all temperatures; an empty curve yields 0% everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeedCurve {
    points: Vec<CurvePoint>,
}

impl SpeedCurve {
    /// Build a curve, rejecting temperatures that are not strictly increasing.
    pub fn new(points: impl IntoIterator<Item = impl Into<CurvePoint>>) -> Result<Self> {
        let points: Vec<CurvePoint> = points.into_iter().map(Into::into).collect();

        for pair in points.windows(2) {
            if pair[1].temperature <= pair[0].temperature {
                return Err(KrakenError::InvalidProfile(format!(
                    "temperatures must be strictly increasing ({}°C after {}°C)",
                    pair[1].temperature, pair[0].temperature
                )));
            }
        }

        Ok(Self { points })
    }

    /// Check every point against the temperature window and the channel's duty range.
    pub fn validate_for(&self, channel: Channel) -> Result<()> {
        for point in &self.points {
            if point.temperature < MIN_CURVE_TEMP || point.temperature > MAX_CURVE_TEMP {
                return Err(KrakenError::InvalidTemperature {
                    value: point.temperature,
                    min: MIN_CURVE_TEMP,
                    max: MAX_CURVE_TEMP,
                });
            }
            channel.validate_duty(point.duty)?;
        }
        Ok(())
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_fixed(&self) -> bool {
        self.points.len() == 1
    }

    /// The curve as `(temperature, duty)` pairs, the shape drivers take.
    pub fn to_pairs(&self) -> Vec<(u8, u8)> {
        self.points.iter().map(|p| (p.temperature, p.duty)).collect()
    }
}

/// Duty percentage the curve requests at `current_temp`.
///
/// Linear interpolation between the last point at or below the temperature
/// and the first point above it. Outside the curve the nearest end point is
/// held.
pub fn duty_for_temperature(curve: &SpeedCurve, current_temp: f64) -> f64 {
    let lower = curve
        .points
        .iter()
        .rev()
        .find(|p| f64::from(p.temperature) <= current_temp);
    let upper = curve
        .points
        .iter()
        .find(|p| f64::from(p.temperature) > current_temp);

    match (lower, upper) {
        (Some(p1), Some(p2)) => {
            let slope = (f64::from(p2.duty) - f64::from(p1.duty))
                / (f64::from(p2.temperature) - f64::from(p1.temperature));
            slope * (current_temp - f64::from(p1.temperature)) + f64::from(p1.duty)
        }
        (Some(p1), None) => f64::from(p1.duty),
        (None, Some(p2)) => f64::from(p2.duty),
        (None, None) => 0.0,
    }
}
