//! Telemetry values handed to external consumers, and inbound pulse decoding

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StrokeError;
use crate::types::Phase;

/// Three-field frame sent to the visualisation consumer
///
/// Displays as `"{smoothed_interval}/{angular_velocity}/{linear_velocity}\n"`.
/// The layout is a compatibility contract: slash-delimited, newline
/// terminated, no padding.
///
/// # Example
/// ```
/// use flywheel_stroke::TelemetryFrame;
///
/// let frame = TelemetryFrame {
///     smoothed_interval: 0.25,
///     angular_velocity: 6.5,
///     linear_velocity: 0.0,
/// };
/// assert_eq!(frame.to_string(), "0.25/6.5/0\n");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetryFrame {
    /// Smoothed pulse interval in seconds
    pub smoothed_interval: f32,
    /// Angular velocity in rad/s
    pub angular_velocity: f32,
    /// Boat-speed estimate of the active phase in m/s
    pub linear_velocity: f32,
}

impl fmt::Display for TelemetryFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}/{}/{}",
            self.smoothed_interval, self.angular_velocity, self.linear_velocity
        )
    }
}

/// All fields a session logger may persist, copied out of the model
///
/// Durations are in seconds on the session clock (sum of pulse intervals).
/// Fields that are undefined early in a session (no stroke yet) read 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Current phase
    pub phase: Phase,
    /// Stroke cycles recorded so far
    pub stroke_count: u32,
    /// Pulses in the current run
    pub pulse_count: u32,
    /// Smoothed pulse interval
    pub smoothed_interval: f32,
    /// Angular velocity in rad/s
    pub angular_velocity: f32,
    /// Boat-speed estimate of the active phase in m/s
    pub linear_velocity: f32,
    /// Time since the current stroke's drive started
    pub stroke_elapsed: f32,
    /// Mean stroke duration over the history
    pub mean_stroke_time: f32,
    /// Duration of the last completed drive
    pub last_drive_time: f32,
    /// Duration of the last completed recovery
    pub last_recovery_time: f32,
    /// Strokes per minute, `60 / mean_stroke_time`
    pub cadence: f32,
    /// Estimated power, `drag_factor * linear_velocity^3`
    pub power: f32,
}

impl TelemetryRecord {
    /// The wire frame carried by this record
    pub fn frame(&self) -> TelemetryFrame {
        TelemetryFrame {
            smoothed_interval: self.smoothed_interval,
            angular_velocity: self.angular_velocity,
            linear_velocity: self.linear_velocity,
        }
    }
}

/// Decode a pulse interval sent as text, in seconds
///
/// Surrounding whitespace (including a trailing newline) is ignored.
///
/// # Example
/// ```
/// use flywheel_stroke::{parse_interval, StrokeError};
///
/// assert_eq!(parse_interval(" 0.042\n"), Ok(0.042));
/// assert_eq!(parse_interval("abc"), Err(StrokeError::MalformedSample));
/// assert!(matches!(parse_interval("-1"), Err(StrokeError::InvalidSample { .. })));
/// ```
pub fn parse_interval(text: &str) -> Result<f32, StrokeError> {
    let interval = text
        .trim()
        .parse::<f32>()
        .map_err(|_| StrokeError::MalformedSample)?;
    validate_interval(interval)
}

/// Decode a pulse interval sent as a little-endian `f32`
pub fn interval_from_le_bytes(bytes: [u8; 4]) -> Result<f32, StrokeError> {
    validate_interval(f32::from_le_bytes(bytes))
}

fn validate_interval(interval: f32) -> Result<f32, StrokeError> {
    if interval.is_finite() && interval > 0.0 {
        Ok(interval)
    } else {
        Err(StrokeError::InvalidSample { interval })
    }
}
