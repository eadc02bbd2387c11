//! Error type for the stroke model

use core::fmt;

use crate::types::Phase;

/// Errors reported while feeding pulses through the stroke model.
///
/// Sample-level errors drop the offending pulse and leave the last good
/// state in place, so the caller may keep streaming. Contract violations
/// (`DoubleStart`) and configuration errors are not expected at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeError {
    /// Pulse interval was zero, negative, NaN or infinite.
    InvalidSample {
        /// The rejected interval in seconds.
        interval: f32,
    },

    /// Inbound pulse data did not decode to a number.
    MalformedSample,

    /// A phase segment was started twice without being ended.
    DoubleStart {
        /// Phase the segment belongs to.
        phase: Phase,
    },

    /// Smoothed interval was zero (or otherwise unusable as a divisor).
    DivisionDegeneracy {
        /// The smoothed interval that could not be divided by.
        interval: f32,
    },

    /// Settings rejected by [`StrokeSettings::validate`](crate::StrokeSettings::validate).
    InvalidSettings(&'static str),
}

impl StrokeError {
    /// Whether the pulse stream can simply continue with the next sample.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidSample { .. } | Self::MalformedSample | Self::DivisionDegeneracy { .. }
        )
    }
}

impl fmt::Display for StrokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSample { interval } => {
                write!(f, "Invalid pulse interval: {} s (must be positive and finite)", interval)
            }
            Self::MalformedSample => write!(f, "Malformed pulse sample"),
            Self::DoubleStart { phase } => {
                write!(f, "{:?} segment started twice without an end", phase)
            }
            Self::DivisionDegeneracy { interval } => {
                write!(f, "Degenerate smoothed interval: {} s", interval)
            }
            Self::InvalidSettings(reason) => write!(f, "Invalid settings: {}", reason),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StrokeError {}
