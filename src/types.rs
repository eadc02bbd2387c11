//! Core types and settings for the flywheel stroke model

use serde::{Deserialize, Serialize};

use crate::error::StrokeError;
use crate::math::{MAGIC_CONSTANT, abs};

/// Largest moving-average window the smoothing filter can hold
pub const MAX_SMOOTHING_WINDOW: usize = 16;

/// Number of completed stroke durations kept for cadence reporting
pub const STROKE_HISTORY_LEN: usize = 5;

/// Biomechanical stage of a rowing stroke
///
/// Exactly one phase is current at any time. `Idle` is not terminal: it is a
/// reset checkpoint that the next large enough acceleration leaves again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// No rowing detected, kinematic counters were reset
    Idle,
    /// Rower is accelerating the flywheel
    #[default]
    Drive,
    /// Flywheel is spinning down between drives
    Recovery,
}

/// Ergometer resistance setting, fixing the drag factor for a session
///
/// # Example
/// ```
/// use flywheel_stroke::Resistance;
///
/// assert_eq!(Resistance::Standard.drag_factor(), 120.0);
/// assert_eq!(Resistance::High.drag_factor(), 130.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resistance {
    /// Normal damper setting
    #[default]
    Standard,
    /// High resistance setting
    High,
}

impl Resistance {
    /// Drag factor for this resistance setting
    pub fn drag_factor(self) -> f32 {
        match self {
            Resistance::Standard => 120.0,
            Resistance::High => 130.0,
        }
    }
}

/// Angular acceleration thresholds (rad/s²) driving phase transitions
///
/// Thresholds are asymmetric: the catch is explosive, so drive onset needs a
/// larger magnitude than the slow spin-down that marks recovery onset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseThresholds {
    /// Acceleration at or above which Recovery/Idle switches to Drive
    pub drive_onset: f32,
    /// Acceleration at or below which Drive/Idle switches to Recovery (negative)
    pub recovery_onset: f32,
    /// Magnitude below which any non-idle phase falls back to Idle
    pub idle_band: f32,
}

impl Default for PhaseThresholds {
    fn default() -> Self {
        Self {
            drive_onset: 0.2,
            recovery_onset: -0.1,
            idle_band: 0.01,
        }
    }
}

impl PhaseThresholds {
    /// Phase the model should switch to for the given acceleration, or
    /// `None` when the current phase holds.
    ///
    /// # Example
    /// ```
    /// use flywheel_stroke::{Phase, PhaseThresholds};
    ///
    /// let thresholds = PhaseThresholds::default();
    /// assert_eq!(thresholds.next_phase(Phase::Recovery, 0.25), Some(Phase::Drive));
    /// assert_eq!(thresholds.next_phase(Phase::Drive, -0.099), None);
    /// ```
    pub fn next_phase(&self, current: Phase, acceleration: f32) -> Option<Phase> {
        match current {
            Phase::Recovery | Phase::Idle if acceleration >= self.drive_onset => Some(Phase::Drive),
            Phase::Drive | Phase::Idle if acceleration <= self.recovery_onset => {
                Some(Phase::Recovery)
            }
            Phase::Drive | Phase::Recovery if abs(acceleration) < self.idle_band => {
                Some(Phase::Idle)
            }
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), StrokeError> {
        if !(self.drive_onset.is_finite() && self.drive_onset > 0.0) {
            return Err(StrokeError::InvalidSettings("drive onset must be positive"));
        }
        if !(self.recovery_onset.is_finite() && self.recovery_onset < 0.0) {
            return Err(StrokeError::InvalidSettings("recovery onset must be negative"));
        }
        if !(self.idle_band.is_finite() && self.idle_band >= 0.0) {
            return Err(StrokeError::InvalidSettings("idle band must be non-negative"));
        }
        if self.idle_band >= self.drive_onset || self.idle_band >= abs(self.recovery_onset) {
            return Err(StrokeError::InvalidSettings(
                "idle band must be narrower than both onset thresholds",
            ));
        }
        Ok(())
    }
}

/// Stroke model settings
///
/// # Example
/// ```
/// use flywheel_stroke::{Phase, Resistance, StrokeSettings, StrokeStateMachine};
///
/// let settings = StrokeSettings {
///     smoothing_window: 6,           // smoother, for recreational rowing
///     resistance: Resistance::High,
///     initial_phase: Phase::Idle,
///     ..Default::default()
/// };
/// let machine = StrokeStateMachine::with_settings(settings).unwrap();
/// assert_eq!(machine.phase(), Phase::Idle);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSettings {
    /// Sensor pulses per flywheel revolution
    pub pulses_per_revolution: u32,
    /// Moving-average window over pulse intervals
    ///
    /// 3 is more responsive, 6 is smoother. Must be in `1..=MAX_SMOOTHING_WINDOW`.
    pub smoothing_window: usize,
    /// Divide the moving-average sum by the number of held samples instead
    /// of the configured window size
    ///
    /// Off by default: until the window fills, early samples are
    /// under-weighted (sum / window).
    pub normalize_by_actual_count: bool,
    /// Ergometer resistance, fixing the drag factor
    pub resistance: Resistance,
    /// Empirical flywheel-to-boat coupling constant
    pub magic_constant: f32,
    /// Phase transition thresholds
    pub thresholds: PhaseThresholds,
    /// Phase the model starts in
    ///
    /// Defaults to `Drive`, which may not be what a fresh session wants; set
    /// `Idle` to start from the reset checkpoint instead.
    pub initial_phase: Phase,
}

impl Default for StrokeSettings {
    fn default() -> Self {
        Self {
            pulses_per_revolution: 4,
            smoothing_window: 3,
            normalize_by_actual_count: false,
            resistance: Resistance::default(),
            magic_constant: MAGIC_CONSTANT,
            thresholds: PhaseThresholds::default(),
            initial_phase: Phase::default(),
        }
    }
}

impl StrokeSettings {
    /// Check the settings for values the model cannot run with
    pub fn validate(&self) -> Result<(), StrokeError> {
        if self.pulses_per_revolution == 0 {
            return Err(StrokeError::InvalidSettings("pulses per revolution must be at least 1"));
        }
        if self.smoothing_window == 0 || self.smoothing_window > MAX_SMOOTHING_WINDOW {
            return Err(StrokeError::InvalidSettings("smoothing window out of range"));
        }
        if !(self.magic_constant.is_finite() && self.magic_constant > 0.0) {
            return Err(StrokeError::InvalidSettings("magic constant must be positive"));
        }
        self.thresholds.validate()
    }
}

/// Angular state of the flywheel after one pulse
///
/// `pulse_count` and `cumulative_angle` only grow within a run and go back
/// to zero when the model falls idle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KinematicSnapshot {
    /// Pulses counted since the start of the run
    pub pulse_count: u32,
    /// Angle swept since the start of the run in radians
    pub cumulative_angle: f32,
    /// Moving-average pulse interval in seconds
    pub smoothed_interval: f32,
    /// Angular velocity in rad/s
    pub angular_velocity: f32,
    /// Angular acceleration in rad/s²
    pub angular_acceleration: f32,
}
