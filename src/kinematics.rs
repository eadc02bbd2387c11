//! Angular kinematics of the flywheel

use crate::error::StrokeError;
use crate::math::angle_per_pulse;
use crate::types::KinematicSnapshot;

/// Integrates pulses into angular displacement, velocity and acceleration
///
/// Every pulse advances the flywheel by a fixed angle. Velocity is that
/// angle over the smoothed interval; acceleration is the change in velocity
/// over the same smoothed interval. Reusing one interval for both the
/// velocity and its derivative is a modelling approximation, not an exact
/// derivative.
#[derive(Debug, Clone, Copy)]
pub struct AngularKinematics {
    angle_increment: f32,
    snapshot: KinematicSnapshot,
}

impl AngularKinematics {
    /// Create kinematics for a flywheel with the given sensor resolution
    pub fn new(pulses_per_revolution: u32) -> Self {
        Self {
            angle_increment: angle_per_pulse(pulses_per_revolution.max(1)),
            snapshot: KinematicSnapshot::default(),
        }
    }

    /// Account for one pulse with the given smoothed interval
    ///
    /// Fails with `DivisionDegeneracy` and leaves the state untouched when
    /// the interval cannot be divided by.
    ///
    /// # Example
    /// ```
    /// use flywheel_stroke::AngularKinematics;
    ///
    /// let mut kinematics = AngularKinematics::new(4);
    /// let snapshot = kinematics.on_pulse(0.25).unwrap();
    /// assert!((snapshot.angular_velocity - 6.2832).abs() < 1e-3);
    /// ```
    pub fn on_pulse(&mut self, smoothed_interval: f32) -> Result<KinematicSnapshot, StrokeError> {
        if !(smoothed_interval.is_finite() && smoothed_interval > 0.0) {
            return Err(StrokeError::DivisionDegeneracy {
                interval: smoothed_interval,
            });
        }

        let angular_velocity = self.angle_increment / smoothed_interval;
        let angular_acceleration =
            (angular_velocity - self.snapshot.angular_velocity) / smoothed_interval;
        if !(angular_velocity.is_finite() && angular_acceleration.is_finite()) {
            return Err(StrokeError::DivisionDegeneracy {
                interval: smoothed_interval,
            });
        }

        let pulse_count = self.snapshot.pulse_count.saturating_add(1);
        self.snapshot = KinematicSnapshot {
            pulse_count,
            cumulative_angle: pulse_count as f32 * self.angle_increment,
            smoothed_interval,
            angular_velocity,
            angular_acceleration,
        };

        Ok(self.snapshot)
    }

    /// Zero the pulse count and cumulative angle to start a fresh run
    ///
    /// Velocity is kept so the next acceleration is measured against the
    /// flywheel's last known speed.
    pub fn reset_counters(&mut self) {
        self.snapshot.pulse_count = 0;
        self.snapshot.cumulative_angle = 0.0;
    }

    /// Latest kinematic state
    pub fn snapshot(&self) -> KinematicSnapshot {
        self.snapshot
    }

    /// Angle swept per pulse in radians
    pub fn angle_increment(&self) -> f32 {
        self.angle_increment
    }
}
