//! Per-phase segments and their linear velocity estimate

use serde::{Deserialize, Serialize};

use crate::error::StrokeError;
use crate::types::Phase;

/// Angular state of the flywheel at a phase boundary
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SegmentBoundary {
    /// Cumulative angle in radians
    pub angle: f32,
    /// Angular velocity in rad/s
    pub angular_velocity: f32,
    /// Session clock in seconds
    pub time: f32,
}

/// One finished occurrence of a Drive or Recovery phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletedSegment {
    /// Which phase this occurrence belonged to
    pub phase: Phase,
    /// Boundary captured when the phase was entered
    pub start: SegmentBoundary,
    /// Boundary captured when the phase was left
    pub end: SegmentBoundary,
    /// Estimated boat speed for this occurrence
    pub linear_velocity: f32,
}

impl CompletedSegment {
    /// Duration of the occurrence in seconds
    pub fn elapsed_time(&self) -> f32 {
        self.end.time - self.start.time
    }

    /// Angle swept during the occurrence in radians
    pub fn angular_displacement(&self) -> f32 {
        self.end.angle - self.start.angle
    }
}

/// Start/end state of a single Drive or Recovery occurrence
///
/// One instance exists per phase kind. `start` captures the entry state,
/// `end` captures the exit state and computes the boat-speed estimate, and
/// `reset` makes the instance ready for the next occurrence. The latest
/// estimate survives `reset` so telemetry can keep reporting it while the
/// phase is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSegment {
    phase: Phase,
    start: Option<SegmentBoundary>,
    end: Option<SegmentBoundary>,
    linear_velocity: f32,
}

impl PhaseSegment {
    /// Create an empty segment for the given phase
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            start: None,
            end: None,
            linear_velocity: 0.0,
        }
    }

    /// Record the entry state of the phase
    ///
    /// Starting a segment that was started and not yet ended is a contract
    /// violation and is reported, never overwritten.
    pub fn start(&mut self, boundary: SegmentBoundary) -> Result<(), StrokeError> {
        if self.start.is_some() && self.end.is_none() {
            return Err(StrokeError::DoubleStart { phase: self.phase });
        }
        self.start = Some(boundary);
        self.end = None;
        Ok(())
    }

    /// Record the exit state and compute the linear velocity
    ///
    /// `linear_velocity = conversion_factor * angular_velocity`, independent
    /// of the boundary angles. Returns `None` without touching the segment
    /// when it was never started.
    ///
    /// # Example
    /// ```
    /// use flywheel_stroke::{Phase, PhaseSegment, SegmentBoundary};
    ///
    /// let mut drive = PhaseSegment::new(Phase::Drive);
    /// drive.start(SegmentBoundary { angle: 0.0, angular_velocity: 20.0, time: 0.0 }).unwrap();
    /// let completed = drive
    ///     .end(SegmentBoundary { angle: 30.0, angular_velocity: 40.0, time: 0.8 }, 0.035)
    ///     .unwrap();
    /// assert_eq!(completed.linear_velocity, 0.035 * 40.0);
    /// ```
    pub fn end(
        &mut self,
        boundary: SegmentBoundary,
        conversion_factor: f32,
    ) -> Option<CompletedSegment> {
        let start = self.start?;
        if self.end.is_some() {
            return None;
        }

        self.end = Some(boundary);
        self.linear_velocity = conversion_factor * boundary.angular_velocity;

        Some(CompletedSegment {
            phase: self.phase,
            start,
            end: boundary,
            linear_velocity: self.linear_velocity,
        })
    }

    /// Clear start and end state for the next occurrence
    pub fn reset(&mut self) {
        self.start = None;
        self.end = None;
    }

    /// Phase this segment tracks
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the segment has been started and not yet ended
    pub fn is_open(&self) -> bool {
        self.start.is_some() && self.end.is_none()
    }

    /// Latest boat-speed estimate in m/s
    pub fn linear_velocity(&self) -> f32 {
        self.linear_velocity
    }

    /// Entry state, if started
    pub fn start_boundary(&self) -> Option<SegmentBoundary> {
        self.start
    }

    /// Exit state, if ended
    pub fn end_boundary(&self) -> Option<SegmentBoundary> {
        self.end
    }

    /// Duration of the current occurrence, once it has ended
    pub fn elapsed_time(&self) -> Option<f32> {
        Some(self.end?.time - self.start?.time)
    }
}
