//! Stroke state machine: phase detection and per-phase speed estimation

use crate::drag::{DragEstimator, DragModel, FixedDragFactor};
use crate::error::StrokeError;
use crate::filter::SmoothingFilter;
use crate::history::StrokeHistory;
use crate::kinematics::AngularKinematics;
use crate::segment::{CompletedSegment, PhaseSegment, SegmentBoundary};
use crate::telemetry::{TelemetryFrame, TelemetryRecord};
use crate::types::{KinematicSnapshot, Phase, StrokeSettings};

/// Timing of one completed stroke cycle (Drive entry to Drive entry)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeCycle {
    /// Duration of the cycle that just ended, in seconds
    pub duration: f32,
    /// Mean over the stroke history, including this cycle
    pub mean_stroke_time: f32,
    /// Strokes per minute from the mean
    pub cadence: f32,
}

/// Cadence estimate handed to audio feedback when a drive starts
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CadenceCue {
    /// Strokes per minute, 0 before the first full stroke
    pub cadence: f32,
    /// Mean stroke time in seconds, 0 before the first full stroke
    pub mean_stroke_time: f32,
}

/// Everything that happened during one accepted phase change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Phase that ended
    pub from: Phase,
    /// Phase that started
    pub to: Phase,
    /// The segment closed by this transition, if one was open
    pub completed: Option<CompletedSegment>,
    /// Stroke cycle recorded by this transition (Drive entries only)
    pub stroke: Option<StrokeCycle>,
    cue: Option<CadenceCue>,
}

impl Transition {
    /// "Phase started" signal for audio feedback, present on every Drive entry
    pub fn cue(&self) -> Option<CadenceCue> {
        self.cue
    }
}

/// Result of feeding one pulse through the model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseUpdate {
    /// Kinematic state after the pulse (counters zeroed if the model fell idle)
    pub snapshot: KinematicSnapshot,
    /// Phase after the pulse
    pub phase: Phase,
    /// Phase change triggered by the pulse, if any
    pub transition: Option<Transition>,
}

/// Impulse-driven stroke model of a flywheel ergometer
///
/// Owns the smoothing filter, the angular kinematics, one segment per phase
/// kind, the drag model and the stroke history. Pulses must be fed in
/// arrival order from a single thread; other threads read results through
/// copies (see [`TelemetryRecord`] and, with `std`, the `shared` module).
///
/// Transition rules on the acceleration `a` of each pulse:
///
/// | Condition       | From           | To       |
/// |-----------------|----------------|----------|
/// | `a >= 0.2`      | Recovery, Idle | Drive    |
/// | `a <= -0.1`     | Drive, Idle    | Recovery |
/// | `\|a\| < 0.01`  | Drive, Recovery| Idle     |
///
/// Otherwise the phase holds.
///
/// # Example
/// ```
/// use flywheel_stroke::{Phase, StrokeStateMachine};
///
/// let mut machine = StrokeStateMachine::new();
/// for interval in [0.05, 0.05, 0.05, 0.045, 0.04] {
///     let update = machine.on_pulse(interval).unwrap();
///     if let Some(cue) = update.transition.and_then(|t| t.cue()) {
///         println!("drive started, cadence {:.1} spm", cue.cadence);
///     }
/// }
/// print!("{}", machine.telemetry_frame());
/// ```
#[derive(Debug, Clone)]
pub struct StrokeStateMachine<E = FixedDragFactor> {
    settings: StrokeSettings,
    filter: SmoothingFilter,
    kinematics: AngularKinematics,
    snapshot: KinematicSnapshot,
    phase: Phase,
    drive: PhaseSegment,
    recovery: PhaseSegment,
    drag: DragModel<E>,
    history: StrokeHistory,
    /// Session clock: sum of accepted pulse intervals
    clock: f32,
    last_drive_entry: Option<f32>,
    last_drive: Option<CompletedSegment>,
    last_recovery: Option<CompletedSegment>,
    stroke_count: u32,
    completed_segments: u32,
}

impl StrokeStateMachine<FixedDragFactor> {
    /// Create a model with default settings and a fixed drag factor
    pub fn new() -> Self {
        Self::build(StrokeSettings::default(), FixedDragFactor)
    }

    /// Create a model with the given settings and a fixed drag factor
    pub fn with_settings(settings: StrokeSettings) -> Result<Self, StrokeError> {
        Self::with_estimator(settings, FixedDragFactor)
    }
}

impl Default for StrokeStateMachine<FixedDragFactor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DragEstimator> StrokeStateMachine<E> {
    /// Create a model whose drag factor is revised by `estimator` at every
    /// recovery onset
    pub fn with_estimator(settings: StrokeSettings, estimator: E) -> Result<Self, StrokeError> {
        settings.validate()?;
        Ok(Self::build(settings, estimator))
    }

    fn build(settings: StrokeSettings, estimator: E) -> Self {
        Self {
            settings,
            filter: SmoothingFilter::new(
                settings.smoothing_window,
                settings.normalize_by_actual_count,
            ),
            kinematics: AngularKinematics::new(settings.pulses_per_revolution),
            snapshot: KinematicSnapshot::default(),
            phase: settings.initial_phase,
            drive: PhaseSegment::new(Phase::Drive),
            recovery: PhaseSegment::new(Phase::Recovery),
            drag: DragModel::with_estimator(
                settings.resistance.drag_factor(),
                settings.magic_constant,
                estimator,
            ),
            history: StrokeHistory::new(),
            clock: 0.0,
            last_drive_entry: None,
            last_drive: None,
            last_recovery: None,
            stroke_count: 0,
            completed_segments: 0,
        }
    }

    /// Feed one raw pulse interval in seconds
    ///
    /// Invalid intervals are rejected before touching any state. A smoothed
    /// interval that cannot be divided by is reported as
    /// `DivisionDegeneracy`; the previous snapshot stays current.
    pub fn on_pulse(&mut self, interval: f32) -> Result<PulseUpdate, StrokeError> {
        if !(interval.is_finite() && interval > 0.0) {
            log_warn!("dropping invalid pulse interval {}", interval);
            return Err(StrokeError::InvalidSample { interval });
        }

        let smoothed = self.filter.push(interval);
        let snapshot = match self.kinematics.on_pulse(smoothed) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                log_warn!("dropping pulse: degenerate smoothed interval {}", smoothed);
                return Err(error);
            }
        };

        log_trace!(
            "pulse {} dt={} w={} a={}",
            snapshot.pulse_count,
            snapshot.smoothed_interval,
            snapshot.angular_velocity,
            snapshot.angular_acceleration
        );

        self.advance(snapshot, interval)
    }

    /// Run phase detection for a kinematic snapshot
    ///
    /// `elapsed` is the time since the previous snapshot and advances the
    /// session clock. [`on_pulse`](Self::on_pulse) calls this with the raw
    /// pulse interval; callers with their own kinematics can call it
    /// directly.
    pub fn advance(
        &mut self,
        snapshot: KinematicSnapshot,
        elapsed: f32,
    ) -> Result<PulseUpdate, StrokeError> {
        let next = self
            .settings
            .thresholds
            .next_phase(self.phase, snapshot.angular_acceleration);
        if let Some(to) = next {
            self.check_entry(to)?;
        }

        self.snapshot = snapshot;
        if elapsed.is_finite() && elapsed > 0.0 {
            self.clock += elapsed;
        }

        let transition = match next {
            Some(to) => Some(self.transition_to(to)?),
            None => None,
        };

        Ok(PulseUpdate {
            snapshot: self.snapshot,
            phase: self.phase,
            transition,
        })
    }

    /// Refuse a transition whose target segment is still open, before any
    /// state has changed
    fn check_entry(&self, to: Phase) -> Result<(), StrokeError> {
        let segment = match to {
            Phase::Drive => &self.drive,
            Phase::Recovery => &self.recovery,
            Phase::Idle => return Ok(()),
        };
        if segment.is_open() {
            log_warn!("{:?} entered while its segment is still open", to);
            return Err(StrokeError::DoubleStart { phase: to });
        }
        Ok(())
    }

    fn transition_to(&mut self, to: Phase) -> Result<Transition, StrokeError> {
        let from = self.phase;
        let boundary = SegmentBoundary {
            angle: self.snapshot.cumulative_angle,
            angular_velocity: self.snapshot.angular_velocity,
            time: self.clock,
        };

        log_debug!(
            "{:?} -> {:?} at t={} a={}",
            from,
            to,
            self.clock,
            self.snapshot.angular_acceleration
        );

        // Close the ending segment before anything else is opened
        let completed = self.close_segment(from, boundary);
        self.phase = to;

        let mut stroke = None;
        let mut cue = None;
        match to {
            Phase::Drive => {
                self.drive.start(boundary)?;
                stroke = self.record_drive_entry();
                cue = Some(CadenceCue {
                    cadence: self.history.cadence().unwrap_or(0.0),
                    mean_stroke_time: self.history.mean().unwrap_or(0.0),
                });
            }
            Phase::Recovery => {
                self.recovery.start(boundary)?;
                self.drag.update_conversion_factor(self.last_recovery.as_ref());
            }
            Phase::Idle => self.start_fresh_run(),
        }

        Ok(Transition {
            from,
            to,
            completed,
            stroke,
            cue,
        })
    }

    fn close_segment(
        &mut self,
        phase: Phase,
        boundary: SegmentBoundary,
    ) -> Option<CompletedSegment> {
        let conversion_factor = self.drag.conversion_factor();
        let segment = match phase {
            Phase::Drive => &mut self.drive,
            Phase::Recovery => &mut self.recovery,
            Phase::Idle => return None,
        };

        let completed = segment.end(boundary, conversion_factor);
        segment.reset();

        if let Some(completed) = completed {
            self.completed_segments += 1;
            match completed.phase {
                Phase::Drive => self.last_drive = Some(completed),
                _ => self.last_recovery = Some(completed),
            }
            log_debug!(
                "{:?} segment done: {} s, {} m/s",
                completed.phase,
                completed.elapsed_time(),
                completed.linear_velocity
            );
        }
        completed
    }

    fn record_drive_entry(&mut self) -> Option<StrokeCycle> {
        let previous = self.last_drive_entry.replace(self.clock)?;
        let duration = self.clock - previous;

        self.history.push(duration);
        self.stroke_count += 1;

        let mean_stroke_time = self.history.mean().unwrap_or(duration);
        let cadence = self.history.cadence().unwrap_or(0.0);
        log_info!(
            "stroke {}: {} s (mean {} s, {} spm)",
            self.stroke_count,
            duration,
            mean_stroke_time,
            cadence
        );

        Some(StrokeCycle {
            duration,
            mean_stroke_time,
            cadence,
        })
    }

    fn start_fresh_run(&mut self) {
        self.drive = PhaseSegment::new(Phase::Drive);
        self.recovery = PhaseSegment::new(Phase::Recovery);
        self.kinematics.reset_counters();
        self.snapshot.pulse_count = 0;
        self.snapshot.cumulative_angle = 0.0;
        // The idle gap is not a stroke
        self.last_drive_entry = None;
    }

    /// Return to the initial state of a new session
    ///
    /// Settings and the drag model (including its estimator) are kept.
    pub fn reset(&mut self) {
        self.filter.reset();
        self.kinematics = AngularKinematics::new(self.settings.pulses_per_revolution);
        self.snapshot = KinematicSnapshot::default();
        self.phase = self.settings.initial_phase;
        self.drive = PhaseSegment::new(Phase::Drive);
        self.recovery = PhaseSegment::new(Phase::Recovery);
        self.history.clear();
        self.clock = 0.0;
        self.last_drive_entry = None;
        self.last_drive = None;
        self.last_recovery = None;
        self.stroke_count = 0;
        self.completed_segments = 0;
    }

    /// Boat-speed estimate of the active phase's segment, 0 while idle
    pub fn linear_velocity(&self) -> f32 {
        match self.phase {
            Phase::Drive => self.drive.linear_velocity(),
            Phase::Recovery => self.recovery.linear_velocity(),
            Phase::Idle => 0.0,
        }
    }

    /// Wire frame for the visualisation consumer
    pub fn telemetry_frame(&self) -> TelemetryFrame {
        TelemetryFrame {
            smoothed_interval: self.snapshot.smoothed_interval,
            angular_velocity: self.snapshot.angular_velocity,
            linear_velocity: self.linear_velocity(),
        }
    }

    /// Copy of every externally reported field
    pub fn telemetry(&self) -> TelemetryRecord {
        let linear_velocity = self.linear_velocity();
        TelemetryRecord {
            phase: self.phase,
            stroke_count: self.stroke_count,
            pulse_count: self.snapshot.pulse_count,
            smoothed_interval: self.snapshot.smoothed_interval,
            angular_velocity: self.snapshot.angular_velocity,
            linear_velocity,
            stroke_elapsed: self
                .last_drive_entry
                .map_or(0.0, |entry| self.clock - entry),
            mean_stroke_time: self.history.mean().unwrap_or(0.0),
            last_drive_time: self.last_drive.map_or(0.0, |s| s.elapsed_time()),
            last_recovery_time: self.last_recovery.map_or(0.0, |s| s.elapsed_time()),
            cadence: self.history.cadence().unwrap_or(0.0),
            power: self.drag.power(linear_velocity),
        }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Latest kinematic state
    pub fn snapshot(&self) -> KinematicSnapshot {
        self.snapshot
    }

    /// Settings in use
    pub fn settings(&self) -> StrokeSettings {
        self.settings
    }

    /// Drive segment
    pub fn drive_segment(&self) -> &PhaseSegment {
        &self.drive
    }

    /// Recovery segment
    pub fn recovery_segment(&self) -> &PhaseSegment {
        &self.recovery
    }

    /// Drag model
    pub fn drag_model(&self) -> &DragModel<E> {
        &self.drag
    }

    /// Completed stroke durations
    pub fn history(&self) -> &StrokeHistory {
        &self.history
    }

    /// Session clock in seconds
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Number of stroke cycles recorded
    pub fn stroke_count(&self) -> u32 {
        self.stroke_count
    }

    /// Number of phase segments completed
    pub fn completed_segments(&self) -> u32 {
        self.completed_segments
    }

    /// Most recent completed drive
    pub fn last_drive(&self) -> Option<CompletedSegment> {
        self.last_drive
    }

    /// Most recent completed recovery
    pub fn last_recovery(&self) -> Option<CompletedSegment> {
        self.last_recovery
    }
}
