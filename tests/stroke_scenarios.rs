use approx::{assert_abs_diff_eq, assert_relative_eq};
use flywheel_stroke::{
    CompletedSegment, DragEstimator, DragModel, KinematicSnapshot, Phase, PhaseSegment,
    SegmentBoundary, SmoothingFilter, StrokeError, StrokeSettings, StrokeStateMachine,
};

const EPSILON: f32 = 1e-5;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn snapshot_with_acceleration(acceleration: f32) -> KinematicSnapshot {
    KinematicSnapshot {
        pulse_count: 1,
        cumulative_angle: std::f32::consts::FRAC_PI_2,
        smoothed_interval: 0.25,
        angular_velocity: 6.0,
        angular_acceleration: acceleration,
    }
}

/// Three identical intervals fill the default window and give the exact
/// angular velocity of a quarter turn per interval
#[test]
fn test_quarter_second_pulses() {
    init_logging();
    let mut machine = StrokeStateMachine::new();

    let mut update = None;
    for _ in 0..3 {
        update = Some(machine.on_pulse(0.25).unwrap());
    }
    let snapshot = update.unwrap().snapshot;

    assert_abs_diff_eq!(snapshot.smoothed_interval, 0.25, epsilon = EPSILON);
    assert_abs_diff_eq!(snapshot.angular_velocity, 6.283, epsilon = 1e-3);
}

#[test]
fn test_conversion_factor_for_standard_drag() {
    let model = DragModel::new(120.0, 2.8);
    assert_abs_diff_eq!(model.conversion_factor(), 0.0354, epsilon = 1e-3);
    assert_relative_eq!(
        model.conversion_factor().powi(3),
        120.0e-6 / 2.8,
        max_relative = 1e-4
    );
}

#[test]
fn test_high_resistance_uses_higher_drag() {
    let standard = StrokeStateMachine::new();
    let high = StrokeStateMachine::with_settings(StrokeSettings {
        resistance: flywheel_stroke::Resistance::High,
        ..Default::default()
    })
    .unwrap();

    assert_eq!(high.drag_model().drag_factor(), 130.0);
    assert!(high.drag_model().conversion_factor() > standard.drag_model().conversion_factor());
}

/// Accelerations [0.05, 0.25, -0.15, 0.005] from Recovery go through
/// Drive, Recovery, Idle and complete exactly two segments
#[test]
fn test_acceleration_sequence_from_recovery() {
    init_logging();
    let mut machine = StrokeStateMachine::with_settings(StrokeSettings {
        initial_phase: Phase::Recovery,
        ..Default::default()
    })
    .unwrap();

    let mut phases = Vec::new();
    let mut completions = Vec::new();
    for acceleration in [0.05, 0.25, -0.15, 0.005] {
        let update = machine
            .advance(snapshot_with_acceleration(acceleration), 0.25)
            .unwrap();
        if let Some(transition) = update.transition {
            phases.push(transition.to);
            completions.extend(transition.completed);
        }
    }

    assert_eq!(phases, vec![Phase::Drive, Phase::Recovery, Phase::Idle]);
    assert_eq!(completions.len(), 2);
    assert_eq!(completions[0].phase, Phase::Drive);
    assert_eq!(completions[1].phase, Phase::Recovery);
    assert_eq!(machine.completed_segments(), 2);
}

#[test]
fn test_threshold_boundaries() {
    let mut drive = StrokeStateMachine::new();
    let update = drive.advance(snapshot_with_acceleration(-0.099), 0.1).unwrap();
    assert_eq!(update.phase, Phase::Drive);
    assert!(update.transition.is_none());

    let update = drive.advance(snapshot_with_acceleration(-0.1), 0.1).unwrap();
    assert_eq!(update.phase, Phase::Recovery);

    let update = drive.advance(snapshot_with_acceleration(0.199), 0.1).unwrap();
    assert_eq!(update.phase, Phase::Recovery);

    let update = drive.advance(snapshot_with_acceleration(0.2), 0.1).unwrap();
    assert_eq!(update.phase, Phase::Drive);
}

#[test]
fn test_segment_round_trip() {
    let conversion = DragModel::new(120.0, 2.8).conversion_factor();

    for (a0, a1) in [(0.0, 1.0), (10.0, 250.0), (3.5, 3.5)] {
        let mut segment = PhaseSegment::new(Phase::Drive);
        segment
            .start(SegmentBoundary {
                angle: a0,
                angular_velocity: 12.0,
                time: 0.0,
            })
            .unwrap();
        let completed = segment
            .end(
                SegmentBoundary {
                    angle: a1,
                    angular_velocity: 48.0,
                    time: 0.9,
                },
                conversion,
            )
            .unwrap();

        assert_eq!(completed.linear_velocity, conversion * 48.0);
        assert_eq!(segment.linear_velocity(), conversion * 48.0);
    }
}

#[test]
fn test_segment_double_start() {
    let mut segment = PhaseSegment::new(Phase::Recovery);
    segment.start(SegmentBoundary::default()).unwrap();
    assert_eq!(
        segment.start(SegmentBoundary::default()),
        Err(StrokeError::DoubleStart {
            phase: Phase::Recovery
        })
    );
}

#[test]
fn test_reset_twice_is_same_empty_state() {
    let mut segment = PhaseSegment::new(Phase::Drive);
    segment.start(SegmentBoundary::default()).unwrap();

    segment.reset();
    let first = segment;
    segment.reset();

    assert_eq!(segment, first);
    assert!(!segment.is_open());
    assert_eq!(segment.start_boundary(), None);
}

#[test]
fn test_both_normalisation_modes() {
    let mut quirk = SmoothingFilter::new(3, false);
    let mut normalised = SmoothingFilter::new(3, true);

    assert_abs_diff_eq!(quirk.push(0.06), 0.02, epsilon = EPSILON);
    assert_abs_diff_eq!(normalised.push(0.06), 0.06, epsilon = EPSILON);

    quirk.push(0.06);
    normalised.push(0.06);

    // Identical once the window is full
    assert_abs_diff_eq!(quirk.push(0.06), normalised.push(0.06), epsilon = EPSILON);
}

/// Simulated rowing: flywheel speeds up over a drive, spins down over a
/// recovery, and the machine tracks strokes and cadence
#[test]
fn test_simulated_strokes() {
    init_logging();
    let mut machine = StrokeStateMachine::with_settings(StrokeSettings {
        normalize_by_actual_count: true,
        ..Default::default()
    })
    .unwrap();

    let mut cues = 0;
    for _stroke in 0..6 {
        // Drive: intervals shrink (flywheel accelerates)
        for i in 0..12 {
            let interval = 0.040 - 0.001 * i as f32;
            if let Some(t) = machine.on_pulse(interval).unwrap().transition {
                cues += t.cue().is_some() as usize;
            }
        }
        // Recovery: intervals grow (flywheel decelerates)
        for i in 0..24 {
            let interval = 0.029 + 0.0005 * i as f32;
            if let Some(t) = machine.on_pulse(interval).unwrap().transition {
                cues += t.cue().is_some() as usize;
            }
        }
    }

    let record = machine.telemetry();
    assert!(cues >= 5, "expected a drive cue per stroke, got {}", cues);
    assert!(machine.stroke_count() >= 4);
    assert!(record.mean_stroke_time > 0.5 && record.mean_stroke_time < 2.0);
    assert_relative_eq!(record.cadence, 60.0 / record.mean_stroke_time, max_relative = 1e-5);
    assert!(record.last_drive_time > 0.0);
    assert!(record.last_recovery_time > 0.0);
    assert!(machine.last_drive().unwrap().linear_velocity > 0.0);
}

#[test]
fn test_steady_flywheel_goes_idle() {
    let mut machine = StrokeStateMachine::new();
    let mut went_idle = false;

    for _ in 0..10 {
        let update = machine.on_pulse(0.05).unwrap();
        if update.transition.is_some_and(|t| t.to == Phase::Idle) {
            went_idle = true;
            assert_eq!(update.snapshot.pulse_count, 0);
            assert_eq!(update.snapshot.cumulative_angle, 0.0);
        }
    }

    assert!(went_idle);
    assert_eq!(machine.phase(), Phase::Idle);
    assert_eq!(machine.telemetry_frame().linear_velocity, 0.0);
}

#[test]
fn test_invalid_samples_are_dropped() {
    init_logging();
    let mut machine = StrokeStateMachine::new();
    machine.on_pulse(0.05).unwrap();
    let good = machine.telemetry_frame();

    let error = machine.on_pulse(-0.05).unwrap_err();
    assert!(error.is_recoverable());
    assert_eq!(machine.telemetry_frame(), good);

    // Stream continues after a bad sample
    assert!(machine.on_pulse(0.05).is_ok());
    assert_eq!(machine.snapshot().pulse_count, 2);
}

/// A smoothed interval that underflows to zero is dropped without touching
/// the clock, phase, segments or telemetry, and the stream carries on
#[test]
fn test_degenerate_interval_keeps_last_good_state() {
    init_logging();
    let mut machine = StrokeStateMachine::new();
    let before = machine.telemetry();
    let drive = *machine.drive_segment();
    let recovery = *machine.recovery_segment();

    // 1e-45 / 3 rounds to 0.0 in the under-weighted average
    let error = machine.on_pulse(1e-45).unwrap_err();
    assert!(matches!(error, StrokeError::DivisionDegeneracy { .. }));
    assert!(error.is_recoverable());

    assert_eq!(machine.telemetry(), before);
    assert_eq!(machine.clock(), 0.0);
    assert_eq!(machine.phase(), Phase::Drive);
    assert_eq!(machine.snapshot(), KinematicSnapshot::default());
    assert_eq!(*machine.drive_segment(), drive);
    assert_eq!(*machine.recovery_segment(), recovery);

    for _ in 0..3 {
        assert!(machine.on_pulse(0.05).is_ok());
    }
    assert_eq!(machine.snapshot().pulse_count, 3);
    assert_abs_diff_eq!(machine.clock(), 0.15, epsilon = EPSILON);
}

/// Counts drag updates and remembers which ones saw a completed recovery
#[derive(Default)]
struct CountingEstimator {
    calls: usize,
    saw_recovery: Vec<bool>,
}

impl DragEstimator for CountingEstimator {
    fn estimate(&mut self, drag_factor: f32, last_recovery: Option<&CompletedSegment>) -> f32 {
        self.calls += 1;
        self.saw_recovery.push(last_recovery.is_some_and(|r| r.phase == Phase::Recovery));
        drag_factor
    }
}

#[test]
fn test_drag_update_once_per_recovery_entry() {
    let mut machine = StrokeStateMachine::with_estimator(
        StrokeSettings {
            initial_phase: Phase::Recovery,
            ..Default::default()
        },
        CountingEstimator::default(),
    )
    .unwrap();
    let conversion = machine.drag_model().conversion_factor();

    let mut recovery_entries = 0;
    for acceleration in [0.5, -0.5, 0.5, -0.5, 0.05, 0.5, -0.5] {
        let calls_before = machine.drag_model().estimator().calls;
        let update = machine
            .advance(snapshot_with_acceleration(acceleration), 0.25)
            .unwrap();
        let calls = machine.drag_model().estimator().calls;

        match update.transition.map(|t| t.to) {
            Some(Phase::Recovery) => {
                recovery_entries += 1;
                assert_eq!(calls, calls_before + 1);
            }
            _ => assert_eq!(calls, calls_before),
        }
    }

    assert_eq!(recovery_entries, 3);
    assert_eq!(machine.drag_model().estimator().calls, recovery_entries);
    // No recovery had completed at the first entry
    assert_eq!(
        machine.drag_model().estimator().saw_recovery,
        vec![false, true, true]
    );
    assert_eq!(machine.drag_model().conversion_factor(), conversion);
}

#[test]
fn test_drag_updates_match_recovery_entries_while_rowing() {
    let mut machine = StrokeStateMachine::with_estimator(
        StrokeSettings {
            normalize_by_actual_count: true,
            ..Default::default()
        },
        CountingEstimator::default(),
    )
    .unwrap();

    let mut recovery_entries = 0;
    for _stroke in 0..5 {
        let drive = (0..12).map(|i| 0.040 - 0.001 * i as f32);
        let recovery = (0..24).map(|i| 0.029 + 0.0005 * i as f32);
        for interval in drive.chain(recovery) {
            let update = machine.on_pulse(interval).unwrap();
            if update.transition.is_some_and(|t| t.to == Phase::Recovery) {
                recovery_entries += 1;
            }
        }
    }

    assert!(recovery_entries >= 5);
    assert_eq!(machine.drag_model().estimator().calls, recovery_entries);
}
