//! Session plot demonstration
//!
//! Simulates a short rowing session with a few idle pauses, runs every
//! pulse through the stroke model, logs one telemetry record per pulse to
//! CSV and plots the flywheel speed, phase and boat-speed estimate.
//!
//! Run with: `cargo run --example session_plot`

use flywheel_stroke::{Phase, StrokeSettings, StrokeStateMachine, TelemetryRecord};
use plotters::prelude::*;
use rand::prelude::*;
use rand_pcg::Pcg64;
use std::error::Error;

const STROKES_PER_PIECE: usize = 8;
const PIECES: usize = 3;

/// Pulse intervals of a session: pieces of strokes separated by a steady spin-down
fn simulate_session(seed: u64) -> Vec<f32> {
    let mut rng = Pcg64::seed_from_u64(seed);
    let mut intervals = Vec::new();

    for _ in 0..PIECES {
        for _ in 0..STROKES_PER_PIECE {
            let effort = rng.random_range(0.9..1.1);
            for i in 0..12 {
                intervals.push((0.040 - 0.001 * i as f32) / effort);
            }
            for i in 0..24 {
                intervals.push((0.029 + 0.0005 * i as f32) / effort);
            }
        }
        // Paddle: flywheel coasting at a constant rate
        intervals.extend(std::iter::repeat_n(0.06, 40));
    }

    intervals
}

fn phase_level(phase: Phase) -> f32 {
    match phase {
        Phase::Idle => 0.0,
        Phase::Recovery => 1.0,
        Phase::Drive => 2.0,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let settings = StrokeSettings {
        normalize_by_actual_count: true,
        ..Default::default()
    };
    let mut machine = StrokeStateMachine::with_settings(settings)?;

    let intervals = simulate_session(42);
    println!("Processing {} pulses...", intervals.len());

    let mut times = Vec::with_capacity(intervals.len());
    let mut records = Vec::with_capacity(intervals.len());
    let mut writer = csv::Writer::from_path("session_telemetry.csv")?;

    for interval in intervals {
        let update = match machine.on_pulse(interval) {
            Ok(update) => update,
            Err(error) => {
                eprintln!("dropped pulse: {}", error);
                continue;
            }
        };

        if let Some(cycle) = update.transition.and_then(|t| t.stroke) {
            println!(
                "stroke {}: {:.2} s, {:.1} spm",
                machine.stroke_count(),
                cycle.duration,
                cycle.cadence
            );
        }

        let record = machine.telemetry();
        writer.serialize(record)?;
        times.push(machine.clock());
        records.push(record);
    }
    writer.flush()?;

    create_session_plot(&times, &records)?;

    println!("✓ Telemetry saved to session_telemetry.csv");
    println!("✓ Plot saved to session_plot.png");
    Ok(())
}

/// Three stacked panels: angular velocity, phase, linear velocity
fn create_session_plot(times: &[f32], records: &[TelemetryRecord]) -> Result<(), Box<dyn Error>> {
    let (Some(&start), Some(&end)) = (times.first(), times.last()) else {
        return Ok(());
    };

    let root = BitMapBackend::new("session_plot.png", (1000, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((3, 1));

    let max_velocity = records
        .iter()
        .map(|r| r.angular_velocity)
        .fold(1.0f32, f32::max);

    let mut velocity_chart = ChartBuilder::on(&panels[0])
        .caption("Flywheel session", ("sans-serif", 20))
        .margin(5)
        .x_label_area_size(0)
        .y_label_area_size(50)
        .build_cartesian_2d(start..end, 0f32..max_velocity * 1.1)?;

    velocity_chart.configure_mesh().y_desc("rad/s").draw()?;
    velocity_chart
        .draw_series(LineSeries::new(
            times.iter().zip(records).map(|(&t, r)| (t, r.angular_velocity)),
            &BLUE,
        ))?
        .label("Angular velocity")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], BLUE));
    velocity_chart.configure_series_labels().draw()?;

    let mut phase_chart = ChartBuilder::on(&panels[1])
        .margin(5)
        .x_label_area_size(0)
        .y_label_area_size(50)
        .build_cartesian_2d(start..end, -0.2f32..2.2f32)?;

    phase_chart
        .configure_mesh()
        .y_desc("Idle / Rec / Drive")
        .draw()?;
    phase_chart
        .draw_series(LineSeries::new(
            times.iter().zip(records).map(|(&t, r)| (t, phase_level(r.phase))),
            &RED,
        ))?
        .label("Phase")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], RED));
    phase_chart.configure_series_labels().draw()?;

    let max_speed = records
        .iter()
        .map(|r| r.linear_velocity)
        .fold(0.1f32, f32::max);

    let mut speed_chart = ChartBuilder::on(&panels[2])
        .margin(5)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(start..end, 0f32..max_speed * 1.1)?;

    speed_chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("m/s")
        .draw()?;
    speed_chart
        .draw_series(LineSeries::new(
            times.iter().zip(records).map(|(&t, r)| (t, r.linear_velocity)),
            &GREEN,
        ))?
        .label("Boat speed estimate")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], GREEN));
    speed_chart.configure_series_labels().draw()?;

    root.present()?;
    Ok(())
}
