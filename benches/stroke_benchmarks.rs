use criterion::{Criterion, black_box, criterion_group, criterion_main};
use flywheel_stroke::{SmoothingFilter, StrokeSettings, StrokeStateMachine, parse_interval};
use rand::prelude::*;
use rand_pcg::Pcg64;

// Pre-generated pulse intervals to eliminate RNG overhead during benchmarks
struct PreGeneratedPulses {
    intervals: Vec<f32>,
    index: usize,
}

impl PreGeneratedPulses {
    fn new(count: usize, seed: u64) -> Self {
        let mut rng = Pcg64::seed_from_u64(seed);
        let mut intervals = Vec::with_capacity(count);

        for i in 0..count {
            // 36 pulses per stroke: 12 drive pulses then 24 recovery pulses
            let position = i % 36;
            let base = if position < 12 {
                0.040 - 0.001 * position as f32
            } else {
                0.029 + 0.0005 * (position - 12) as f32
            };
            intervals.push(base + rng.random_range(-0.0003..0.0003));
        }

        Self { intervals, index: 0 }
    }

    fn next(&mut self) -> f32 {
        let interval = self.intervals[self.index];
        self.index = (self.index + 1) % self.intervals.len();
        interval
    }
}

/// Benchmark a single pulse through the full pipeline
fn bench_on_pulse(c: &mut Criterion) {
    let mut machine = StrokeStateMachine::new();
    let mut pulses = PreGeneratedPulses::new(3600, 42);

    c.bench_function("stroke_on_pulse", |b| {
        b.iter(|| {
            let _ = machine.on_pulse(black_box(pulses.next()));
        })
    });
}

/// Benchmark one full stroke (36 pulses) including phase transitions
fn bench_full_stroke(c: &mut Criterion) {
    let mut machine = StrokeStateMachine::with_settings(StrokeSettings {
        normalize_by_actual_count: true,
        ..Default::default()
    })
    .unwrap();
    let mut pulses = PreGeneratedPulses::new(3600, 7);

    c.bench_function("stroke_full_stroke_36_pulses", |b| {
        b.iter(|| {
            for _ in 0..36 {
                let _ = machine.on_pulse(black_box(pulses.next()));
            }
        })
    });
}

/// Benchmark the moving average at the largest window
fn bench_smoothing_filter(c: &mut Criterion) {
    let mut filter = SmoothingFilter::new(16, false);
    let mut pulses = PreGeneratedPulses::new(1024, 3);

    c.bench_function("smoothing_filter_push_16", |b| {
        b.iter(|| black_box(filter.push(black_box(pulses.next()))))
    });
}

/// Benchmark the wire frame formatting
fn bench_telemetry_frame(c: &mut Criterion) {
    let mut machine = StrokeStateMachine::new();
    let mut pulses = PreGeneratedPulses::new(360, 11);
    for _ in 0..360 {
        let _ = machine.on_pulse(pulses.next());
    }

    c.bench_function("telemetry_frame_format", |b| {
        b.iter(|| black_box(machine.telemetry_frame().to_string()))
    });
}

/// Benchmark decoding a textual pulse interval
fn bench_parse_interval(c: &mut Criterion) {
    c.bench_function("parse_interval", |b| {
        b.iter(|| black_box(parse_interval(black_box("0.0345\n"))))
    });
}

fn bench_machine_creation(c: &mut Criterion) {
    c.bench_function("stroke_machine_new", |b| {
        b.iter(|| black_box(StrokeStateMachine::new()))
    });
}

criterion_group!(
    benches,
    bench_on_pulse,
    bench_full_stroke,
    bench_smoothing_filter,
    bench_telemetry_frame,
    bench_parse_interval,
    bench_machine_creation
);

criterion_main!(benches);
