// only use std when feature = "std" is enabled or during testing
#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! Flywheel Stroke - real-time stroke detection for flywheel ergometers
//!
//! Turns the raw inter-pulse timing of a flywheel sensor into a stable
//! physical model of a rowing stroke: the current phase (idle, drive or
//! recovery), flywheel angular velocity, and an estimate of boat speed for
//! each drive and recovery.
//!
//! Each pulse flows through:
//!
//! 1. [`SmoothingFilter`] - bounded moving average over pulse intervals
//! 2. [`AngularKinematics`] - angle, angular velocity and acceleration
//! 3. [`StrokeStateMachine`] - phase transitions on angular acceleration
//! 4. [`PhaseSegment`] / [`DragModel`] - per-phase boat-speed estimates
//!
//! # Features
//!
//! - Asymmetric drive/recovery thresholds with an idle reset checkpoint
//! - Cadence from a bounded history of stroke durations
//! - Exact `"dt/w/v\n"` telemetry frames and a full telemetry record
//! - Pluggable drag factor estimation via [`DragEstimator`]
//! - `no_std` core without allocation (disable default features)
//! - `log` integration behind the `log` feature
//!
//! # Quick Start
//!
//! ```rust
//! use flywheel_stroke::{Phase, StrokeStateMachine};
//!
//! let mut machine = StrokeStateMachine::new();
//!
//! // Inter-pulse intervals in seconds, as delivered by the sensor
//! for interval in [0.050, 0.048, 0.045, 0.043, 0.046, 0.050, 0.055] {
//!     match machine.on_pulse(interval) {
//!         Ok(update) => {
//!             if let Some(transition) = update.transition {
//!                 println!("{:?} -> {:?}", transition.from, transition.to);
//!             }
//!         }
//!         Err(error) => eprintln!("dropped pulse: {}", error),
//!     }
//! }
//!
//! // Wire frame for the visualisation consumer
//! let frame = machine.telemetry_frame().to_string();
//! assert!(frame.ends_with('\n'));
//! assert_eq!(frame.matches('/').count(), 2);
//! ```

mod fmt;

pub mod drag;
mod error;
mod filter;
mod history;
mod kinematics;
mod math;
pub mod segment;
#[cfg(feature = "std")]
pub mod shared;
mod stroke;
pub mod telemetry;
mod types;

pub use drag::{DragEstimator, DragModel, FixedDragFactor};
pub use error::StrokeError;
pub use filter::SmoothingFilter;
pub use history::StrokeHistory;
pub use kinematics::AngularKinematics;
pub use math::{DRAG_FACTOR_SCALE, FLYWHEEL_INERTIA, MAGIC_CONSTANT, conversion_factor};
pub use segment::{CompletedSegment, PhaseSegment, SegmentBoundary};
#[cfg(feature = "std")]
pub use shared::{TelemetryPublisher, TelemetryReader, telemetry_channel};
pub use stroke::{CadenceCue, PulseUpdate, StrokeCycle, StrokeStateMachine, Transition};
pub use telemetry::{TelemetryFrame, TelemetryRecord, interval_from_le_bytes, parse_interval};
pub use types::*;
