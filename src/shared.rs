//! Copy-out telemetry sharing for a concurrent reader
//!
//! The pulse path is the only writer. After a pulse has been fully
//! processed it publishes a [`TelemetryRecord`] copy; a periodic logger on
//! another thread reads the latest copy. The lock is held only for the copy
//! of one plain value, never across pulse processing, so a reader can not
//! observe a half-updated segment.
//!
//! # Example
//! ```
//! use std::thread;
//! use flywheel_stroke::{telemetry_channel, StrokeStateMachine};
//!
//! let mut machine = StrokeStateMachine::new();
//! let (publisher, reader) = telemetry_channel(machine.telemetry());
//!
//! let logger = thread::spawn(move || reader.latest().pulse_count);
//!
//! machine.on_pulse(0.05).unwrap();
//! publisher.publish(machine.telemetry());
//!
//! let _seen = logger.join().unwrap();
//! ```

use std::sync::{Arc, PoisonError, RwLock};

use crate::telemetry::TelemetryRecord;

/// Writing half, owned by the pulse path
#[derive(Debug)]
pub struct TelemetryPublisher {
    latest: Arc<RwLock<TelemetryRecord>>,
}

/// Reading half, cloneable and sendable to other threads
#[derive(Debug, Clone)]
pub struct TelemetryReader {
    latest: Arc<RwLock<TelemetryRecord>>,
}

/// Create a publisher/reader pair seeded with `initial`
pub fn telemetry_channel(initial: TelemetryRecord) -> (TelemetryPublisher, TelemetryReader) {
    let latest = Arc::new(RwLock::new(initial));
    (
        TelemetryPublisher {
            latest: Arc::clone(&latest),
        },
        TelemetryReader { latest },
    )
}

impl TelemetryPublisher {
    /// Replace the shared record with a fresh copy
    pub fn publish(&self, record: TelemetryRecord) {
        // A record is plain data and always whole, so a poisoned lock is safe to reuse
        let mut latest = self.latest.write().unwrap_or_else(PoisonError::into_inner);
        *latest = record;
    }

    /// Create another reader for the same record
    pub fn reader(&self) -> TelemetryReader {
        TelemetryReader {
            latest: Arc::clone(&self.latest),
        }
    }
}

impl TelemetryReader {
    /// Copy of the most recently published record
    pub fn latest(&self) -> TelemetryRecord {
        *self.latest.read().unwrap_or_else(PoisonError::into_inner)
    }
}
