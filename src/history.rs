//! Bounded history of completed stroke durations

use heapless::Deque;

use crate::math::{SECONDS_PER_MINUTE, mean};
use crate::types::STROKE_HISTORY_LEN;

/// Last few stroke cycle durations, oldest evicted first
///
/// Only feeds cadence reporting; phase detection never reads it.
#[derive(Debug, Clone, Default)]
pub struct StrokeHistory {
    durations: Deque<f32, STROKE_HISTORY_LEN>,
}

impl StrokeHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed stroke duration in seconds
    pub fn push(&mut self, duration: f32) {
        if self.durations.is_full() {
            self.durations.pop_front();
        }
        let _ = self.durations.push_back(duration);
    }

    /// Mean stroke duration, `None` before the first stroke
    pub fn mean(&self) -> Option<f32> {
        mean(self.durations.iter())
    }

    /// Strokes per minute from the mean duration
    pub fn cadence(&self) -> Option<f32> {
        self.mean()
            .filter(|m| *m > 0.0)
            .map(|m| SECONDS_PER_MINUTE / m)
    }

    /// Most recent stroke duration
    pub fn last(&self) -> Option<f32> {
        self.durations.back().copied()
    }

    /// Recorded durations, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.durations.iter()
    }

    /// Number of recorded durations
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    /// Whether no stroke has been recorded
    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// Forget all recorded strokes
    pub fn clear(&mut self) {
        self.durations.clear();
    }
}
