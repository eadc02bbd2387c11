//! Moving-average filter over pulse intervals

use heapless::Deque;

use crate::types::MAX_SMOOTHING_WINDOW;

/// Bounded moving average over the last `window` pulse intervals
///
/// Removes single-sample timing jitter from the flywheel sensor. The window
/// is a fixed-capacity FIFO: once full, the oldest interval is evicted
/// before the new one is inserted.
///
/// By default the sum is divided by the configured window size even while
/// the window is still filling, so the first few outputs under-weight the
/// early samples. Enable `normalize_by_actual_count` to divide by the number
/// of samples actually held instead.
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    samples: Deque<f32, MAX_SMOOTHING_WINDOW>,
    window: usize,
    normalize_by_actual_count: bool,
}

impl SmoothingFilter {
    /// Create a filter averaging over `window` samples
    ///
    /// `window` is clamped to `1..=MAX_SMOOTHING_WINDOW`; settings validation
    /// rejects out-of-range windows before they get here.
    ///
    /// # Example
    /// ```
    /// use flywheel_stroke::SmoothingFilter;
    ///
    /// let mut filter = SmoothingFilter::new(3, false);
    /// assert!((filter.push(0.3) - 0.1).abs() < 1e-6); // 0.3 / 3
    /// ```
    pub fn new(window: usize, normalize_by_actual_count: bool) -> Self {
        Self {
            samples: Deque::new(),
            window: window.clamp(1, MAX_SMOOTHING_WINDOW),
            normalize_by_actual_count,
        }
    }

    /// Add a pulse interval and return the smoothed interval
    pub fn push(&mut self, sample: f32) -> f32 {
        if self.samples.len() >= self.window {
            self.samples.pop_front();
        }
        // Cannot fail: the window never exceeds the deque capacity
        let _ = self.samples.push_back(sample);

        self.average()
    }

    /// Current smoothed interval, zero before the first sample
    pub fn average(&self) -> f32 {
        let sum: f32 = self.samples.iter().sum();
        let divisor = if self.normalize_by_actual_count {
            self.samples.len().max(1)
        } else {
            self.window
        };
        sum / divisor as f32
    }

    /// Configured window size
    pub fn window(&self) -> usize {
        self.window
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no sample has arrived yet
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether the window has filled
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.window
    }

    /// Drop all held samples
    pub fn reset(&mut self) {
        self.samples.clear();
    }
}
