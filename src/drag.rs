//! Drag factor and angular-to-linear conversion

use crate::math::{MAGIC_CONSTANT, conversion_factor};
use crate::segment::CompletedSegment;

/// Strategy deciding the drag factor at each recovery onset
///
/// The crate only ships [`FixedDragFactor`]. An adaptive estimator (for
/// example one deriving drag from the flywheel's spin-down over a recovery,
/// using [`FLYWHEEL_INERTIA`](crate::FLYWHEEL_INERTIA)) plugs in here.
pub trait DragEstimator {
    /// Drag factor to use from now on
    ///
    /// # Arguments
    /// * `drag_factor` - Drag factor currently in use
    /// * `last_recovery` - Most recent completed recovery, if any
    fn estimate(&mut self, drag_factor: f32, last_recovery: Option<&CompletedSegment>) -> f32;
}

/// Keeps the drag factor set at construction
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDragFactor;

impl DragEstimator for FixedDragFactor {
    fn estimate(&mut self, drag_factor: f32, _last_recovery: Option<&CompletedSegment>) -> f32 {
        drag_factor
    }
}

/// Drag factor and the conversion factor derived from it
///
/// The conversion factor maps flywheel angular velocity to an estimated
/// boat speed: `((|drag| / 1e6) / magic) ^ (1/3)`. It is computed at
/// construction and recomputed on every recovery onset; everything else
/// only reads it.
#[derive(Debug, Clone)]
pub struct DragModel<E = FixedDragFactor> {
    drag_factor: f32,
    magic_constant: f32,
    conversion_factor: f32,
    estimator: E,
}

impl DragModel<FixedDragFactor> {
    /// Create a model with a fixed drag factor
    ///
    /// # Example
    /// ```
    /// use flywheel_stroke::DragModel;
    ///
    /// let model = DragModel::new(120.0, 2.8);
    /// assert!((model.conversion_factor() - 0.035).abs() < 1e-3);
    /// ```
    pub fn new(drag_factor: f32, magic_constant: f32) -> Self {
        Self::with_estimator(drag_factor, magic_constant, FixedDragFactor)
    }
}

impl<E: DragEstimator> DragModel<E> {
    /// Create a model whose drag factor is revised by `estimator`
    pub fn with_estimator(drag_factor: f32, magic_constant: f32, estimator: E) -> Self {
        Self {
            drag_factor,
            magic_constant,
            conversion_factor: conversion_factor(drag_factor, magic_constant),
            estimator,
        }
    }

    /// Re-run the estimator and recompute the conversion factor
    ///
    /// Returns the new conversion factor.
    pub fn update_conversion_factor(&mut self, last_recovery: Option<&CompletedSegment>) -> f32 {
        let estimate = self.estimator.estimate(self.drag_factor, last_recovery);
        if estimate.is_finite() {
            self.drag_factor = estimate;
        } else {
            log_warn!("ignoring non-finite drag estimate {}", estimate);
        }

        self.conversion_factor = conversion_factor(self.drag_factor, self.magic_constant);
        log_debug!(
            "conversion factor {} from drag factor {}",
            self.conversion_factor,
            self.drag_factor
        );
        self.conversion_factor
    }

    /// Current drag factor
    pub fn drag_factor(&self) -> f32 {
        self.drag_factor
    }

    /// Current conversion factor
    pub fn conversion_factor(&self) -> f32 {
        self.conversion_factor
    }

    /// Estimated power in watts for a boat speed: `drag * v^3`
    pub fn power(&self, linear_velocity: f32) -> f32 {
        self.drag_factor * linear_velocity * linear_velocity * linear_velocity
    }

    /// Access the estimator
    pub fn estimator(&self) -> &E {
        &self.estimator
    }
}

impl Default for DragModel<FixedDragFactor> {
    fn default() -> Self {
        Self::new(crate::Resistance::default().drag_factor(), MAGIC_CONSTANT)
    }
}
