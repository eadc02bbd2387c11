//! Physical constants and `no_std` float helpers

/// One full flywheel revolution in radians
pub const TAU: f32 = core::f32::consts::TAU;

/// Empirical flywheel-to-boat coupling constant used by the conversion factor
pub const MAGIC_CONSTANT: f32 = 2.8;

/// Scale applied to the drag factor before the conversion factor is derived
pub const DRAG_FACTOR_SCALE: f32 = 1.0e-6;

/// Flywheel moment of inertia in kg·m², for drag estimators
pub const FLYWHEEL_INERTIA: f32 = 0.1001;

/// Seconds per minute, for strokes-per-minute conversion
pub const SECONDS_PER_MINUTE: f32 = 60.0;

/// Absolute value without relying on `std`
#[inline]
pub fn abs(x: f32) -> f32 {
    libm::fabsf(x)
}

/// Real cube root (defined for negative inputs)
#[inline]
pub fn cbrt(x: f32) -> f32 {
    libm::cbrtf(x)
}

/// Arithmetic mean of a sequence, `None` when it is empty
pub fn mean<'a, I>(values: I) -> Option<f32>
where
    I: IntoIterator<Item = &'a f32>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0f32, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 { None } else { Some(sum / count as f32) }
}

/// Angle swept between two consecutive pulses
#[inline]
pub fn angle_per_pulse(pulses_per_revolution: u32) -> f32 {
    TAU / pulses_per_revolution as f32
}

/// Conversion factor mapping angular velocity to boat speed:
/// `((|drag| * 1e-6) / magic) ^ (1/3)`
pub fn conversion_factor(drag_factor: f32, magic_constant: f32) -> f32 {
    cbrt(abs(drag_factor) * DRAG_FACTOR_SCALE / magic_constant)
}
