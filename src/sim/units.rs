pub(crate) type Float = f32;
pub(crate) const PI: Float = std::f32::consts::PI;
pub(crate) const FULL_TURN: Float = 2. * PI;

// Logical pixels are defined against a 96 DPI display.
pub(crate) const REFERENCE_DPI: Float = 96.;

// One nominal frame at 60 Hz, in seconds.
pub(crate) const NOMINAL_FRAME: Float = 1. / 60.;

/// Wraps an angle into `[0, 2π)`.
pub(crate) fn normalize_angle(angle: Float) -> Float {
    angle.rem_euclid(FULL_TURN)
}

/// Signed shortest difference `a - b`, in `[-π, π)`.
#[cfg(test)]
pub(crate) fn angle_difference(a: Float, b: Float) -> Float {
    (a - b + PI).rem_euclid(FULL_TURN) - PI
}
