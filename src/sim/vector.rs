use glam::{Affine2, Vec2};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

use super::units::Float;

pub(crate) type Vector2 = Vec2;

/// Rotation by `angle` radians about `center`.
pub(crate) fn rotation_about(center: Vector2, angle: Float) -> Affine2 {
    Affine2::from_translation(center)
        * Affine2::from_angle(angle)
        * Affine2::from_translation(-center)
}

/// Rotates `point` about `center` by `angle` radians.
pub(crate) fn rotate(center: Vector2, point: Vector2, angle: Float) -> Vector2 {
    rotation_about(center, angle).transform_point2(point)
}

pub(crate) fn lerp(a: Float, b: Float, t: Float) -> Float {
    a * (1. - t) + b * t
}

/// Uniform sample from `[min, max]`. A collapsed or inverted range yields `min`.
pub(crate) fn random_range<R: Rng + ?Sized>(rng: &mut R, min: Float, max: Float) -> Float {
    if max <= min {
        return min;
    }
    Uniform::new_inclusive(min, max).sample(rng)
}
