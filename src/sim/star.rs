use std::time::Duration;

use iced::Color;
use rand::Rng;

use super::{
    black_hole::Mode,
    initial_parameters::InitialParameters,
    surface::Surface,
    units::{normalize_angle, Float, FULL_TURN, NOMINAL_FRAME},
    vector::{lerp, random_range, rotate, rotation_about, Vector2},
};

/// Number of distinct rows stars fan into while expanded.
pub(crate) const EXPANSION_ROWS: usize = 100;

const MIN_ALPHA: Float = 0.1;

#[derive(Clone, Debug)]
pub(crate) struct Star {
    pub(crate) orbit_distance: Float,
    pub(crate) collapse_bonus: Float,
    pub(crate) expansion_distance: Float,
    /// Radians per second.
    pub(crate) speed: Float,
    pub(crate) color: Color,
    pub(crate) current_distance: Float,
    pub(crate) current_rotation: Float,
    pub(crate) angular_velocity: Float,
    pub(crate) last_elapsed: Duration,
    pub(crate) current_position: Vector2,
    pub(crate) next_position: Vector2,
}

impl Star {
    pub(crate) fn new<R: Rng + ?Sized>(
        params: &InitialParameters,
        center: Vector2,
        index: usize,
        rng: &mut R,
    ) -> Star {
        let band = params.orbit_band;
        let inner = random_range(rng, band.min, band.mid());
        let outer = random_range(rng, band.mid(), band.max);
        let orbit_distance = (inner + outer) / 2.;
        let start_rotation = random_range(rng, 0., FULL_TURN);
        let speed = random_range(rng, params.speed_band.min, params.speed_band.max);
        Self::with_orbit(params, center, index, orbit_distance, speed, start_rotation)
    }

    pub(crate) fn with_orbit(
        params: &InitialParameters,
        center: Vector2,
        index: usize,
        orbit_distance: Float,
        speed: Float,
        start_rotation: Float,
    ) -> Star {
        let band = params.orbit_band;
        let collapse_bonus =
            (orbit_distance - params.collapse_threshold * band.max).max(0.);
        let expansion_distance = params.horizon_radius
            + (index % EXPANSION_ROWS) as Float * params.expansion_row_spacing;

        let alpha = if band.span() > 0. {
            1. - (orbit_distance - band.min) / band.span()
        } else {
            1.
        };
        let color = Color::from_rgba(1., 1., 1., alpha.clamp(MIN_ALPHA, 1.));

        let mut star = Star {
            orbit_distance,
            collapse_bonus,
            expansion_distance,
            speed,
            color,
            current_distance: orbit_distance,
            current_rotation: start_rotation - speed * NOMINAL_FRAME,
            angular_velocity: speed,
            last_elapsed: Duration::ZERO,
            current_position: Vector2::new(center.x, center.y + orbit_distance),
            next_position: Vector2::new(center.x, center.y + orbit_distance),
        };
        star.seed(center);
        star
    }

    // Runs one throwaway frame so the first drawn segment already follows the orbit.
    fn seed(&mut self, center: Vector2) {
        self.advance(center, self.current_rotation);
        self.current_position = self.next_position;
        self.advance(
            center,
            normalize_angle(self.current_rotation + self.speed * NOMINAL_FRAME),
        );
    }

    fn advance(&mut self, center: Vector2, rotation: Float) {
        self.current_rotation = rotation;
        let base = Vector2::new(center.x, center.y + self.current_distance);
        self.next_position = rotate(center, base, rotation);
    }

    pub(crate) fn target_distance(&self, mode: Mode, horizon_radius: Float) -> Float {
        match mode {
            Mode::Normal => self.orbit_distance,
            Mode::Collapsed => self
                .orbit_distance
                .min(horizon_radius + self.collapse_bonus),
            Mode::Expanded => self.expansion_distance,
        }
    }

    /// Eases toward the target of `mode` and computes this frame's end point.
    pub(crate) fn tick(
        &mut self,
        params: &InitialParameters,
        center: Vector2,
        mode: Mode,
        elapsed: Duration,
    ) {
        let dt = elapsed.saturating_sub(self.last_elapsed).as_secs_f32();
        self.last_elapsed = elapsed;

        let smoothing = params.smoothing_factor;
        let target_distance = self.target_distance(mode, params.horizon_radius);
        let spin = match mode {
            Mode::Normal => 1.,
            Mode::Collapsed => params.collapsed_spin_factor,
            Mode::Expanded => params.expanded_spin_factor,
        };
        self.current_distance = lerp(self.current_distance, target_distance, smoothing);
        self.angular_velocity = lerp(self.angular_velocity, self.speed * spin, smoothing);

        let rotation = normalize_angle(self.current_rotation + self.angular_velocity * dt);
        self.advance(center, rotation);
    }

    /// Strokes `current_position -> next_position`, then carries the end point over.
    pub(crate) fn draw<S: Surface>(&mut self, center: Vector2, surface: &mut S) {
        {
            let mut rotated =
                surface.with_transform(rotation_about(center, self.current_rotation));
            let from = rotate(center, self.current_position, -self.current_rotation);
            let to = Vector2::new(center.x, center.y + self.current_distance);
            rotated.draw_segment(from, to, self.color);
        }
        self.current_position = self.next_position;
    }

    /// Moves the stored positions along with a moved center.
    pub(crate) fn translate(&mut self, delta: Vector2) {
        self.current_position = self.current_position + delta;
        self.next_position = self.next_position + delta;
    }
}
