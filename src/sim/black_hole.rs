use std::time::{Duration, Instant};

use rand::Rng;

use super::{
    initial_parameters::InitialParameters,
    star::Star,
    surface::{Surface, SurfaceConfig},
    units::Float,
    vector::Vector2,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Mode {
    #[default]
    Normal,
    Collapsed,
    Expanded,
}

/// The shared center, horizon and mode every star orbits and reacts to.
#[derive(Clone, Debug)]
pub(crate) struct BlackHole {
    params: InitialParameters,
    center: Option<Vector2>,
    /// Center the star positions are currently laid out around. Survives
    /// while the surface has no area.
    origin: Vector2,
    mode: Mode,
    clock_start: Instant,
    pub(crate) stars: Vec<Star>,
}

impl BlackHole {
    pub(crate) fn new<R: Rng + ?Sized>(
        params: &InitialParameters,
        surface: &SurfaceConfig,
        clock_start: Instant,
        rng: &mut R,
    ) -> BlackHole {
        let origin = surface.center().unwrap_or_default();
        let stars = (0..params.star_count)
            .map(|index| Star::new(params, origin, index, rng))
            .collect();
        let black_hole = Self::from_stars(params, surface, clock_start, stars);
        tracing::info!(
            "created black hole with {} stars around {:?}",
            black_hole.stars.len(),
            black_hole.center
        );
        black_hole
    }

    /// Builds a field around already created stars, which must have been
    /// placed around `surface.center()` (or the origin while it is not ready).
    pub(crate) fn from_stars(
        params: &InitialParameters,
        surface: &SurfaceConfig,
        clock_start: Instant,
        stars: Vec<Star>,
    ) -> BlackHole {
        BlackHole {
            params: params.clone(),
            center: surface.center(),
            origin: surface.center().unwrap_or_default(),
            mode: Mode::Normal,
            clock_start,
            stars,
        }
    }

    pub(crate) fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            tracing::debug!("black hole mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Follows a resized surface without resetting the stars' phases.
    pub(crate) fn recenter(&mut self, surface: &SurfaceConfig) {
        let Some(center) = surface.center() else {
            tracing::debug!("surface {}x{} not ready", surface.width, surface.height);
            self.center = None;
            return;
        };
        let delta = center - self.origin;
        for star in self.stars.iter_mut() {
            star.translate(delta);
        }
        tracing::debug!("black hole center {:?} -> {:?}", self.origin, center);
        self.origin = center;
        self.center = Some(center);
    }

    pub(crate) fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.clock_start)
    }

    /// Advances and draws every star in index order. Returns `false` when the
    /// surface is not ready and nothing happened.
    pub(crate) fn tick<S: Surface>(&mut self, now: Instant, surface: &mut S) -> bool {
        let Some(center) = self.center else {
            tracing::trace!("skipping tick without a center");
            return false;
        };
        let elapsed = self.elapsed(now);
        for star in self.stars.iter_mut() {
            star.tick(&self.params, center, self.mode, elapsed);
            star.draw(center, surface);
        }
        true
    }

    pub(crate) fn center(&self) -> Option<Vector2> {
        self.center
    }

    pub(crate) fn horizon_radius(&self) -> Float {
        self.params.horizon_radius
    }

    pub(crate) fn mode(&self) -> Mode {
        self.mode
    }
}
