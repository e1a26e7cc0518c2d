use std::{
    collections::VecDeque,
    ops::{Deref, DerefMut},
};

use glam::Affine2;
use iced::Color;

use super::{
    units::{Float, REFERENCE_DPI},
    vector::Vector2,
};

// Segments fainter than one 8-bit step are invisible.
const MIN_VISIBLE_ALPHA: Float = 1. / 255.;

/// Upper bound on retained frames, reached when the fade is too weak to
/// empty older frames by itself.
pub(crate) const MAX_TRAIL_FRAMES: usize = 64;

/// Logical size of the drawing surface plus its device-pixel scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SurfaceConfig {
    pub(crate) width: Float,
    pub(crate) height: Float,
    pub(crate) scale_factor: Float,
}

impl SurfaceConfig {
    pub(crate) fn new(width: Float, height: Float) -> SurfaceConfig {
        SurfaceConfig {
            width,
            height,
            scale_factor: 1.,
        }
    }

    pub(crate) fn with_dpi(mut self, dpi: Float) -> SurfaceConfig {
        self.scale_factor = dpi / REFERENCE_DPI;
        self
    }

    pub(crate) fn resize(&mut self, width: Float, height: Float) {
        self.width = width;
        self.height = height;
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.width > 0. && self.height > 0. && self.width.is_finite() && self.height.is_finite()
    }

    /// Midpoint of the surface, or `None` while it has no area.
    pub(crate) fn center(&self) -> Option<Vector2> {
        self.is_ready()
            .then(|| Vector2::new(self.width / 2., self.height / 2.))
    }

    pub(crate) fn device_size(&self) -> (u32, u32) {
        if !self.is_ready() {
            return (0, 0);
        }
        (
            (self.width * self.scale_factor).ceil() as u32,
            (self.height * self.scale_factor).ceil() as u32,
        )
    }
}

/// A 2D drawing target with a canvas-like transform stack.
pub(crate) trait Surface {
    /// Applies size and device-pixel scaling.
    fn configure(&mut self, config: &SurfaceConfig);

    /// Overwrites the whole surface with the background at opacity `alpha`.
    fn clear(&mut self, alpha: Float);

    fn draw_segment(&mut self, from: Vector2, to: Vector2, color: Color);

    fn push_transform(&mut self, transform: Affine2);

    fn pop_transform(&mut self);

    /// Pushes `transform` for as long as the returned guard lives.
    fn with_transform(&mut self, transform: Affine2) -> SavedTransform<'_, Self>
    where
        Self: Sized,
    {
        SavedTransform::new(self, transform)
    }
}

/// Restores the surface transform on drop.
pub(crate) struct SavedTransform<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: Surface + ?Sized> SavedTransform<'a, S> {
    pub(crate) fn new(surface: &'a mut S, transform: Affine2) -> Self {
        surface.push_transform(transform);
        SavedTransform { surface }
    }
}

impl<S: Surface + ?Sized> Deref for SavedTransform<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: Surface + ?Sized> DerefMut for SavedTransform<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: Surface + ?Sized> Drop for SavedTransform<'_, S> {
    fn drop(&mut self) {
        self.surface.pop_transform();
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Segment {
    pub(crate) from: Vector2,
    pub(crate) to: Vector2,
    pub(crate) color: Color,
}

/// Retained segments in device pixels, one batch per frame, oldest first.
/// Clearing with a partial alpha fades the retained segments instead of
/// dropping them, which leaves trails.
#[derive(Debug)]
pub(crate) struct TrailBuffer {
    frames: VecDeque<Vec<Segment>>,
    base: Affine2,
    stack: Vec<Affine2>,
    config: Option<SurfaceConfig>,
}

impl Default for TrailBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TrailBuffer {
    pub(crate) fn new() -> TrailBuffer {
        TrailBuffer {
            frames: VecDeque::new(),
            base: Affine2::IDENTITY,
            stack: Vec::new(),
            config: None,
        }
    }

    pub(crate) fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.frames.iter().flatten()
    }

    pub(crate) fn scale_factor(&self) -> Float {
        self.config.map_or(1., |config| config.scale_factor)
    }

    fn current(&self) -> Affine2 {
        self.stack.last().copied().unwrap_or(self.base)
    }
}

impl Surface for TrailBuffer {
    fn configure(&mut self, config: &SurfaceConfig) {
        let resized = self
            .config
            .map_or(true, |old| old.width != config.width || old.height != config.height);
        if resized {
            self.frames.clear();
        }
        self.base = Affine2::from_scale(Vector2::splat(config.scale_factor));
        self.stack.clear();
        self.config = Some(*config);
    }

    fn clear(&mut self, alpha: Float) {
        let alpha = alpha.clamp(0., 1.);
        if alpha >= 1. {
            self.frames.clear();
            return;
        }
        let keep = 1. - alpha;
        for frame in self.frames.iter_mut() {
            frame.retain_mut(|segment| {
                segment.color.a *= keep;
                segment.color.a >= MIN_VISIBLE_ALPHA
            });
        }
        self.frames.retain(|frame| !frame.is_empty());
        while self.frames.len() >= MAX_TRAIL_FRAMES {
            self.frames.pop_front();
        }
        self.frames.push_back(Vec::new());
    }

    fn draw_segment(&mut self, from: Vector2, to: Vector2, color: Color) {
        let transform = self.current();
        let segment = Segment {
            from: transform.transform_point2(from),
            to: transform.transform_point2(to),
            color,
        };
        match self.frames.back_mut() {
            Some(frame) => frame.push(segment),
            None => self.frames.push_back(vec![segment]),
        }
    }

    fn push_transform(&mut self, transform: Affine2) {
        let composed = self.current() * transform;
        self.stack.push(composed);
    }

    fn pop_transform(&mut self) {
        if self.stack.pop().is_none() {
            tracing::warn!("transform stack underflow on trail buffer");
        }
    }
}
