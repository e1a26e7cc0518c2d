use std::time::{Duration, Instant};

use rand::Rng;

use super::{
    black_hole::{BlackHole, Mode},
    initial_parameters::{ConfigResult, InitialParameters},
    surface::{Surface, SurfaceConfig},
    units::Float,
    vector::Vector2,
};

/// External events the universe reacts to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Signal {
    PointerEnter,
    PointerLeave,
    Activate,
    Cancel,
    Resize { width: Float, height: Float },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

/// Fixed-rate frame clock. Starts once, stops once.
#[derive(Clone, Debug)]
pub(crate) struct FrameScheduler {
    interval: Duration,
    state: SchedulerState,
    frames: u64,
}

impl FrameScheduler {
    pub(crate) fn new(interval: Duration) -> FrameScheduler {
        FrameScheduler {
            interval,
            state: SchedulerState::Idle,
            frames: 0,
        }
    }

    pub(crate) fn start(&mut self) -> bool {
        match self.state {
            SchedulerState::Idle => {
                tracing::info!("render loop started at {:?} per frame", self.interval);
                self.state = SchedulerState::Running;
                true
            }
            SchedulerState::Running => false,
            SchedulerState::Stopped => {
                tracing::warn!("render loop cannot be restarted after stop");
                false
            }
        }
    }

    pub(crate) fn stop(&mut self) -> bool {
        if self.state == SchedulerState::Stopped {
            return false;
        }
        tracing::info!("render loop stopped after {} frames", self.frames);
        self.state = SchedulerState::Stopped;
        true
    }

    pub(crate) fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    pub(crate) fn interval(&self) -> Duration {
        self.interval
    }

    fn count_frame(&mut self) {
        self.frames += 1;
    }
}

/// Owns the surface, the black hole and the interaction state, and produces frames.
pub(crate) struct Universe<S: Surface> {
    params: InitialParameters,
    surface_config: SurfaceConfig,
    surface: S,
    black_hole: BlackHole,
    scheduler: FrameScheduler,
}

impl<S: Surface> Universe<S> {
    pub(crate) fn new<R: Rng + ?Sized>(
        params: InitialParameters,
        surface_config: SurfaceConfig,
        mut surface: S,
        now: Instant,
        rng: &mut R,
    ) -> ConfigResult<Universe<S>> {
        params.validate()?;
        let surface_config = surface_config.with_dpi(params.dpi);
        surface.configure(&surface_config);
        let (device_width, device_height) = surface_config.device_size();
        tracing::info!(
            "surface {}x{} at scale {} ({}x{} device pixels)",
            surface_config.width,
            surface_config.height,
            surface_config.scale_factor,
            device_width,
            device_height
        );
        let black_hole = BlackHole::new(&params, &surface_config, now, rng);
        let scheduler = FrameScheduler::new(params.frame_interval());
        Ok(Universe {
            params,
            surface_config,
            surface,
            black_hole,
            scheduler,
        })
    }

    /// Applies `signal` and returns the resulting mode.
    pub(crate) fn handle(&mut self, signal: Signal) -> Mode {
        let mode = self.black_hole.mode();
        let next = match (signal, mode) {
            (Signal::PointerEnter, Mode::Normal) => Mode::Collapsed,
            (Signal::PointerLeave, Mode::Collapsed) => Mode::Normal,
            (Signal::Activate, _) => Mode::Expanded,
            (Signal::Cancel, Mode::Expanded) => Mode::Normal,
            (Signal::Resize { width, height }, _) => {
                self.resize(width, height);
                mode
            }
            _ => mode,
        };
        if next != mode {
            tracing::debug!("{:?}: {:?} -> {:?}", signal, mode, next);
            self.black_hole.set_mode(next);
        }
        next
    }

    fn resize(&mut self, width: Float, height: Float) {
        if self.surface_config.width == width && self.surface_config.height == height {
            return;
        }
        self.surface_config.resize(width, height);
        self.surface.configure(&self.surface_config);
        self.black_hole.recenter(&self.surface_config);
    }

    pub(crate) fn start(&mut self) -> bool {
        self.scheduler.start()
    }

    pub(crate) fn stop(&mut self) -> bool {
        self.scheduler.stop()
    }

    /// Fades the previous frames and advances every star. Returns whether a
    /// frame was produced.
    pub(crate) fn frame(&mut self, now: Instant) -> bool {
        if !self.scheduler.is_running() {
            return false;
        }
        if !self.surface_config.is_ready() {
            tracing::trace!("surface not ready, skipping frame");
            return false;
        }
        self.surface.clear(self.params.trail_alpha);
        let drawn = self.black_hole.tick(now, &mut self.surface);
        if drawn {
            self.scheduler.count_frame();
        }
        drawn
    }

    /// Whether `point` (logical pixels) lies on the horizon disc.
    pub(crate) fn hits_horizon(&self, point: Vector2) -> bool {
        self.black_hole
            .center()
            .is_some_and(|center| center.distance(point) <= self.black_hole.horizon_radius())
    }

    pub(crate) fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub(crate) fn frame_interval(&self) -> Duration {
        self.scheduler.interval()
    }

    pub(crate) fn surface(&self) -> &S {
        &self.surface
    }
}

impl<S: Surface> Drop for Universe<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
