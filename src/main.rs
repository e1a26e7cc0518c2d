use std::time::Instant;

use gui::Gui;
use rand::{rngs::StdRng, SeedableRng};
use sim::{
    initial_parameters::InitialParameters,
    surface::{SurfaceConfig, TrailBuffer},
    universe::Universe,
};

mod gui;
mod sim;

fn main() -> iced::Result {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let params = match InitialParameters::load(std::env::args_os().nth(1)) {
        Ok(params) => params,
        Err(error) => {
            tracing::error!("{}", error);
            std::process::exit(2);
        }
    };
    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let size = gui::window_size();
    let surface_config = SurfaceConfig::new(size.width, size.height);
    let universe = match Universe::new(
        params,
        surface_config,
        TrailBuffer::new(),
        Instant::now(),
        &mut rng,
    ) {
        Ok(universe) => universe,
        Err(error) => {
            tracing::error!("{}", error);
            std::process::exit(2);
        }
    };

    let mut window_settings = iced::window::Settings::default();
    window_settings.size = size;
    iced::application("Black Hole", Gui::update, Gui::view)
        .subscription(Gui::subscription)
        .antialiasing(true)
        .window(window_settings)
        .run_with(move || Gui::new(universe))
}
