use std::{env, fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::units::Float;

#[derive(Error, Debug)]
pub(crate) enum ConfigError {
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    ParseError(String),
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub(crate) type ConfigResult<T> = Result<T, ConfigError>;

/// Closed interval `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Band {
    pub(crate) min: Float,
    pub(crate) max: Float,
}

impl Band {
    pub(crate) fn new(min: Float, max: Float) -> Band {
        Band { min, max }
    }

    pub(crate) fn mid(&self) -> Float {
        (self.min + self.max) / 2.
    }

    pub(crate) fn span(&self) -> Float {
        self.max - self.min
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, value: Float) -> bool {
        (self.min..=self.max).contains(&value)
    }

    fn validate(&self, field: &'static str) -> ConfigResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(invalid(field, "bounds must be finite"));
        }
        if self.min > self.max {
            return Err(invalid(
                field,
                format!("min {} exceeds max {}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct InitialParameters {
    pub(crate) star_count: usize,
    /// Orbital distances in the resting state, in logical pixels.
    pub(crate) orbit_band: Band,
    pub(crate) horizon_radius: Float,
    /// Fraction of `orbit_band.max` beyond which stars keep some distance on collapse.
    pub(crate) collapse_threshold: Float,
    /// Angular speeds in radians per second.
    pub(crate) speed_band: Band,
    pub(crate) expansion_row_spacing: Float,
    pub(crate) collapsed_spin_factor: Float,
    pub(crate) expanded_spin_factor: Float,
    pub(crate) target_frame_rate: Float,
    pub(crate) trail_alpha: Float,
    pub(crate) smoothing_factor: Float,
    pub(crate) dpi: Float,
    pub(crate) seed: Option<u64>,
}

impl Default for InitialParameters {
    fn default() -> Self {
        Self {
            star_count: 2_500,
            orbit_band: Band::new(100., 350.),
            horizon_radius: 100.,
            collapse_threshold: 0.7,
            speed_band: Band::new(0.5, 1.25),
            expansion_row_spacing: 10.,
            collapsed_spin_factor: 1.5,
            expanded_spin_factor: 0.5,
            target_frame_rate: 60.,
            trail_alpha: 0.2,
            smoothing_factor: 0.05,
            dpi: 96.,
            seed: None,
        }
    }
}

impl InitialParameters {
    pub(crate) fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub(crate) fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Defaults, then the optional TOML file, then environment overrides.
    pub(crate) fn load<P: AsRef<Path>>(path: Option<P>) -> ConfigResult<Self> {
        let mut params = match path {
            Some(path) => {
                tracing::info!("loading parameters from {}", path.as_ref().display());
                Self::from_toml_file(path)?
            }
            None => Self::default(),
        };
        params.apply_env_overrides(|key| env::var(key).ok())?;
        params.validate()?;
        Ok(params)
    }

    pub(crate) fn apply_env_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("BLACKHOLE_STAR_COUNT") {
            self.star_count = parse_override("BLACKHOLE_STAR_COUNT", &value)?;
        }
        if let Some(value) = lookup("BLACKHOLE_FRAME_RATE") {
            self.target_frame_rate = parse_override("BLACKHOLE_FRAME_RATE", &value)?;
        }
        if let Some(value) = lookup("BLACKHOLE_TRAIL_ALPHA") {
            self.trail_alpha = parse_override("BLACKHOLE_TRAIL_ALPHA", &value)?;
        }
        if let Some(value) = lookup("BLACKHOLE_SEED") {
            self.seed = Some(parse_override("BLACKHOLE_SEED", &value)?);
        }
        Ok(())
    }

    pub(crate) fn validate(&self) -> ConfigResult<()> {
        self.orbit_band.validate("orbit_band")?;
        self.speed_band.validate("speed_band")?;
        if !(self.horizon_radius.is_finite() && self.horizon_radius > 0.) {
            return Err(invalid("horizon_radius", "must be a positive number"));
        }
        if self.orbit_band.min < self.horizon_radius {
            return Err(invalid(
                "orbit_band",
                format!(
                    "min {} lies inside the horizon radius {}",
                    self.orbit_band.min, self.horizon_radius
                ),
            ));
        }
        if self.speed_band.min < 0. {
            return Err(invalid("speed_band", "speeds must not be negative"));
        }
        check_unit("collapse_threshold", self.collapse_threshold)?;
        check_unit("trail_alpha", self.trail_alpha)?;
        if !(self.smoothing_factor > 0. && self.smoothing_factor <= 1.) {
            return Err(invalid("smoothing_factor", "must lie in (0, 1]"));
        }
        check_non_negative("expansion_row_spacing", self.expansion_row_spacing)?;
        check_non_negative("collapsed_spin_factor", self.collapsed_spin_factor)?;
        check_non_negative("expanded_spin_factor", self.expanded_spin_factor)?;
        if !(self.target_frame_rate.is_finite() && self.target_frame_rate > 0.) {
            return Err(invalid("target_frame_rate", "must be a positive number"));
        }
        if !(self.dpi.is_finite() && self.dpi > 0.) {
            return Err(invalid("dpi", "must be a positive number"));
        }
        Ok(())
    }

    pub(crate) fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1. / self.target_frame_rate as f64)
    }
}

fn parse_override<T: std::str::FromStr>(key: &'static str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::ParseError(format!("{} has unparsable value {:?}", key, value)))
}

fn check_unit(field: &'static str, value: Float) -> ConfigResult<()> {
    if (0. ..=1.).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, "must lie in [0, 1]"))
    }
}

fn check_non_negative(field: &'static str, value: Float) -> ConfigResult<()> {
    if value.is_finite() && value >= 0. {
        Ok(())
    } else {
        Err(invalid(field, "must be a non-negative number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid(params: InitialParameters, expected_field: &str) {
        match params.validate() {
            Err(ConfigError::Invalid { field, reason }) => {
                println!("{}: {}", field, reason);
                assert_eq!(field, expected_field);
            }
            other => panic!("expected {} to be rejected, got {:?}", expected_field, other),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(InitialParameters::default().validate().is_ok());
    }

    #[test]
    fn negative_horizon_is_rejected() {
        let params = InitialParameters {
            horizon_radius: -5.,
            ..Default::default()
        };
        assert_invalid(params, "horizon_radius");
    }

    #[test]
    fn inverted_orbit_band_is_rejected() {
        let params = InitialParameters {
            orbit_band: Band::new(350., 100.),
            ..Default::default()
        };
        assert_invalid(params, "orbit_band");
    }

    #[test]
    fn orbit_band_inside_horizon_is_rejected() {
        let params = InitialParameters {
            orbit_band: Band::new(50., 350.),
            ..Default::default()
        };
        assert_invalid(params, "orbit_band");
    }

    #[test]
    fn nan_values_are_rejected() {
        let params = InitialParameters {
            speed_band: Band::new(Float::NAN, 1.),
            ..Default::default()
        };
        assert_invalid(params, "speed_band");
        let params = InitialParameters {
            trail_alpha: Float::NAN,
            ..Default::default()
        };
        assert_invalid(params, "trail_alpha");
    }

    #[test]
    fn out_of_range_factors_are_rejected() {
        let params = InitialParameters {
            trail_alpha: 1.5,
            ..Default::default()
        };
        assert_invalid(params, "trail_alpha");
        let params = InitialParameters {
            smoothing_factor: 0.,
            ..Default::default()
        };
        assert_invalid(params, "smoothing_factor");
        let params = InitialParameters {
            target_frame_rate: 0.,
            ..Default::default()
        };
        assert_invalid(params, "target_frame_rate");
    }

    #[test]
    fn zero_stars_are_allowed() {
        let params = InitialParameters {
            star_count: 0,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let params = InitialParameters::from_toml_str(
            r#"
            star_count = 3
            trail_alpha = 0.5

            [orbit_band]
            min = 120.0
            max = 300.0
            "#,
        )
        .unwrap();
        assert_eq!(params.star_count, 3);
        assert_eq!(params.trail_alpha, 0.5);
        assert_eq!(params.orbit_band, Band::new(120., 300.));
        assert_eq!(params.horizon_radius, 100.);
        assert_eq!(params.seed, None);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let result = InitialParameters::from_toml_str("star_count = \"many\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn missing_file_is_a_file_error() {
        let result = InitialParameters::from_toml_file("/nonexistent/blackhole.toml");
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }

    #[test]
    fn environment_overrides_win() {
        let mut params = InitialParameters::default();
        params
            .apply_env_overrides(|key| match key {
                "BLACKHOLE_STAR_COUNT" => Some("42".to_string()),
                "BLACKHOLE_SEED" => Some(" 7 ".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(params.star_count, 42);
        assert_eq!(params.seed, Some(7));
        assert_eq!(params.target_frame_rate, 60.);
    }

    #[test]
    fn unparsable_override_is_reported() {
        let mut params = InitialParameters::default();
        let result = params.apply_env_overrides(|key| {
            (key == "BLACKHOLE_FRAME_RATE").then(|| "fast".to_string())
        });
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn frame_interval_follows_frame_rate() {
        let params = InitialParameters {
            target_frame_rate: 50.,
            ..Default::default()
        };
        assert_eq!(params.frame_interval(), Duration::from_millis(20));
    }
}
