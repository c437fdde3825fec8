//! Layered settings loading: defaults, then an optional file, then environment

use crate::{Settings, SettingsError};
use config::{Config, Environment, File};
use std::path::Path;
use tracing::{debug, info};

/// Environment variable prefix (`BLINKY_TIMER_INTERVAL_SECS=30`)
pub const ENV_PREFIX: &str = "BLINKY";

/// Load and validate settings.
///
/// The file format is inferred from the extension (JSON or TOML). Keys
/// missing from every source keep their default value.
pub fn load(path: Option<&Path>) -> Result<Settings, SettingsError> {
    load_with_prefix(path, ENV_PREFIX)
}

fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Settings, SettingsError> {
    let defaults = Settings::default();

    let mut builder = Config::builder()
        .set_default("enabled", defaults.enabled)?
        .set_default("timer_interval_secs", u64::from(defaults.timer_interval_secs))?
        .set_default("overlay_opacity", f64::from(defaults.overlay_opacity))?
        .set_default("ear_threshold", f64::from(defaults.ear_threshold))?
        .set_default("min_blink_frames", u64::from(defaults.min_blink_frames))?;

    if let Some(path) = path {
        info!("Loading settings from {}", path.display());
        builder = builder.add_source(File::from(path).required(true));
    }

    let settings: Settings = builder
        .add_source(Environment::with_prefix(env_prefix).try_parsing(true))
        .build()?
        .try_deserialize()?;

    settings.validate()?;
    debug!("Settings loaded: {:?}", settings);
    Ok(settings)
}
