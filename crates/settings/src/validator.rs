//! Range validation for settings

use crate::{Settings, SettingsError};
use serde::{Deserialize, Serialize};

/// Accepted ranges for each tunable (inclusive)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    pub timer_interval_secs: (u32, u32),
    pub overlay_opacity: (f32, f32),
    pub ear_threshold: (f32, f32),
    pub min_blink_frames: (u32, u32),
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            timer_interval_secs: (5, 120),
            overlay_opacity: (0.0, 1.0),
            ear_threshold: (0.15, 0.35),
            min_blink_frames: (1, 5),
        }
    }
}

fn check_range<T>(errors: &mut Vec<String>, field: &str, value: T, range: (T, T))
where
    T: PartialOrd + std::fmt::Display,
{
    // Negated comparisons so NaN is rejected too
    if !(value >= range.0 && value <= range.1) {
        errors.push(format!("{field} = {value} is out of range [{}, {}]", range.0, range.1));
    }
}

/// Validate every tunable, collecting all violations
pub fn validate(settings: &Settings, limits: &Limits) -> Result<(), SettingsError> {
    let mut errors = Vec::new();

    check_range(
        &mut errors,
        "timer_interval_secs",
        settings.timer_interval_secs,
        limits.timer_interval_secs,
    );
    check_range(
        &mut errors,
        "overlay_opacity",
        settings.overlay_opacity,
        limits.overlay_opacity,
    );
    check_range(
        &mut errors,
        "ear_threshold",
        settings.ear_threshold,
        limits.ear_threshold,
    );
    check_range(
        &mut errors,
        "min_blink_frames",
        settings.min_blink_frames,
        limits.min_blink_frames,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SettingsError::OutOfRange(errors))
    }
}

impl Settings {
    /// Validate against the default limits
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate(self, &Limits::default())
    }
}
