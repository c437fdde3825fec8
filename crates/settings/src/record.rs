//! The persisted settings record

use crate::SettingsError;
use serde::{Deserialize, Serialize};

/// Name the record is stored under
pub const SETTINGS_KEY: &str = "settings";

/// User-tunable settings shared by the detector and the coordinator.
///
/// Missing fields fall back to their defaults, so a partially stored record
/// merges over [`Settings::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether reminders (and detection) are active
    pub enabled: bool,

    /// Seconds without a blink before the overlay is shown
    #[serde(alias = "timerInterval")]
    pub timer_interval_secs: u32,

    /// Overlay opacity (0-1)
    #[serde(alias = "overlayOpacity")]
    pub overlay_opacity: f32,

    /// Average EAR below which the eyes count as closed
    #[serde(alias = "earThreshold")]
    pub ear_threshold: f32,

    /// Consecutive closed frames needed to confirm a blink
    #[serde(alias = "minBlinkFrames")]
    pub min_blink_frames: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            timer_interval_secs: 5,
            overlay_opacity: 0.6,
            ear_threshold: 0.22,
            min_blink_frames: 2,
        }
    }
}

impl Settings {
    /// Parse a stored record, merging it over the defaults
    pub fn from_json(raw: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Serialize for storage
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
