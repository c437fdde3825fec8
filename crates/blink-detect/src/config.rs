//! Detector configuration

use serde::{Deserialize, Serialize};
use settings::Settings;

/// Blink detector configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Average EAR below which the eyes count as closed
    pub ear_threshold: f32,

    /// Consecutive closed frames needed before a blink is reported
    pub min_consecutive_frames: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.22,
            min_consecutive_frames: 2,
        }
    }
}

impl DetectorConfig {
    /// Derive from the user settings record
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            ear_threshold: settings.ear_threshold,
            min_consecutive_frames: settings.min_blink_frames,
        }
    }

    /// Create strict config (only deep, sustained closures count)
    pub fn strict() -> Self {
        Self {
            ear_threshold: 0.18,
            min_consecutive_frames: 3,
        }
    }

    /// Create lenient config (shallow or single-frame closures count)
    pub fn lenient() -> Self {
        Self {
            ear_threshold: 0.26,
            min_consecutive_frames: 1,
        }
    }
}
