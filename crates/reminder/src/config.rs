//! Reminder configuration

use serde::{Deserialize, Serialize};
use settings::Settings;
use std::time::Duration;

/// Reminder coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Ticks without a blink before the overlay is shown
    pub interval_ticks: u32,
    /// Opacity passed with each show request
    pub overlay_opacity: f32,
    /// Whether the session starts enabled
    pub enabled: bool,
    /// Wall time per tick (milliseconds)
    pub tick_period_ms: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            interval_ticks: 5,
            overlay_opacity: 0.6,
            enabled: true,
            tick_period_ms: 1000,
        }
    }
}

impl ReminderConfig {
    /// Derive from the user settings record (one tick per second)
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            interval_ticks: settings.timer_interval_secs,
            overlay_opacity: settings.overlay_opacity,
            enabled: settings.enabled,
            ..Default::default()
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms.max(1))
    }
}
