//! Settings Error Types

use thiserror::Error;

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// One or more tunables outside their documented range
    #[error("settings out of range: {}", .0.join("; "))]
    OutOfRange(Vec<String>),

    /// Source could not be read or merged
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    /// Stored record is not valid JSON
    #[error("invalid settings record: {0}")]
    Parse(#[from] serde_json::Error),
}
