//! User Settings
//!
//! The single persisted settings record consumed by the blink detector and the
//! reminder coordinator, with range validation and layered loading.

mod error;
mod loader;
mod record;
mod validator;

pub use error::SettingsError;
pub use loader::{load, ENV_PREFIX};
pub use record::{Settings, SETTINGS_KEY};
pub use validator::{validate, Limits};
