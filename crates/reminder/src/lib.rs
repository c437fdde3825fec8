//! Reminder Coordination
//!
//! Owns the blink countdown and the full-screen reminder overlay:
//! - A single coordinator state machine per session (`Off` / `Idle` / `Presenting`)
//! - Overlay show/close requests sent through a surface gateway
//! - An async service that serializes ticks and blink events onto one task

mod config;
mod coordinator;
mod gateway;
mod service;

pub use config::ReminderConfig;
pub use coordinator::{ReminderCoordinator, ReminderSnapshot, ReminderState, ShowOutcome};
pub use gateway::{ChannelGateway, CloseReason, OverlayCommand, SurfaceGateway};
pub use service::{ReminderHandle, ReminderMessage, ReminderService};

use thiserror::Error;

/// Reminder error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReminderError {
    /// The coordinator service has stopped
    #[error("Reminder service is not running")]
    ChannelClosed,

    /// The presentation surface could not be reached
    #[error("Presentation surface unavailable: {0}")]
    Gateway(String),
}
