//! Boundary to the presentation surface

use crate::ReminderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

/// Why the overlay was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CloseReason {
    Blink,
    EscapeKey,
    Click,
    AppRequest,
    SettingsDisabled,
    Unknown,
}

impl CloseReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blink => "blink",
            Self::EscapeKey => "escape-key",
            Self::Click => "click",
            Self::AppRequest => "app-request",
            Self::SettingsDisabled => "settings-disabled",
            Self::Unknown => "unknown",
        }
    }
}

impl From<&str> for CloseReason {
    fn from(tag: &str) -> Self {
        match tag {
            "blink" => Self::Blink,
            "escape" | "escape-key" => Self::EscapeKey,
            "click" => Self::Click,
            "app-request" => Self::AppRequest,
            "disabled" | "settings-disabled" => Self::SettingsDisabled,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outbound request to the presentation surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverlayCommand {
    Show { opacity: f32 },
    Close { reason: CloseReason },
}

/// Where the coordinator sends overlay requests.
///
/// `send` must not wait for the surface to act on the request.
pub trait SurfaceGateway {
    fn send(&mut self, command: OverlayCommand) -> Result<(), ReminderError>;

    /// Whether the presentation surface still exists. A `false` here while the
    /// coordinator is presenting means its state is stale.
    fn overlay_alive(&self) -> bool {
        true
    }
}

/// Forwards overlay requests over an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelGateway {
    tx: mpsc::UnboundedSender<OverlayCommand>,
}

impl ChannelGateway {
    /// Create the gateway and the receiver the surface reads from.
    /// Dropping the receiver marks the surface as destroyed.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OverlayCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SurfaceGateway for ChannelGateway {
    fn send(&mut self, command: OverlayCommand) -> Result<(), ReminderError> {
        self.tx
            .send(command)
            .map_err(|_| ReminderError::Gateway("surface receiver dropped".into()))
    }

    fn overlay_alive(&self) -> bool {
        !self.tx.is_closed()
    }
}
