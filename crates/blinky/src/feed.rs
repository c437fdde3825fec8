//! Frame feed: JSON lines from the capture side
//!
//! Each line is a frame for one source, a full face mesh, or a control message:
//!
//! ```text
//! {"source": "foreground", "left": [[x, y], ...6], "right": [[x, y], ...6]}
//! {"source": "background", "mesh": [[x, y, z], ...468]}
//! {"source": "tracker", "left_ear": 0.28, "right_ear": 0.27}
//! {"control": "close", "reason": "click"}
//! ```

use anyhow::Context;
use blink_detect::{DetectorConfig, EyePoint, FrameOutcome, ObservationStream, SourceId};
use reminder::{CloseReason, ReminderHandle};
use serde::Deserialize;
use settings::Settings;
use std::collections::HashMap;
use tracing::{debug, info};

/// Control messages from the UI side
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum Control {
    Show,
    Close {
        #[serde(default)]
        reason: Option<String>,
    },
    Enable,
    Disable,
    Settings {
        settings: Settings,
    },
}

/// One line of input
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FeedLine {
    Frame {
        source: SourceId,
        left: Vec<EyePoint>,
        right: Vec<EyePoint>,
    },
    Mesh {
        source: SourceId,
        mesh: Vec<EyePoint>,
    },
    Ears {
        source: SourceId,
        left_ear: f32,
        right_ear: f32,
    },
    Control(Control),
}

/// Routes frames to per-source observation streams and control messages to
/// the coordinator. Streams are created on first use and dropped on disable.
pub struct FrameFeed {
    handle: ReminderHandle,
    config: DetectorConfig,
    enabled: bool,
    streams: HashMap<SourceId, ObservationStream<ReminderHandle>>,
}

impl FrameFeed {
    pub fn new(handle: ReminderHandle, settings: &Settings) -> Self {
        Self {
            handle,
            config: DetectorConfig::from_settings(settings),
            enabled: settings.enabled,
            streams: HashMap::new(),
        }
    }

    /// Parse and act on one input line
    pub async fn dispatch(&mut self, line: &str) -> anyhow::Result<Option<FrameOutcome>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let parsed: FeedLine = serde_json::from_str(line).context("malformed feed line")?;
        match parsed {
            FeedLine::Frame { source, left, right } => {
                Ok(self.stream(source).map(|s| s.deliver_frame(&left, &right)))
            }
            FeedLine::Mesh { source, mesh } => {
                Ok(self.stream(source).map(|s| s.deliver_mesh(&mesh)))
            }
            FeedLine::Ears {
                source,
                left_ear,
                right_ear,
            } => Ok(self.stream(source).map(|s| s.deliver_ears(left_ear, right_ear))),
            FeedLine::Control(control) => {
                self.control(control).await?;
                Ok(None)
            }
        }
    }

    async fn control(&mut self, control: Control) -> anyhow::Result<()> {
        match control {
            Control::Show => {
                let outcome = self.handle.request_show().await?;
                info!("Show requested: {:?}", outcome);
            }
            Control::Close { reason } => {
                let reason = reason.as_deref().map_or(CloseReason::AppRequest, CloseReason::from);
                self.handle.request_close(reason).await?;
            }
            Control::Enable => self.set_enabled(true).await?,
            Control::Disable => self.set_enabled(false).await?,
            Control::Settings { settings } => {
                settings.validate()?;
                self.config = DetectorConfig::from_settings(&settings);
                for stream in self.streams.values_mut() {
                    stream.reconfigure(self.config);
                }
                self.enabled = settings.enabled;
                if !self.enabled {
                    self.stop_streams();
                }
                self.handle.apply_settings(settings).await?;
            }
        }
        Ok(())
    }

    async fn set_enabled(&mut self, enabled: bool) -> anyhow::Result<()> {
        self.enabled = enabled;
        if !enabled {
            self.stop_streams();
        }
        self.handle.set_enabled(enabled).await?;
        Ok(())
    }

    fn stop_streams(&mut self) {
        for (source, stream) in self.streams.drain() {
            info!(
                "Stopping observation stream {} ({} blinks)",
                source,
                stream.stats().blinks
            );
        }
    }

    /// Stream for `source`, or `None` while detection is disabled
    fn stream(&mut self, source: SourceId) -> Option<&mut ObservationStream<ReminderHandle>> {
        if !self.enabled {
            debug!("Detection disabled, dropping frame from {}", source);
            return None;
        }
        let config = self.config;
        let handle = &self.handle;
        Some(
            self.streams
                .entry(source)
                .or_insert_with_key(|source| {
                    ObservationStream::new(source.clone(), config, handle.clone())
                }),
        )
    }

    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    pub fn get(&self, source: &SourceId) -> Option<&ObservationStream<ReminderHandle>> {
        self.streams.get(source)
    }
}
