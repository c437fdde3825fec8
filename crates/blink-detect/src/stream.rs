//! Observation streams: one detector per frame source

use crate::{
    eye_aspect_ratio, eye_ears_from_mesh, is_valid_ear, BlinkEdgeDetector, DetectError,
    DetectorConfig, EyePoint,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Identifies a frame source (e.g. foreground or background capture)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Receives blink events from observation streams.
///
/// Called on the frame-delivery path, so implementations must not block.
pub trait BlinkSink {
    fn blink_observed(&self, source: &SourceId);
}

impl<F> BlinkSink for F
where
    F: Fn(&SourceId),
{
    fn blink_observed(&self, source: &SourceId) {
        self(source)
    }
}

/// Result of delivering one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Landmarks were unusable; the frame carried no blink signal
    Skipped,
    /// Frame was fed to the detector
    Processed {
        left_ear: f32,
        right_ear: f32,
        blink: bool,
    },
}

impl FrameOutcome {
    pub fn is_blink(&self) -> bool {
        matches!(self, FrameOutcome::Processed { blink: true, .. })
    }
}

/// Per-stream diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StreamStats {
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub blinks: u64,
    /// Most recent (left, right) EAR pair
    pub last_ears: Option<(f32, f32)>,
}

/// A single frame source with its own detector.
///
/// Streams share nothing with each other; any number can feed the same sink.
pub struct ObservationStream<S> {
    source_id: SourceId,
    detector: BlinkEdgeDetector,
    sink: S,
    stats: StreamStats,
}

impl<S: BlinkSink> ObservationStream<S> {
    pub fn new(source_id: SourceId, config: DetectorConfig, sink: S) -> Self {
        info!(
            "Starting observation stream {} (threshold {}, {} frames)",
            source_id, config.ear_threshold, config.min_consecutive_frames
        );
        Self {
            source_id,
            detector: BlinkEdgeDetector::new(config),
            sink,
            stats: StreamStats::default(),
        }
    }

    /// Deliver one frame's eye landmarks. A frame with no face is simply not delivered.
    pub fn deliver_frame(&mut self, left: &[EyePoint], right: &[EyePoint]) -> FrameOutcome {
        let ears = eye_aspect_ratio(left).and_then(|l| Ok((l, eye_aspect_ratio(right)?)));
        self.process_ears(ears)
    }

    /// Deliver a full face mesh; eye points are picked via the index tables
    pub fn deliver_mesh(&mut self, mesh: &[EyePoint]) -> FrameOutcome {
        self.process_ears(eye_ears_from_mesh(mesh))
    }

    /// Deliver an EAR pair computed upstream. Malformed values count as open.
    pub fn deliver_ears(&mut self, left_ear: f32, right_ear: f32) -> FrameOutcome {
        self.process_ears(Ok((left_ear, right_ear)))
    }

    fn process_ears(&mut self, ears: Result<(f32, f32), DetectError>) -> FrameOutcome {
        let (left_ear, right_ear) = match ears {
            Ok(ears) => ears,
            Err(e) => {
                self.stats.frames_skipped += 1;
                debug!("Stream {}: skipping frame: {}", self.source_id, e);
                return FrameOutcome::Skipped;
            }
        };

        if !is_valid_ear(left_ear) || !is_valid_ear(right_ear) {
            warn!(
                "Stream {}: malformed EAR pair ({}, {}), treating as open",
                self.source_id, left_ear, right_ear
            );
        }

        self.stats.frames_processed += 1;
        self.stats.last_ears = Some((left_ear, right_ear));

        let blink = self.detector.process_frame(left_ear, right_ear);
        if blink {
            self.stats.blinks += 1;
            debug!("Stream {}: blink #{}", self.source_id, self.stats.blinks);
            self.sink.blink_observed(&self.source_id);
        }

        FrameOutcome::Processed {
            left_ear,
            right_ear,
            blink,
        }
    }

    /// Replace the detector with a fresh one using the new configuration
    pub fn reconfigure(&mut self, config: DetectorConfig) {
        if *self.detector.config() != config {
            info!("Stream {}: detector reconfigured: {:?}", self.source_id, config);
            self.detector.reconfigure(config);
        }
    }

    /// Reset the detector (e.g. capture restarted)
    pub fn restart(&mut self) {
        debug!("Stream {}: restarting", self.source_id);
        self.detector.reset();
    }

    pub fn source_id(&self) -> &SourceId {
        &self.source_id
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    pub fn detector(&self) -> &BlinkEdgeDetector {
        &self.detector
    }
}
