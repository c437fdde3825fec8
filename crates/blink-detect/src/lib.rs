//! Blink Detection
//!
//! Turns per-frame eye landmarks into discrete blink events:
//! - Eye Aspect Ratio (EAR) from six eye-contour points
//! - Landmark index tables for the 468-point face mesh
//! - Debounced, edge-triggered blink detection
//! - Observation streams that own a detector and forward blinks to a sink

pub mod config;
pub mod detector;
pub mod ear;
pub mod landmarks;
pub mod state;
pub mod stream;

pub use config::DetectorConfig;
pub use detector::{is_valid_ear, BlinkEdgeDetector};
pub use ear::{eye_aspect_ratio, EyePoint, EyePointSet};
pub use landmarks::{
    eye_ears_from_mesh, extract_eye_points, LEFT_EYE_LANDMARKS, RIGHT_EYE_LANDMARKS,
};
pub use state::BlinkEdgeDetectorState;
pub use stream::{BlinkSink, FrameOutcome, ObservationStream, SourceId, StreamStats};

use thiserror::Error;

/// Blink detection error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectError {
    /// Malformed landmark set or degenerate eye geometry
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Face mesh too short for the eye index table
    #[error("Landmark {index} missing from mesh of {len} points")]
    MissingLandmark { index: usize, len: usize },
}
