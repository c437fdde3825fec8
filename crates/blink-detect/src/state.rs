//! Per-stream detector state

/// Debounce counters owned by a single detector instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlinkEdgeDetectorState {
    /// Consecutive frames with the average EAR below threshold
    pub consecutive_below_threshold: u32,

    /// Set once a blink has been reported for the current closure;
    /// cleared by the next open-eye frame
    pub blink_latched: bool,
}

impl BlinkEdgeDetectorState {
    /// Clear both counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
