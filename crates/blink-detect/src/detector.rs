//! Debounced, edge-triggered blink detection

use crate::{BlinkEdgeDetectorState, DetectorConfig};

/// Whether an EAR value is usable (finite and non-negative)
pub fn is_valid_ear(ear: f32) -> bool {
    ear.is_finite() && ear >= 0.0
}

/// Converts a per-frame (left, right) EAR pair into discrete blink events.
///
/// A blink fires once, on the frame where the closure reaches
/// `min_consecutive_frames`, and the detector stays latched until the eyes
/// are seen open again. Malformed values (NaN, negative) count as open.
#[derive(Debug, Clone)]
pub struct BlinkEdgeDetector {
    config: DetectorConfig,
    state: BlinkEdgeDetectorState,
}

impl BlinkEdgeDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            state: BlinkEdgeDetectorState::default(),
        }
    }

    /// Feed one frame. Returns `true` only on the frame that confirms a blink.
    pub fn process_frame(&mut self, left_ear: f32, right_ear: f32) -> bool {
        let below_threshold = is_valid_ear(left_ear)
            && is_valid_ear(right_ear)
            && (left_ear + right_ear) / 2.0 < self.config.ear_threshold;

        if !below_threshold {
            self.state.reset();
            return false;
        }

        self.state.consecutive_below_threshold =
            self.state.consecutive_below_threshold.saturating_add(1);
        if !self.state.blink_latched
            && self.state.consecutive_below_threshold >= self.config.min_consecutive_frames
        {
            self.state.blink_latched = true;
            return true;
        }

        false
    }

    /// Clear the counters (stream restart)
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Swap in a new configuration; the detector restarts unlatched
    pub fn reconfigure(&mut self, config: DetectorConfig) {
        self.config = config;
        self.state.reset();
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn state(&self) -> &BlinkEdgeDetectorState {
        &self.state
    }
}

impl Default for BlinkEdgeDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const OPEN: f32 = 0.3;
    const CLOSED: f32 = 0.1;

    fn detector(frames: u32) -> BlinkEdgeDetector {
        BlinkEdgeDetector::new(DetectorConfig {
            ear_threshold: 0.22,
            min_consecutive_frames: frames,
        })
    }

    fn run(detector: &mut BlinkEdgeDetector, frames: &[f32]) -> Vec<bool> {
        frames.iter().map(|&ear| detector.process_frame(ear, ear)).collect()
    }

    #[test]
    fn test_short_closure_ignored() {
        let mut d = detector(3);
        let events = run(&mut d, &[CLOSED, CLOSED, OPEN]);
        assert!(events.iter().all(|&e| !e));
    }

    #[test]
    fn test_fires_on_confirming_frame() {
        let mut d = detector(3);
        let events = run(&mut d, &[CLOSED, CLOSED, CLOSED, OPEN]);
        assert_eq!(events, vec![false, false, true, false]);
    }

    #[test]
    fn test_latched_while_closed() {
        let mut d = detector(2);
        let events = run(&mut d, &[CLOSED; 10]);
        assert_eq!(events.iter().filter(|&&e| e).count(), 1);
        assert!(d.state().blink_latched);
        assert_eq!(d.state().consecutive_below_threshold, 10);
    }

    #[test]
    fn test_rearms_after_open_frame() {
        let mut d = detector(2);
        let events = run(&mut d, &[CLOSED, CLOSED, CLOSED, OPEN, CLOSED, CLOSED]);
        assert_eq!(events, vec![false, true, false, false, false, true]);
    }

    #[test]
    fn test_uses_average_of_both_eyes() {
        let mut d = detector(1);
        // average 0.2 is below 0.22 even though one eye is open
        assert!(d.process_frame(0.3, 0.1));
        d.reset();
        // average 0.25 is above
        assert!(!d.process_frame(0.4, 0.1));
    }

    #[test]
    fn test_reset_matches_fresh_instance() {
        let mut d = detector(2);
        run(&mut d, &[CLOSED, CLOSED, CLOSED]);
        d.reset();
        assert_eq!(d.state(), &BlinkEdgeDetectorState::default());

        let mut fresh = detector(2);
        let sequence = [CLOSED, CLOSED, OPEN];
        assert_eq!(run(&mut d, &sequence), run(&mut fresh, &sequence));
    }

    #[test]
    fn test_malformed_values_fail_open() {
        let mut d = detector(2);
        assert!(!d.process_frame(CLOSED, CLOSED));
        // NaN counts as open and breaks the closure
        assert!(!d.process_frame(f32::NAN, CLOSED));
        assert_eq!(d.state().consecutive_below_threshold, 0);
        assert!(!d.process_frame(-1.0, -1.0));
        assert!(!d.process_frame(CLOSED, CLOSED));
        assert!(d.process_frame(CLOSED, CLOSED));
    }

    #[test]
    fn test_reconfigure_unlatches() {
        let mut d = detector(1);
        assert!(d.process_frame(CLOSED, CLOSED));
        d.reconfigure(DetectorConfig::strict());
        assert!(!d.state().blink_latched);
        assert_eq!(d.config().min_consecutive_frames, 3);
        // 0.1 is below the strict 0.18 threshold
        assert_eq!(run(&mut d, &[CLOSED, CLOSED, CLOSED]), vec![false, false, true]);
    }

    proptest! {
        #[test]
        fn one_event_per_closure(frames in 1u32..6, closed_len in 0usize..20) {
            let mut d = detector(frames);
            let mut sequence = vec![CLOSED; closed_len];
            sequence.push(OPEN);
            let events = run(&mut d, &sequence).into_iter().filter(|&e| e).count();
            let expected = if closed_len >= frames as usize { 1 } else { 0 };
            prop_assert_eq!(events, expected);
        }
    }
}
