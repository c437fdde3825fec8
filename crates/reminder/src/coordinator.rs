//! Reminder coordinator state machine

use crate::gateway::{CloseReason, OverlayCommand, SurfaceGateway};
use crate::ReminderConfig;
use blink_detect::SourceId;
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Serialize;
use settings::Settings;
use tracing::{debug, info, warn};

/// Coordinator state. This enum is the only record of whether the overlay is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReminderState {
    /// Session disabled; only `set_enabled(true)` is acted upon
    Off,
    /// Counting down; `remaining` ticks until the overlay is shown
    Idle { remaining: u32 },
    /// Overlay requested at `started_at`
    Presenting { started_at: DateTime<Utc> },
}

/// Result of a show request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShowOutcome {
    /// A show request was sent
    Shown,
    /// Overlay already up; nothing sent
    AlreadyVisible,
    /// Disabled session or unreachable surface; nothing shown
    Suppressed,
}

impl ShowOutcome {
    pub fn already_visible(&self) -> bool {
        matches!(self, ShowOutcome::AlreadyVisible)
    }
}

/// Read-only view of the coordinator for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderSnapshot {
    pub state: ReminderState,
    pub full_interval: u32,
    pub overlay_opacity: f32,
}

impl ReminderSnapshot {
    pub fn enabled(&self) -> bool {
        self.state != ReminderState::Off
    }

    pub fn overlay_visible(&self) -> bool {
        matches!(self.state, ReminderState::Presenting { .. })
    }

    /// Ticks left in the countdown, if counting
    pub fn remaining(&self) -> Option<u32> {
        match self.state {
            ReminderState::Idle { remaining } => Some(remaining),
            _ => None,
        }
    }
}

/// One per session. All inputs must be serialized by the caller; see
/// [`crate::ReminderService`] for the async wrapper.
pub struct ReminderCoordinator<G> {
    gateway: G,
    state: ReminderState,
    full_interval: u32,
    overlay_opacity: f32,
}

impl<G: SurfaceGateway> ReminderCoordinator<G> {
    pub fn new(config: &ReminderConfig, gateway: G) -> Self {
        let full_interval = config.interval_ticks.max(1);
        let state = if config.enabled {
            ReminderState::Idle {
                remaining: full_interval,
            }
        } else {
            ReminderState::Off
        };
        info!("Creating reminder coordinator: {:?}", config);
        Self {
            gateway,
            state,
            full_interval,
            overlay_opacity: config.overlay_opacity,
        }
    }

    /// One unit of wall time elapsed. Returns `true` if the overlay was requested.
    pub fn tick(&mut self) -> bool {
        let ReminderState::Idle { remaining } = self.state else {
            return false;
        };

        let remaining = remaining.saturating_sub(1);
        if remaining > 0 {
            self.state = ReminderState::Idle { remaining };
            return false;
        }

        info!("No blink for {} ticks, showing reminder", self.full_interval);
        self.show()
    }

    /// A blink from any observation stream
    pub fn blink_observed(&mut self, source: &SourceId) {
        match self.state {
            ReminderState::Off => {}
            ReminderState::Idle { .. } => {
                counter!("blinky_blinks_observed_total").increment(1);
                debug!("Blink from {}, countdown reset", source);
                self.restart_countdown();
            }
            ReminderState::Presenting { .. } => {
                counter!("blinky_blinks_observed_total").increment(1);
                info!("Blink from {} dismisses reminder", source);
                self.close(CloseReason::Blink);
            }
        }
    }

    /// Explicit show. Never issues a second show while one is up, unless the
    /// surface is known to be gone.
    pub fn request_show(&mut self) -> ShowOutcome {
        match self.state {
            ReminderState::Off => ShowOutcome::Suppressed,
            ReminderState::Presenting { .. } if self.gateway.overlay_alive() => {
                counter!("blinky_duplicate_show_requests_total").increment(1);
                debug!("Show requested while overlay already visible");
                ShowOutcome::AlreadyVisible
            }
            ReminderState::Presenting { started_at } => {
                counter!("blinky_stale_surfaces_recovered_total").increment(1);
                warn!(
                    "Overlay shown at {} no longer exists, recovering before new show",
                    started_at
                );
                self.restart_countdown();
                self.show_outcome()
            }
            ReminderState::Idle { .. } => self.show_outcome(),
        }
    }

    /// Explicit close (click, escape key, API call). No-op unless presenting.
    pub fn request_close(&mut self, reason: CloseReason) -> bool {
        if !matches!(self.state, ReminderState::Presenting { .. }) {
            debug!("Close ({}) requested with no overlay visible", reason);
            return false;
        }
        info!("Closing reminder: {}", reason);
        self.close(reason);
        true
    }

    /// The surface closed the overlay on its own. No close request is sent back.
    pub fn surface_closed(&mut self, reason: CloseReason) {
        if matches!(self.state, ReminderState::Presenting { .. }) {
            counter!("blinky_overlays_closed_total", "reason" => reason.as_str()).increment(1);
            info!("Overlay closed by surface: {}", reason);
            self.restart_countdown();
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        match (enabled, self.state) {
            (true, ReminderState::Off) => {
                info!("Reminders enabled");
                self.restart_countdown();
            }
            (false, ReminderState::Presenting { .. }) => {
                self.close(CloseReason::SettingsDisabled);
                self.state = ReminderState::Off;
                info!("Reminders disabled");
            }
            (false, ReminderState::Idle { .. }) => {
                self.state = ReminderState::Off;
                info!("Reminders disabled");
            }
            _ => {}
        }
    }

    /// Change the countdown length. An idle countdown restarts at the new value.
    pub fn set_interval(&mut self, interval_ticks: u32) {
        self.full_interval = interval_ticks.max(1);
        debug!("Reminder interval set to {} ticks", self.full_interval);
        if matches!(self.state, ReminderState::Idle { .. }) {
            self.restart_countdown();
        }
    }

    /// Takes effect on the next show
    pub fn set_opacity(&mut self, opacity: f32) {
        self.overlay_opacity = opacity;
    }

    /// Apply interval, opacity, then the enabled flag
    pub fn apply_settings(&mut self, settings: &Settings) {
        if settings.timer_interval_secs.max(1) != self.full_interval {
            self.set_interval(settings.timer_interval_secs);
        }
        self.set_opacity(settings.overlay_opacity);
        self.set_enabled(settings.enabled);
    }

    /// Close anything still on screen before the session ends
    pub fn shutdown(&mut self) {
        if matches!(self.state, ReminderState::Presenting { .. }) {
            self.close(CloseReason::AppRequest);
        }
        self.state = ReminderState::Off;
    }

    pub fn snapshot(&self) -> ReminderSnapshot {
        ReminderSnapshot {
            state: self.state,
            full_interval: self.full_interval,
            overlay_opacity: self.overlay_opacity,
        }
    }

    pub fn state(&self) -> ReminderState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state != ReminderState::Off
    }

    pub fn overlay_visible(&self) -> bool {
        matches!(self.state, ReminderState::Presenting { .. })
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn restart_countdown(&mut self) {
        self.state = ReminderState::Idle {
            remaining: self.full_interval,
        };
    }

    fn show_outcome(&mut self) -> ShowOutcome {
        if self.show() {
            ShowOutcome::Shown
        } else {
            ShowOutcome::Suppressed
        }
    }

    /// Optimistically enter `Presenting`; an unreachable surface leaves us idle
    fn show(&mut self) -> bool {
        match self.gateway.send(OverlayCommand::Show {
            opacity: self.overlay_opacity,
        }) {
            Ok(()) => {
                counter!("blinky_overlays_shown_total").increment(1);
                self.state = ReminderState::Presenting {
                    started_at: Utc::now(),
                };
                true
            }
            Err(e) => {
                warn!("Failed to show reminder: {}", e);
                self.restart_countdown();
                false
            }
        }
    }

    fn close(&mut self, reason: CloseReason) {
        counter!("blinky_overlays_closed_total", "reason" => reason.as_str()).increment(1);
        self.restart_countdown();
        if let Err(e) = self.gateway.send(OverlayCommand::Close { reason }) {
            debug!("Close request not delivered: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReminderError;

    #[derive(Default)]
    struct RecordingGateway {
        sent: Vec<OverlayCommand>,
        destroyed: bool,
        unreachable: bool,
    }

    impl SurfaceGateway for RecordingGateway {
        fn send(&mut self, command: OverlayCommand) -> Result<(), ReminderError> {
            if self.unreachable {
                return Err(ReminderError::Gateway("unreachable".into()));
            }
            self.sent.push(command);
            Ok(())
        }

        fn overlay_alive(&self) -> bool {
            !self.destroyed
        }
    }

    impl RecordingGateway {
        fn shows(&self) -> usize {
            self.sent
                .iter()
                .filter(|c| matches!(c, OverlayCommand::Show { .. }))
                .count()
        }

        fn closes(&self) -> Vec<CloseReason> {
            self.sent
                .iter()
                .filter_map(|c| match c {
                    OverlayCommand::Close { reason } => Some(*reason),
                    _ => None,
                })
                .collect()
        }
    }

    fn coordinator(interval: u32) -> ReminderCoordinator<RecordingGateway> {
        let config = ReminderConfig {
            interval_ticks: interval,
            ..Default::default()
        };
        ReminderCoordinator::new(&config, RecordingGateway::default())
    }

    fn presenting(interval: u32) -> ReminderCoordinator<RecordingGateway> {
        let mut c = coordinator(interval);
        for _ in 0..interval {
            c.tick();
        }
        assert!(c.overlay_visible());
        c
    }

    fn source() -> SourceId {
        SourceId::new("foreground")
    }

    #[test]
    fn test_shows_on_final_tick() {
        let mut c = coordinator(5);
        assert_eq!(c.state(), ReminderState::Idle { remaining: 5 });

        let fired: Vec<bool> = (0..5).map(|_| c.tick()).collect();
        assert_eq!(fired, vec![false, false, false, false, true]);
        assert_eq!(c.gateway().shows(), 1);
        assert_eq!(
            c.gateway().sent[0],
            OverlayCommand::Show { opacity: 0.6 }
        );
        assert!(matches!(c.state(), ReminderState::Presenting { .. }));
    }

    #[test]
    fn test_ticks_ignored_while_presenting() {
        let mut c = presenting(2);
        for _ in 0..10 {
            assert!(!c.tick());
        }
        assert_eq!(c.gateway().shows(), 1);
    }

    #[test]
    fn test_blink_dismisses_overlay() {
        let mut c = presenting(5);
        c.blink_observed(&source());
        assert_eq!(c.gateway().closes(), vec![CloseReason::Blink]);
        assert_eq!(c.state(), ReminderState::Idle { remaining: 5 });
    }

    #[test]
    fn test_blink_while_idle_resets_countdown() {
        let mut c = coordinator(5);
        c.tick();
        c.tick();
        assert_eq!(c.snapshot().remaining(), Some(3));
        c.blink_observed(&source());
        assert_eq!(c.snapshot().remaining(), Some(5));
        assert!(c.gateway().sent.is_empty());
    }

    #[test]
    fn test_blinks_from_any_source_count() {
        let mut c = presenting(3);
        c.blink_observed(&SourceId::new("background"));
        assert_eq!(c.gateway().closes(), vec![CloseReason::Blink]);
    }

    #[test]
    fn test_duplicate_show_requests() {
        let mut c = coordinator(5);
        assert_eq!(c.request_show(), ShowOutcome::Shown);
        let second = c.request_show();
        assert!(second.already_visible());
        assert_eq!(c.gateway().shows(), 1);
    }

    #[test]
    fn test_stale_presenting_recovered() {
        let mut c = presenting(3);
        c.gateway.destroyed = true;
        assert_eq!(c.request_show(), ShowOutcome::Shown);
        assert_eq!(c.gateway().shows(), 2);
        assert!(c.overlay_visible());
    }

    #[test]
    fn test_unreachable_surface_stays_idle() {
        let mut c = coordinator(2);
        c.gateway.unreachable = true;
        c.tick();
        assert!(!c.tick());
        assert_eq!(c.state(), ReminderState::Idle { remaining: 2 });
        assert_eq!(c.request_show(), ShowOutcome::Suppressed);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut c = presenting(3);
        assert!(c.request_close(CloseReason::Click));
        assert!(!c.request_close(CloseReason::Click));
        assert!(!c.request_close(CloseReason::EscapeKey));
        assert_eq!(c.gateway().closes(), vec![CloseReason::Click]);
        assert_eq!(c.state(), ReminderState::Idle { remaining: 3 });
    }

    #[test]
    fn test_surface_closed_sends_nothing() {
        let mut c = presenting(3);
        c.surface_closed(CloseReason::Click);
        assert!(c.gateway().closes().is_empty());
        assert_eq!(c.state(), ReminderState::Idle { remaining: 3 });

        c.surface_closed(CloseReason::Click);
        assert_eq!(c.state(), ReminderState::Idle { remaining: 3 });
    }

    #[test]
    fn test_disable_while_presenting() {
        let mut c = presenting(3);
        c.set_enabled(false);
        c.set_enabled(false);
        assert_eq!(c.gateway().closes(), vec![CloseReason::SettingsDisabled]);
        assert_eq!(c.state(), ReminderState::Off);

        for _ in 0..10 {
            c.tick();
        }
        c.blink_observed(&source());
        assert_eq!(c.request_show(), ShowOutcome::Suppressed);
        assert!(!c.request_close(CloseReason::Click));
        assert_eq!(c.gateway().sent.len(), 2);

        c.set_enabled(true);
        assert_eq!(c.state(), ReminderState::Idle { remaining: 3 });
    }

    #[test]
    fn test_starts_off_when_disabled() {
        let config = ReminderConfig {
            enabled: false,
            ..Default::default()
        };
        let mut c = ReminderCoordinator::new(&config, RecordingGateway::default());
        assert_eq!(c.state(), ReminderState::Off);
        c.tick();
        assert!(c.gateway().sent.is_empty());
    }

    #[test]
    fn test_set_interval_restarts_countdown() {
        let mut c = coordinator(10);
        for _ in 0..7 {
            c.tick();
        }
        c.set_interval(30);
        assert_eq!(c.state(), ReminderState::Idle { remaining: 30 });
    }

    #[test]
    fn test_set_interval_while_presenting() {
        let mut c = presenting(3);
        c.set_interval(20);
        assert!(c.overlay_visible());
        c.blink_observed(&source());
        assert_eq!(c.state(), ReminderState::Idle { remaining: 20 });
    }

    #[test]
    fn test_opacity_used_on_next_show() {
        let mut c = coordinator(1);
        c.set_opacity(0.9);
        c.tick();
        assert_eq!(c.gateway().sent, vec![OverlayCommand::Show { opacity: 0.9 }]);
    }

    #[test]
    fn test_apply_settings() {
        let mut c = coordinator(5);
        c.tick();

        // unchanged interval keeps the countdown going
        c.apply_settings(&Settings::default());
        assert_eq!(c.snapshot().remaining(), Some(4));

        let settings = Settings {
            timer_interval_secs: 60,
            overlay_opacity: 0.3,
            ..Default::default()
        };
        c.apply_settings(&settings);
        let snapshot = c.snapshot();
        assert_eq!(snapshot.remaining(), Some(60));
        assert!((snapshot.overlay_opacity - 0.3).abs() < f32::EPSILON);

        c.request_show();
        c.apply_settings(&Settings {
            enabled: false,
            ..settings
        });
        assert_eq!(c.gateway().closes(), vec![CloseReason::SettingsDisabled]);
        assert!(!c.snapshot().enabled());
    }

    #[test]
    fn test_shutdown_closes_overlay() {
        let mut c = presenting(2);
        c.shutdown();
        assert_eq!(c.gateway().closes(), vec![CloseReason::AppRequest]);
        assert_eq!(c.state(), ReminderState::Off);
    }
}
