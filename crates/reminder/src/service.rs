//! Async coordinator service
//!
//! Runs one [`ReminderCoordinator`] on a single task. Control messages, blinks,
//! and ticks are handled one at a time. Blinks have their own unbounded queue
//! so a burst of control traffic can never drop one.

use crate::coordinator::{ReminderCoordinator, ReminderSnapshot, ShowOutcome};
use crate::gateway::{CloseReason, SurfaceGateway};
use crate::{ReminderConfig, ReminderError};
use blink_detect::{BlinkSink, SourceId};
use settings::Settings;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

/// Inbound queue depth
const CHANNEL_CAPACITY: usize = 64;

/// Messages accepted by the service
#[derive(Debug)]
pub enum ReminderMessage {
    RequestShow { reply: Option<oneshot::Sender<ShowOutcome>> },
    RequestClose { reason: CloseReason },
    SurfaceClosed { reason: CloseReason },
    SetEnabled(bool),
    SetInterval(u32),
    SetOpacity(f32),
    ApplySettings(Settings),
    Shutdown,
}

/// Single consumer of [`ReminderMessage`]s plus the periodic tick source
pub struct ReminderService<G> {
    coordinator: ReminderCoordinator<G>,
    rx: mpsc::Receiver<ReminderMessage>,
    blink_rx: mpsc::UnboundedReceiver<SourceId>,
    snapshot_tx: watch::Sender<ReminderSnapshot>,
    tick_period: Duration,
    /// Present only while the session is enabled
    ticker: Option<Interval>,
}

impl<G> ReminderService<G>
where
    G: SurfaceGateway + Send + 'static,
{
    /// Start the service on the current tokio runtime
    pub fn spawn(config: ReminderConfig, gateway: G) -> (ReminderHandle, JoinHandle<()>) {
        let (handle, service) = Self::new(config, gateway);
        (handle, tokio::spawn(service.run()))
    }

    pub fn new(config: ReminderConfig, gateway: G) -> (ReminderHandle, Self) {
        let coordinator = ReminderCoordinator::new(&config, gateway);
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (blink_tx, blink_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(coordinator.snapshot());

        let service = Self {
            coordinator,
            rx,
            blink_rx,
            snapshot_tx,
            tick_period: config.tick_period(),
            ticker: None,
        };
        (
            ReminderHandle {
                tx,
                blink_tx,
                snapshot_rx,
            },
            service,
        )
    }

    /// Run until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        info!("Starting reminder service (tick every {:?})", self.tick_period);
        self.sync_ticker(false);

        loop {
            tokio::select! {
                biased;

                message = self.rx.recv() => {
                    match message {
                        Some(ReminderMessage::Shutdown) | None => break,
                        Some(message) => self.handle(message),
                    }
                }
                Some(source) = self.blink_rx.recv() => {
                    self.coordinator.blink_observed(&source);
                }
                _ = next_tick(&mut self.ticker) => {
                    self.coordinator.tick();
                }
            }
            self.publish();
        }

        self.coordinator.shutdown();
        self.ticker = None;
        self.publish();
        info!("Reminder service stopped");
    }

    fn handle(&mut self, message: ReminderMessage) {
        debug!("Handling {:?}", message);
        let mut restart_ticks = false;

        match message {
            ReminderMessage::RequestShow { reply } => {
                let outcome = self.coordinator.request_show();
                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
            }
            ReminderMessage::RequestClose { reason } => {
                self.coordinator.request_close(reason);
            }
            ReminderMessage::SurfaceClosed { reason } => self.coordinator.surface_closed(reason),
            ReminderMessage::SetEnabled(enabled) => self.coordinator.set_enabled(enabled),
            ReminderMessage::SetInterval(ticks) => {
                self.coordinator.set_interval(ticks);
                restart_ticks = true;
            }
            ReminderMessage::SetOpacity(opacity) => self.coordinator.set_opacity(opacity),
            ReminderMessage::ApplySettings(settings) => {
                restart_ticks = settings.timer_interval_secs.max(1)
                    != self.coordinator.snapshot().full_interval;
                self.coordinator.apply_settings(&settings);
            }
            ReminderMessage::Shutdown => {}
        }

        self.sync_ticker(restart_ticks);
    }

    /// Keep the tick source alive exactly while the session is enabled.
    /// Dropping the interval cancels any pending tick.
    fn sync_ticker(&mut self, restart: bool) {
        let enabled = self.coordinator.is_enabled();
        if !enabled {
            if self.ticker.take().is_some() {
                debug!("Tick source stopped");
            }
            return;
        }
        if self.ticker.is_none() || restart {
            let mut ticker = interval_at(Instant::now() + self.tick_period, self.tick_period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.ticker = Some(ticker);
            debug!("Tick source started");
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.coordinator.snapshot());
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Cloneable sender side of the service
#[derive(Debug, Clone)]
pub struct ReminderHandle {
    tx: mpsc::Sender<ReminderMessage>,
    blink_tx: mpsc::UnboundedSender<SourceId>,
    snapshot_rx: watch::Receiver<ReminderSnapshot>,
}

impl ReminderHandle {
    async fn send(&self, message: ReminderMessage) -> Result<(), ReminderError> {
        self.tx
            .send(message)
            .await
            .map_err(|_| ReminderError::ChannelClosed)
    }

    pub async fn blink_observed(&self, source: SourceId) -> Result<(), ReminderError> {
        self.blink_tx
            .send(source)
            .map_err(|_| ReminderError::ChannelClosed)
    }

    /// Ask for the overlay now; reports whether it was already up
    pub async fn request_show(&self) -> Result<ShowOutcome, ReminderError> {
        let (reply, outcome) = oneshot::channel();
        self.send(ReminderMessage::RequestShow { reply: Some(reply) })
            .await?;
        outcome.await.map_err(|_| ReminderError::ChannelClosed)
    }

    pub async fn request_close(&self, reason: CloseReason) -> Result<(), ReminderError> {
        self.send(ReminderMessage::RequestClose { reason }).await
    }

    /// Report that the surface closed the overlay itself
    pub async fn surface_closed(&self, reason: CloseReason) -> Result<(), ReminderError> {
        self.send(ReminderMessage::SurfaceClosed { reason }).await
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<(), ReminderError> {
        self.send(ReminderMessage::SetEnabled(enabled)).await
    }

    pub async fn set_interval(&self, interval_ticks: u32) -> Result<(), ReminderError> {
        self.send(ReminderMessage::SetInterval(interval_ticks)).await
    }

    pub async fn set_opacity(&self, opacity: f32) -> Result<(), ReminderError> {
        self.send(ReminderMessage::SetOpacity(opacity)).await
    }

    pub async fn apply_settings(&self, settings: Settings) -> Result<(), ReminderError> {
        self.send(ReminderMessage::ApplySettings(settings)).await
    }

    /// Close any visible overlay and stop the service
    pub async fn shutdown(&self) -> Result<(), ReminderError> {
        self.send(ReminderMessage::Shutdown).await
    }

    /// Latest published state
    pub fn snapshot(&self) -> ReminderSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Watch state changes (the read-only overlay visibility view)
    pub fn subscribe(&self) -> watch::Receiver<ReminderSnapshot> {
        self.snapshot_rx.clone()
    }
}

impl BlinkSink for ReminderHandle {
    fn blink_observed(&self, source: &SourceId) {
        if self.blink_tx.send(source.clone()).is_err() {
            debug!("Reminder service stopped, ignoring blink from {}", source);
        }
    }
}
