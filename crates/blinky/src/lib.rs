//! Blinky
//!
//! Wires the blink detector, the reminder coordinator, and a presentation
//! surface together:
//! - frames arrive as JSON lines (one observation stream per `source`)
//! - blinks reset the countdown and dismiss the overlay
//! - overlay requests go to a log-only presentation surface

pub mod feed;
pub mod surface;

pub use feed::{Control, FeedLine, FrameFeed};

use anyhow::Context;
use reminder::{ChannelGateway, ReminderConfig, ReminderService};
use settings::Settings;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Initialize logging. `RUST_LOG` sets the filter (default `info`);
/// `BLINKY_LOG_FORMAT=json` switches to JSON output.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("BLINKY_LOG_FORMAT").is_ok_and(|format| format == "json");

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.expect("Failed to set tracing subscriber");
}

/// Run a session until the input ends or Ctrl-C.
///
/// Bad feed lines are logged and skipped. A read error ends the session, but
/// the coordinator is still shut down first so a visible overlay gets closed.
pub async fn run<R>(settings: Settings, mut input: R) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let (gateway, overlay_rx) = ChannelGateway::new();
    let (handle, service) =
        ReminderService::spawn(ReminderConfig::from_settings(&settings), gateway);
    let surface = tokio::spawn(surface::run_log_surface(overlay_rx));

    let mut feed = FrameFeed::new(handle.clone(), &settings);
    let mut buf = Vec::new();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let result = loop {
        tokio::select! {
            read = input.read_until(b'\n', &mut buf) => match read {
                Ok(0) => {
                    info!("Frame feed closed");
                    break Ok(());
                }
                Ok(_) => {
                    match std::str::from_utf8(&buf) {
                        Ok(line) => {
                            if let Err(e) = feed.dispatch(line).await {
                                warn!("Ignoring feed line: {:#}", e);
                            }
                        }
                        Err(e) => warn!("Ignoring undecodable feed line: {}", e),
                    }
                    buf.clear();
                }
                Err(e) => {
                    error!("Frame feed read failed: {}", e);
                    break Err(e);
                }
            },
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break Ok(());
            }
        }
    };

    handle.shutdown().await?;
    service.await?;
    surface.await?;
    result.context("frame feed read failed")
}
