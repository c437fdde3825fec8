//! Log-only presentation surface

use reminder::OverlayCommand;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Consume overlay requests until the coordinator goes away.
///
/// Requests may arrive duplicated or out of order relative to what is on
/// screen; a close with nothing shown is ignored.
pub async fn run_log_surface(mut rx: mpsc::UnboundedReceiver<OverlayCommand>) -> usize {
    let mut visible = false;
    let mut shown = 0;

    while let Some(command) = rx.recv().await {
        match command {
            OverlayCommand::Show { opacity } if !visible => {
                visible = true;
                shown += 1;
                info!("Time to blink! (overlay opacity {:.0}%)", opacity * 100.0);
            }
            OverlayCommand::Show { .. } => debug!("Overlay already visible"),
            OverlayCommand::Close { reason } if visible => {
                visible = false;
                info!("Reminder dismissed: {}", reason);
            }
            OverlayCommand::Close { reason } => {
                debug!("Close ({}) with no overlay visible", reason)
            }
        }
    }

    debug!("Presentation surface closed after {} reminders", shown);
    shown
}
