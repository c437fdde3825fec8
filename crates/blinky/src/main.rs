//! Blinky - Main Entry Point
//!
//! Usage: `blinky [settings-file] < frames.jsonl`

use blinky::{init_logging, run};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== Blinky v{} ===", env!("CARGO_PKG_VERSION"));

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = settings::load(path.as_deref())?;
    info!("Settings: {:?}", settings);

    run(settings, BufReader::new(tokio::io::stdin())).await
}
