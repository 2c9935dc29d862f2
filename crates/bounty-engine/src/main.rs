//! Standalone host for the bounty board.
//!
//! Stands in for the world server: it owns the board, loads the record at
//! startup, checkpoints on a timer, and saves once more on Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `bounty-config.yaml` (or the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Load the roster and bank balances
//! 4. Build the board and run the start hook
//! 5. Checkpoint every `checkpoint.interval_secs` until Ctrl-C
//! 6. Run a final checkpoint and exit

mod error;
mod host;

use std::path::{Path, PathBuf};
use std::time::Duration;

use bounty_core::{BountyBoard, BountyConfig, NoticeLog, StandaloneWorld, load_roster};
use bounty_store::BountyStore;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "bounty-config.yaml";

/// Application entry point for the bounty engine.
///
/// # Errors
///
/// Returns an error if the configuration or roster cannot be loaded.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging depends on it, so this comes first.
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("bounty-engine starting");
    info!(
        path = %config_path.display(),
        from_file,
        store = %config.storage.path.display(),
        interval_secs = config.checkpoint.interval_secs,
        min_stake = config.rules.min_stake,
        bonus_share_cap = config.rules.bonus_share_cap,
        "Configuration loaded"
    );

    // 3. Load roster.
    let world = load_world(&config.roster.path)?;
    info!(players = world.roster.len(), "Roster loaded");

    // 4. Build the board and load the record before anything can use it.
    let period = Duration::from_secs(config.checkpoint.interval_secs.max(1));
    let board = Mutex::new(BountyBoard::new(
        config.rules,
        BountyStore::new(config.storage.path),
        world.roster,
        world.bank,
        NoticeLog::new(),
    ));
    board.lock().await.on_start(Utc::now());

    // 5-6. Checkpoint until shutdown, then once more.
    let runs = host::run_checkpoints(&board, period, shutdown_signal()).await;

    info!(checkpoints = runs, "bounty-engine shutdown complete");
    Ok(())
}

/// Load the configuration, falling back to defaults when the file is
/// absent. The flag says whether the file was read.
fn load_config(path: &Path) -> Result<(BountyConfig, bool), EngineError> {
    if path.exists() {
        Ok((BountyConfig::from_file(path)?, true))
    } else {
        let mut config = BountyConfig::default();
        config.storage.apply_env_overrides();
        Ok((config, false))
    }
}

/// Load the roster file. A missing file gives an empty world.
fn load_world(path: &Path) -> Result<StandaloneWorld, EngineError> {
    if path.exists() {
        Ok(load_roster(path)?)
    } else {
        info!(path = %path.display(), "Roster file not found, starting with no players");
        Ok(StandaloneWorld::default())
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed the host keeps
/// running and relies on the periodic checkpoints.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C, shutdown will skip the final save");
        std::future::pending::<()>().await;
    }
}
