//! Server binary for the tally scoreboard and budget tracker.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$TALLY_CONFIG` (default `tally-config.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the scoreboard backend and, if enabled, the budget ledger
//! 4. Assemble the shared application state
//! 5. Serve HTTP until `Ctrl-C`

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use tally_core::TallyConfig;
use tally_core::config::{LogFormat, LoggingConfig};
use tally_store::{BoardStore, LedgerStore};
use tally_web::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "tally-config.yaml";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load configuration. Logging is not up yet, so remember where it
    //    came from and report it afterwards.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(source = %source, "tally-server starting");
    info!(
        title = config.board.title,
        participants = config.board.participants.len(),
        categories = config.board.categories.len(),
        activities = config.board.activities.len(),
        max_depth = config.history.max_depth,
        "Configuration loaded"
    );

    // 3. Build backends.
    let board_store = BoardStore::from_config(&config)?;
    let ledger = if config.budget.enabled {
        Some(LedgerStore::from_config(&config)?)
    } else {
        info!("Budget tracker disabled");
        None
    };

    // 4. Shared state.
    let state = Arc::new(AppState::new(&config, board_store, ledger)?);

    // 5. Serve.
    tally_web::start_server(&config.server, state).await?;
    info!("tally-server exiting");
    Ok(())
}

/// Load configuration from `$TALLY_CONFIG` or [`DEFAULT_CONFIG_PATH`].
///
/// A missing default file falls back to built-in defaults (with
/// environment overrides). A missing file named explicitly is an error.
fn load_config() -> Result<(TallyConfig, String), AppError> {
    if let Some(path) = std::env::var_os("TALLY_CONFIG").map(PathBuf::from) {
        let config = TallyConfig::from_file(&path)?;
        return Ok((config, path.display().to_string()));
    }

    let path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if path.exists() {
        let config = TallyConfig::from_file(&path)?;
        Ok((config, path.display().to_string()))
    } else {
        Ok((TallyConfig::parse("{}")?, "defaults".to_owned()))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}
