//! Drishti backend binary.
//!
//! Wires the live stores, the mutation loop, and the HTTP + `WebSocket`
//! server together and runs until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `drishti-config.yaml` (or `DRISHTI_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Validate configuration
//! 4. Populate the zone store and agent registry
//! 5. Start the HTTP + `WebSocket` server
//! 6. Run the mutation loop until shutdown

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use drishti_core::config::LoggingConfig;
use drishti_core::random::{fork_rng, seeded_rng};
use drishti_core::{DrishtiConfig, Mutator};
use drishti_observer::{AppState, spawn_observer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::LaunchError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "drishti-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any startup step fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run().await?;
    Ok(())
}

async fn run() -> Result<(), LaunchError> {
    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!("drishti-server starting");
    info!(
        source = %source,
        rows = config.grid.rows,
        columns = config.grid.columns,
        interval_ms = config.mutator.interval_ms,
        seed = ?config.mutator.seed,
        "Configuration loaded"
    );

    // 3. Validate.
    config.validate()?;

    // 4. Build stores and shared state.
    let mut rng = seeded_rng(config.mutator.seed);
    let state = Arc::new(AppState::from_config(&config, &mut rng)?);
    info!(
        zones = state.zones.len(),
        agents = state.agents.len(),
        "Zone store and agent registry populated"
    );

    // 5. Start the HTTP + WebSocket server.
    let server = spawn_observer(&config.server, Arc::clone(&state)).await?;
    info!(addr = %server.addr, "API server started");

    // 6. Run the mutation loop; every cycle is pushed to live clients.
    let mutator = Mutator::with_rng(
        Arc::clone(&state.zones),
        Arc::clone(&state.agents),
        config.mutator.clone(),
        Box::new(state.broadcaster.clone()),
        fork_rng(&mut rng),
    );

    tokio::select! {
        () = mutator.run() => {}
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "Failed to listen for Ctrl-C, shutting down");
            } else {
                info!("Ctrl-C received, shutting down");
            }
        }
    }

    server.handle.abort();
    info!("drishti-server stopped");
    Ok(())
}

/// Load configuration from `DRISHTI_CONFIG` or `drishti-config.yaml`.
///
/// A missing file is not an error: defaults are used, with the
/// `DRISHTI_HOST` / `DRISHTI_PORT` overrides still applied.
fn load_config() -> Result<(DrishtiConfig, String), LaunchError> {
    let path = std::env::var_os("DRISHTI_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if path.exists() {
        let config = DrishtiConfig::from_file(&path)?;
        Ok((config, path.display().to_string()))
    } else {
        let config = DrishtiConfig::parse("")?;
        Ok((config, String::from("defaults")))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins; otherwise `logging.level` from config is used.
fn init_logging(config: &LoggingConfig) -> Result<(), LaunchError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };

    result.map_err(|e| LaunchError::Logging {
        message: e.to_string(),
    })
}
