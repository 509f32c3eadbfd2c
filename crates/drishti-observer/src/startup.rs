//! Server startup helper for the binary.
//!
//! [`spawn_observer`] binds eagerly, so a taken port fails startup instead
//! of surfacing later from a background task, then serves on its own Tokio
//! task alongside the mutation loop.

use std::net::SocketAddr;
use std::sync::Arc;

use drishti_core::config::ServerConfig;
use tokio::task::JoinHandle;

use crate::server::{self, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// A server running on a background task.
#[derive(Debug)]
pub struct RunningServer {
    /// Address actually bound (useful when the configured port is 0).
    pub addr: SocketAddr,
    /// The serving task. Abort it to stop the server.
    pub handle: JoinHandle<()>,
}

/// Bind the configured address and serve the API on a background task.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<RunningServer, StartupError> {
    let listener = server::bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state).await {
            tracing::error!(error = %e, "Server exited with error");
        }
    });

    tracing::info!(%addr, "Server spawned on background task");

    Ok(RunningServer { addr, handle })
}
