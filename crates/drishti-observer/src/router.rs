//! Axum router construction.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS open for the dashboard and request tracing.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws` -- `WebSocket` live event feed
/// - `GET /api/health` -- liveness check
/// - `GET /api/zones` -- all zones
/// - `GET /api/zones/{id}` -- single zone
/// - `GET /api/zones/{id}/prediction` -- zone forecast
/// - `GET /api/agents` -- monitoring agents
/// - `POST /api/command` -- command interpretation
///
/// CORS allows any origin so the dashboard can be served from anywhere.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws", get(ws::ws_live))
        // REST API
        .route("/api/health", get(handlers::health))
        .route("/api/zones", get(handlers::list_zones))
        .route("/api/zones/{id}", get(handlers::get_zone))
        .route("/api/zones/{id}/prediction", get(handlers::zone_prediction))
        .route("/api/agents", get(handlers::list_agents))
        .route("/api/command", post(handlers::process_command))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
