//! REST API endpoint handlers.
//!
//! All reads are copies taken from the live stores via the shared
//! [`AppState`]. Only `POST /api/command` has a side effect: it broadcasts
//! `command_processed` to every `WebSocket` client.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/health` | Liveness and agent count |
//! | `GET` | `/api/zones` | All zones keyed by id |
//! | `GET` | `/api/zones/{id}` | Single zone |
//! | `GET` | `/api/zones/{id}/prediction` | 20-minute forecast for a zone |
//! | `GET` | `/api/agents` | All agents keyed by name |
//! | `POST` | `/api/command` | Interpret a free-text command |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use drishti_types::{ThreatLevel, ZoneId};
use serde::Deserialize;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /api/command`.
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    /// Free-text command from the operator.
    pub command: String,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing live counts and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    let zones = state.zones.get_all()?;
    let zone_count = zones.len();
    let critical_count = zones
        .values()
        .filter(|zone| zone.threat_level == ThreatLevel::Critical)
        .count();
    let total_people: u64 = zones.values().map(|zone| u64::from(zone.people_count)).sum();
    let agent_count = state.agents.len();
    let subscribers = state.broadcaster.subscriber_count();
    let service = &state.service_name;

    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Drishti Backend</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        .metric .value.alert {{ color: #f85149; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .status {{ color: #3fb950; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Drishti</h1>
    <p class="subtitle">{service} -- live crowd monitoring</p>

    <p>Status: <span class="status">HEALTHY</span></p>

    <div>
        <div class="metric">
            <div class="label">Zones</div>
            <div class="value">{zone_count}</div>
        </div>
        <div class="metric">
            <div class="label">Critical</div>
            <div class="value alert">{critical_count}</div>
        </div>
        <div class="metric">
            <div class="label">People</div>
            <div class="value">{total_people}</div>
        </div>
        <div class="metric">
            <div class="label">Agents</div>
            <div class="value">{agent_count}</div>
        </div>
        <div class="metric">
            <div class="label">Live clients</div>
            <div class="value">{subscribers}</div>
        </div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li>GET <a href="/api/health">/api/health</a> -- Liveness check</li>
        <li>GET <a href="/api/zones">/api/zones</a> -- All zones</li>
        <li>GET <a href="/api/zones/A1">/api/zones/{{id}}</a> -- Single zone</li>
        <li>GET <a href="/api/zones/A1/prediction">/api/zones/{{id}}/prediction</a> -- 20-minute forecast</li>
        <li>GET <a href="/api/agents">/api/agents</a> -- Monitoring agents</li>
        <li>POST /api/command -- <code>{{"command": "Move team to B1"}}</code></li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li><code>ws://host:port/ws</code> -- zones_update, agents_status, command_processed, prediction_response</li>
    </ul>
</body>
</html>"#
    )))
}

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

/// Report liveness, service name, and the number of registered agents.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": state.service_name,
        "agents": state.agents.len(),
    }))
}

// ---------------------------------------------------------------------------
// GET /api/zones, GET /api/zones/{id}
// ---------------------------------------------------------------------------

/// Return every zone keyed by id.
pub async fn list_zones(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    Ok(Json(state.zones.get_all()?))
}

/// Return one zone. Ids are case-insensitive (`a1` is `A1`).
pub async fn get_zone(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = parse_zone_id(&raw)?;
    Ok(Json(state.zones.get(&id)?))
}

// ---------------------------------------------------------------------------
// GET /api/zones/{id}/prediction
// ---------------------------------------------------------------------------

/// Return a fresh forecast for one zone.
pub async fn zone_prediction(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = parse_zone_id(&raw)?;
    Ok(Json(state.forecast(&id)?))
}

// ---------------------------------------------------------------------------
// GET /api/agents
// ---------------------------------------------------------------------------

/// Return every agent keyed by name.
pub async fn list_agents(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    Ok(Json(state.agents.get_all()?))
}

// ---------------------------------------------------------------------------
// POST /api/command
// ---------------------------------------------------------------------------

/// Interpret a command, broadcast the result, and return it.
///
/// A body that is not JSON, or lacks a string `command`, is rejected with
/// 400 before anything is interpreted or broadcast.
pub async fn process_command(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CommandRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Json(request) = payload.map_err(|e| ObserverError::InvalidInput(e.body_text()))?;
    Ok(Json(state.run_command(&request.command)?))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// An id that does not parse cannot name a zone, so it is reported the
/// same way as an unknown one.
fn parse_zone_id(raw: &str) -> Result<ZoneId, ObserverError> {
    ZoneId::parse(raw).map_err(|_invalid| ObserverError::NotFound(format!("Zone not found: {raw}")))
}
