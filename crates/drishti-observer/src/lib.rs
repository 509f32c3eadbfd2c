//! HTTP API and live `WebSocket` feed for the Drishti backend.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **REST endpoints** for zones, agents, health, per-zone forecasts, and
//!   free-text commands
//! - **`WebSocket` endpoint** (`/ws`) streaming `zones_update`,
//!   `agents_status`, and `command_processed` events, and answering
//!   `request_prediction`
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! Handlers read copies from the stores in `drishti-core`, which lock one
//! zone or agent at a time, so a request never waits on a whole mutation
//! cycle. `WebSocket` sessions each own a
//! [`Subscription`](drishti_core::Subscription) with its own buffer.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ObserverError;
pub use router::build_router;
pub use server::ServerError;
pub use startup::{RunningServer, StartupError, spawn_observer};
pub use state::AppState;
