//! `WebSocket` handler for the live event feed.
//!
//! Clients connect to `GET /ws` and receive JSON frames shaped
//! `{"event": name, "data": payload}`: a `zones_update` and an
//! `agents_status` snapshot on connect, the same pair after every mutation
//! cycle, and `command_processed` whenever any client issues a command.
//!
//! Clients may send `{"event": "request_prediction", "data": {"zone_id": "B3"}}`;
//! the `prediction_response` goes to that socket only. Every session reads
//! from its own [`Subscription`](drishti_core::Subscription), so a slow
//! client only drops its own oldest events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use drishti_types::{ClientMessage, LiveEvent, ZoneId};
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming live events.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_live(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Answer one inbound text frame.
///
/// Returns the event to send back to the same client, if any. Frames that
/// do not parse, and predictions for zones that do not exist, get no reply.
pub fn handle_client_message(state: &AppState, text: &str) -> Option<LiveEvent> {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            debug!(error = %e, "Ignoring malformed client frame");
            return None;
        }
    };

    match message {
        ClientMessage::RequestPrediction(request) => {
            let forecast = ZoneId::parse(&request.zone_id)
                .map_err(|e| e.to_string())
                .and_then(|id| state.forecast(&id).map_err(|e| e.to_string()));
            match forecast {
                Ok(forecast) => Some(LiveEvent::PredictionResponse(forecast)),
                Err(reason) => {
                    debug!(zone = %request.zone_id, reason = %reason, "Prediction request dropped");
                    None
                }
            }
        }
    }
}

/// Handle the `WebSocket` lifecycle: subscribe, forward every event as a
/// text frame, and answer client requests.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut subscription = match state.subscribe() {
        Ok(subscription) => subscription,
        Err(e) => {
            warn!(error = %e, "Could not snapshot state for new WebSocket client");
            return;
        }
    };
    debug!(
        clients = state.broadcaster.subscriber_count(),
        "WebSocket client connected"
    );

    loop {
        tokio::select! {
            // Next event from the broadcaster.
            event = subscription.recv() => {
                let Some(event) = event else {
                    debug!("Broadcaster closed, shutting down WebSocket");
                    return;
                };
                if send_event(&mut socket, &event).await.is_err() {
                    debug!("WebSocket client disconnected (send failed)");
                    return;
                }
            }
            // Inbound frame, close, or disconnect.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Text(text))) => {
                        let Some(reply) = handle_client_message(&state, text.as_str()) else {
                            continue;
                        };
                        if send_event(&mut socket, &reply).await.is_err() {
                            debug!("WebSocket client disconnected (reply failed)");
                            return;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    _ => {
                        // Binary and pong frames are ignored.
                    }
                }
            }
        }
    }
}

/// Serialize one event and send it. A serialization failure is logged and
/// skipped; only a dead socket is an error.
async fn send_event(socket: &mut WebSocket, event: &LiveEvent) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            warn!(event = event.name(), "Failed to serialize live event: {e}");
            return Ok(());
        }
    };
    socket.send(Message::Text(json.into())).await
}
