//! Push-channel messages.
//!
//! Both directions use the same envelope, `{"event": <name>, "data": <payload>}`,
//! with snake_case event names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::command::CommandResult;
use crate::ids::ZoneId;
use crate::structs::{AgentRecord, Zone, ZoneForecast};

/// Zone snapshot keyed by id, in id order.
pub type ZoneMap = BTreeMap<ZoneId, Zone>;

/// Agent snapshot keyed by agent name.
pub type AgentMap = BTreeMap<String, AgentRecord>;

/// A message pushed from the server to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LiveEvent {
    /// Full zone snapshot.
    ZonesUpdate(ZoneMap),
    /// Full agent snapshot.
    AgentsStatus(AgentMap),
    /// A command was interpreted through the HTTP API.
    CommandProcessed(CommandResult),
    /// Reply to a [`ClientMessage::RequestPrediction`], sent to the requester only.
    PredictionResponse(ZoneForecast),
}

impl LiveEvent {
    /// Wire name of the event.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ZonesUpdate(_) => "zones_update",
            Self::AgentsStatus(_) => "agents_status",
            Self::CommandProcessed(_) => "command_processed",
            Self::PredictionResponse(_) => "prediction_response",
        }
    }
}

/// A message sent by a subscriber to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ClientMessage {
    /// Ask for a forecast of one zone.
    RequestPrediction(PredictionRequest),
}

/// Payload of [`ClientMessage::RequestPrediction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PredictionRequest {
    /// Zone to forecast, in any case.
    pub zone_id: String,
}
