//! Results of free-text operator commands.
//!
//! Serialized with a `type` discriminator (`movement_command`,
//! `status_report`, `general_response`) so the dashboard can switch on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::ZoneId;

/// Structured interpretation of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum CommandResult {
    /// Dispatch a team to a zone.
    MovementCommand(MovementCommand),
    /// Summary of current crowd state.
    StatusReport(StatusReport),
    /// Anything not recognised; carries the help text.
    GeneralResponse(GeneralResponse),
}

impl CommandResult {
    /// The command text as received.
    pub fn original_command(&self) -> &str {
        match self {
            Self::MovementCommand(c) => &c.original_command,
            Self::StatusReport(c) => &c.original_command,
            Self::GeneralResponse(c) => &c.original_command,
        }
    }

    /// Human-readable reply.
    pub fn agent_response(&self) -> &str {
        match self {
            Self::MovementCommand(c) => &c.agent_response,
            Self::StatusReport(c) => &c.agent_response,
            Self::GeneralResponse(c) => &c.agent_response,
        }
    }

    /// When the command was interpreted.
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::MovementCommand(c) => c.timestamp,
            Self::StatusReport(c) => c.timestamp,
            Self::GeneralResponse(c) => c.timestamp,
        }
    }
}

/// A team movement order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MovementCommand {
    /// The command text as received.
    pub original_command: String,
    /// Always `move_team`.
    pub parsed_action: String,
    /// Destination zone.
    pub target_zone: ZoneId,
    /// Team being moved.
    pub team: String,
    /// Estimated minutes until arrival.
    pub eta_minutes: u32,
    /// Confirmation text.
    pub agent_response: String,
    /// When the command was interpreted.
    pub timestamp: DateTime<Utc>,
}

/// Crowd status summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatusReport {
    /// The command text as received.
    pub original_command: String,
    /// Up to three critical zones, in zone id order.
    pub critical_zones: Vec<ZoneId>,
    /// Sum of people across all zones.
    #[ts(type = "number")]
    pub total_people: u64,
    /// Summary text.
    pub agent_response: String,
    /// When the command was interpreted.
    pub timestamp: DateTime<Utc>,
}

/// Fallback reply listing the supported commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GeneralResponse {
    /// The command text as received.
    pub original_command: String,
    /// Help text.
    pub agent_response: String,
    /// When the command was interpreted.
    pub timestamp: DateTime<Utc>,
}
