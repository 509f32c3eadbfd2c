//! Zone, agent, and forecast records.
//!
//! Field names follow the JSON the dashboard consumes (`zone_id`,
//! `people_count`, `timestamp`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AgentStatus, RiskLevel, ThreatLevel};
use crate::ids::ZoneId;

// ---------------------------------------------------------------------------
// Zone
// ---------------------------------------------------------------------------

/// Live state of one grid cell.
///
/// `threat_level` is derived from `people_count` and is recomputed in the
/// same write that changes the count, so the two never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Zone {
    /// Grid cell identifier.
    #[serde(rename = "zone_id")]
    pub id: ZoneId,
    /// Number of people currently detected in the zone.
    pub people_count: u32,
    /// Risk category derived from `people_count`.
    pub threat_level: ThreatLevel,
    /// Detection confidence in `[0, 1]`, two decimals.
    pub confidence: f64,
    /// When the zone was last written.
    #[serde(rename = "timestamp")]
    pub last_updated: DateTime<Utc>,
    /// Short-horizon occupancy projections.
    pub predictions: ShortHorizon,
    /// Free-text agent observations captured when the zone was created.
    pub agent_reports: AgentReports,
}

/// Projected people counts 15 and 20 minutes ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ShortHorizon {
    /// Projection 15 minutes out.
    #[serde(rename = "15_min")]
    pub in_15_min: u32,
    /// Projection 20 minutes out.
    #[serde(rename = "20_min")]
    pub in_20_min: u32,
}

/// Observations attached to a zone by the camera and analytics agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentReports {
    /// Camera surveillance summary.
    pub camera: String,
    /// Crowd analytics flow summary.
    pub analytics: String,
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// Liveness record of a monitoring agent. The agent name is the map key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentRecord {
    /// Configured operational status. Never changed at runtime.
    pub status: AgentStatus,
    /// Last update cycle that touched this agent, if any.
    pub last_update: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

/// One minute of a zone forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ForecastPoint {
    /// Minutes from now.
    pub time_offset: u32,
    /// Forecast people count, never negative.
    pub predicted_count: u32,
    /// Confidence, decreasing with the offset and floored at 0.6.
    pub confidence: f64,
}

/// Minute-by-minute occupancy forecast for a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ZoneForecast {
    /// Zone the forecast is for.
    pub zone_id: ZoneId,
    /// People count the forecast started from.
    pub current_count: u32,
    /// One entry per future minute.
    pub predictions: Vec<ForecastPoint>,
    /// Risk rating of the current count.
    pub risk_assessment: RiskLevel,
    /// Operator recommendation.
    pub recommendation: String,
    /// When the forecast was produced.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn zone_uses_dashboard_field_names() {
        let zone = Zone {
            id: ZoneId::parse("A1").unwrap(),
            people_count: 30,
            threat_level: ThreatLevel::Medium,
            confidence: 0.91,
            last_updated: Utc::now(),
            predictions: ShortHorizon {
                in_15_min: 40,
                in_20_min: 45,
            },
            agent_reports: AgentReports {
                camera: String::from("Zone A1 monitored - 30 people detected"),
                analytics: String::from("Flow prediction: stable"),
            },
        };

        let json = serde_json::to_value(&zone).unwrap();
        assert_eq!(json["zone_id"], "A1");
        assert_eq!(json["threat_level"], "medium");
        assert_eq!(json["predictions"]["15_min"], 40);
        assert_eq!(json["predictions"]["20_min"], 45);
        assert!(json["timestamp"].is_string());
        assert!(json.get("last_updated").is_none());
    }

    #[test]
    fn untouched_agent_has_null_last_update() {
        let record = AgentRecord {
            status: AgentStatus::Active,
            last_update: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "active");
        assert!(json["last_update"].is_null());
    }
}
