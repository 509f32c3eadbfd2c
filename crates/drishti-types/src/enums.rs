//! Enumeration types for zone and agent state.

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Threat level
// ---------------------------------------------------------------------------

/// Occupancy-derived risk category of a zone.
///
/// Always a pure function of the zone's people count; see
/// [`ThreatLevel::from_people_count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ThreatLevel {
    /// Fewer than 25 people.
    Low,
    /// 25 to 49 people.
    Medium,
    /// 50 to 74 people.
    High,
    /// 75 people or more.
    Critical,
}

impl ThreatLevel {
    /// Classify a people count.
    pub const fn from_people_count(people_count: u32) -> Self {
        match people_count {
            0..25 => Self::Low,
            25..50 => Self::Medium,
            50..75 => Self::High,
            _ => Self::Critical,
        }
    }
}

// ---------------------------------------------------------------------------
// Forecast risk
// ---------------------------------------------------------------------------

/// Coarse risk rating attached to a zone forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum RiskLevel {
    /// 40 people or fewer.
    Low,
    /// 41 to 70 people.
    Medium,
    /// More than 70 people.
    High,
}

impl RiskLevel {
    /// Rate the current people count of a zone.
    pub const fn from_people_count(people_count: u32) -> Self {
        if people_count > 70 {
            Self::High
        } else if people_count > 40 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// Operational status of a monitoring agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AgentStatus {
    /// Running and reporting.
    Active,
    /// Idle until needed.
    Standby,
}

// ---------------------------------------------------------------------------
// Crowd flow
// ---------------------------------------------------------------------------

/// Flow direction reported by the analytics agent for a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum FlowTrend {
    /// Occupancy roughly constant.
    Stable,
    /// Occupancy rising.
    Increasing,
    /// Occupancy falling.
    Decreasing,
}

impl FlowTrend {
    /// Every trend, in a fixed order.
    pub const ALL: [Self; 3] = [Self::Stable, Self::Increasing, Self::Decreasing];
}

impl fmt::Display for FlowTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stable => "stable",
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threat_thresholds() {
        assert_eq!(ThreatLevel::from_people_count(0), ThreatLevel::Low);
        assert_eq!(ThreatLevel::from_people_count(24), ThreatLevel::Low);
        assert_eq!(ThreatLevel::from_people_count(25), ThreatLevel::Medium);
        assert_eq!(ThreatLevel::from_people_count(49), ThreatLevel::Medium);
        assert_eq!(ThreatLevel::from_people_count(50), ThreatLevel::High);
        assert_eq!(ThreatLevel::from_people_count(74), ThreatLevel::High);
        assert_eq!(ThreatLevel::from_people_count(75), ThreatLevel::Critical);
        assert_eq!(ThreatLevel::from_people_count(150), ThreatLevel::Critical);
    }

    #[test]
    fn risk_thresholds() {
        assert_eq!(RiskLevel::from_people_count(40), RiskLevel::Low);
        assert_eq!(RiskLevel::from_people_count(41), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_people_count(70), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_people_count(71), RiskLevel::High);
    }

    #[test]
    fn wire_names_are_lowercase() {
        assert_eq!(
            serde_json::to_string(&ThreatLevel::Critical).ok().as_deref(),
            Some("\"critical\"")
        );
        assert_eq!(
            serde_json::to_string(&AgentStatus::Standby).ok().as_deref(),
            Some("\"standby\"")
        );
        assert_eq!(FlowTrend::Increasing.to_string(), "increasing");
    }
}
