//! Shared type definitions for the Drishti live-state backend.
//!
//! This crate is the single source of truth for every type that crosses a
//! crate or wire boundary. Types flow downstream to `TypeScript` via
//! `ts-rs` for the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Validated grid-cell identifiers
//! - [`enums`] -- Threat levels, agent statuses, flow trends
//! - [`structs`] -- Zone, agent, and forecast records
//! - [`command`] -- Command interpretation results
//! - [`events`] -- Push-channel envelopes in both directions

pub mod command;
pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use command::{CommandResult, GeneralResponse, MovementCommand, StatusReport};
pub use enums::{AgentStatus, FlowTrend, RiskLevel, ThreatLevel};
pub use events::{AgentMap, ClientMessage, LiveEvent, PredictionRequest, ZoneMap};
pub use ids::{MAX_GRID_ROWS, ZoneId, ZoneIdError};
pub use structs::{AgentRecord, AgentReports, ForecastPoint, ShortHorizon, Zone, ZoneForecast};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::ZoneId::export_all();
        let _ = crate::enums::ThreatLevel::export_all();
        let _ = crate::enums::RiskLevel::export_all();
        let _ = crate::enums::AgentStatus::export_all();
        let _ = crate::structs::Zone::export_all();
        let _ = crate::structs::AgentRecord::export_all();
        let _ = crate::structs::ZoneForecast::export_all();
        let _ = crate::command::CommandResult::export_all();
        let _ = crate::events::LiveEvent::export_all();
        let _ = crate::events::ClientMessage::export_all();
    }
}
