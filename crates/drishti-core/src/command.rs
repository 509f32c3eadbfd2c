//! Free-text command interpretation.
//!
//! Matching is keyword based and case-insensitive, checked in priority
//! order: movement (`move` and `to`), then `status`, then a help reply.
//! Keywords are plain substrings, so `to` also matches inside `tomorrow`.

use chrono::Utc;
use drishti_types::{
    CommandResult, GeneralResponse, MovementCommand, StatusReport, ThreatLevel, ZoneId,
};
use rand::Rng;

use crate::config::{CommandConfig, ConfigError};
use crate::error::StoreError;
use crate::random::uint_between;
use crate::zones::ZoneStore;

/// Reply for commands that match no keyword.
pub const HELP_TEXT: &str = "Command received. Available commands: 'Move team to [zone]', 'Status report', 'Emergency evacuation'.";

/// Action tag carried by movement results.
const MOVE_ACTION: &str = "move_team";

/// Critical zones listed in a status report.
const MAX_LISTED_CRITICAL: usize = 3;

/// Maps operator text to a [`CommandResult`].
#[derive(Debug, Clone)]
pub struct CommandInterpreter {
    /// Candidate zones with their lowercase match needle, in priority order.
    candidates: Vec<(String, ZoneId)>,
    fallback: ZoneId,
    team: String,
    eta_min: u32,
    eta_max: u32,
}

impl CommandInterpreter {
    /// Build from the `command` config section.
    pub fn from_config(config: &CommandConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.candidate_ids()?,
            config.fallback_id()?,
            config.team.clone(),
            config.eta_min,
            config.eta_max,
        ))
    }

    /// Build from parsed parts. `candidates` order decides ties.
    pub fn new(
        candidates: Vec<ZoneId>,
        fallback: ZoneId,
        team: String,
        eta_min: u32,
        eta_max: u32,
    ) -> Self {
        let candidates = candidates
            .into_iter()
            .map(|id| (id.as_str().to_ascii_lowercase(), id))
            .collect();
        Self {
            candidates,
            fallback,
            team,
            eta_min,
            eta_max,
        }
    }

    /// Interpret one command against the current zone state.
    ///
    /// Only a status report reads the store, so only it can fail.
    pub fn interpret<R: Rng + ?Sized>(
        &self,
        text: &str,
        zones: &ZoneStore,
        rng: &mut R,
    ) -> Result<CommandResult, StoreError> {
        let lowered = text.to_lowercase();

        if lowered.contains("move") && lowered.contains("to") {
            return Ok(CommandResult::MovementCommand(self.movement(text, &lowered, rng)));
        }
        if lowered.contains("status") {
            return Ok(CommandResult::StatusReport(status_report(text, zones)?));
        }
        Ok(CommandResult::GeneralResponse(GeneralResponse {
            original_command: text.to_owned(),
            agent_response: HELP_TEXT.to_owned(),
            timestamp: Utc::now(),
        }))
    }

    fn movement<R: Rng + ?Sized>(&self, text: &str, lowered: &str, rng: &mut R) -> MovementCommand {
        let target_zone = self
            .candidates
            .iter()
            .find(|(needle, _)| lowered.contains(needle.as_str()))
            .map_or_else(|| self.fallback.clone(), |(_, id)| id.clone());
        let eta_minutes = uint_between(rng, self.eta_min, self.eta_max);

        MovementCommand {
            original_command: text.to_owned(),
            parsed_action: MOVE_ACTION.to_owned(),
            agent_response: format!(
                "Command confirmed: Moving {} team to zone {target_zone}. ETA {eta_minutes} minutes.",
                self.team
            ),
            target_zone,
            team: self.team.clone(),
            eta_minutes,
            timestamp: Utc::now(),
        }
    }
}

fn status_report(text: &str, zones: &ZoneStore) -> Result<StatusReport, StoreError> {
    let snapshot = zones.get_all()?;

    let critical: Vec<ZoneId> = snapshot
        .values()
        .filter(|zone| zone.threat_level == ThreatLevel::Critical)
        .map(|zone| zone.id.clone())
        .collect();
    let total_people: u64 = snapshot
        .values()
        .map(|zone| u64::from(zone.people_count))
        .sum();

    Ok(StatusReport {
        original_command: text.to_owned(),
        agent_response: format!(
            "Status report: {} critical zones detected. Total crowd: {total_people} people.",
            critical.len()
        ),
        critical_zones: critical.into_iter().take(MAX_LISTED_CRITICAL).collect(),
        total_people,
        timestamp: Utc::now(),
    })
}
