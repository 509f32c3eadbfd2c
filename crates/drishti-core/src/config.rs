//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `drishti-config.yaml`. Every field
//! has a default, so an empty (or absent) file yields the stock 8x8 grid,
//! six agents, and a five-second update cycle.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use drishti_types::{AgentStatus, MAX_GRID_ROWS, ZoneId};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but violates a constraint.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level backend configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DrishtiConfig {
    /// Grid dimensions.
    #[serde(default)]
    pub grid: GridConfig,

    /// Zone value ranges.
    #[serde(default)]
    pub zones: ZoneConfig,

    /// Background update cycle.
    #[serde(default)]
    pub mutator: MutatorConfig,

    /// Monitoring agents, in registration order.
    #[serde(default = "default_agents")]
    pub agents: Vec<AgentSeed>,

    /// Command interpretation.
    #[serde(default)]
    pub command: CommandConfig,

    /// Zone forecasts.
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Push channel.
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// HTTP server.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for DrishtiConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            zones: ZoneConfig::default(),
            mutator: MutatorConfig::default(),
            agents: default_agents(),
            command: CommandConfig::default(),
            forecast: ForecastConfig::default(),
            broadcast: BroadcastConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DrishtiConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `DRISHTI_HOST` and `DRISHTI_PORT` override the server section.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml maps an empty document to unit, not to an empty map.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.server.apply_env_overrides()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        self.zones.validate()?;
        self.mutator.validate()?;
        self.command.validate()?;

        let mut seen = BTreeSet::new();
        for agent in &self.agents {
            if agent.name.trim().is_empty() {
                return Err(ConfigError::Invalid("agent name must not be empty".to_owned()));
            }
            if !seen.insert(agent.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate agent name: {}",
                    agent.name
                )));
            }
        }

        if self.broadcast.capacity == 0 {
            return Err(ConfigError::Invalid(
                "broadcast.capacity must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Grid dimensions. Rows are lettered from `A`, columns numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
    /// Number of rows (1 to 26).
    #[serde(default = "default_grid_rows")]
    pub rows: u8,

    /// Number of columns per row.
    #[serde(default = "default_grid_columns")]
    pub columns: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: default_grid_rows(),
            columns: default_grid_columns(),
        }
    }
}

impl GridConfig {
    /// Every zone id on the grid, row-major.
    pub fn zone_ids(&self) -> Vec<ZoneId> {
        (0..self.rows)
            .flat_map(|row| (1..=self.columns).filter_map(move |col| ZoneId::from_grid(row, col)))
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(ConfigError::Invalid(
                "grid must have at least one row and one column".to_owned(),
            ));
        }
        if self.rows > MAX_GRID_ROWS {
            return Err(ConfigError::Invalid(format!(
                "grid.rows is {} but at most {MAX_GRID_ROWS} rows can be lettered",
                self.rows
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// Half-open range `[low, high)` a confidence value is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ConfidenceBand {
    /// Inclusive lower bound.
    pub low: f64,
    /// Exclusive upper bound.
    pub high: f64,
}

impl ConfidenceBand {
    fn validate(self, field: &str) -> Result<(), ConfigError> {
        let in_unit = (0.0..=1.0).contains(&self.low) && (0.0..=1.0).contains(&self.high);
        if !in_unit || self.low >= self.high {
            return Err(ConfigError::Invalid(format!(
                "{field} must satisfy 0 <= low < high <= 1 (got {} .. {})",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

/// Value ranges for zone state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ZoneConfig {
    /// Upper bound on a zone's people count.
    #[serde(default = "default_people_cap")]
    pub people_cap: u32,

    /// Initial people counts are drawn from `[0, initial_people_max]`.
    #[serde(default = "default_initial_people_max")]
    pub initial_people_max: u32,

    /// Confidence band used when a zone is created.
    #[serde(default = "default_initial_confidence")]
    pub initial_confidence: ConfidenceBand,

    /// Confidence band used on every update.
    #[serde(default = "default_update_confidence")]
    pub update_confidence: ConfidenceBand,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            people_cap: default_people_cap(),
            initial_people_max: default_initial_people_max(),
            initial_confidence: default_initial_confidence(),
            update_confidence: default_update_confidence(),
        }
    }
}

impl ZoneConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.initial_confidence.validate("zones.initial_confidence")?;
        self.update_confidence.validate("zones.update_confidence")
    }
}

// ---------------------------------------------------------------------------
// Mutator
// ---------------------------------------------------------------------------

/// Background update cycle settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MutatorConfig {
    /// Milliseconds between cycles.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Fewest zones updated per cycle.
    #[serde(default = "default_min_zones")]
    pub min_zones: usize,

    /// Most zones updated per cycle.
    #[serde(default = "default_max_zones")]
    pub max_zones: usize,

    /// Smallest people-count change per update.
    #[serde(default = "default_delta_min")]
    pub delta_min: i32,

    /// Largest people-count change per update.
    #[serde(default = "default_delta_max")]
    pub delta_max: i32,

    /// Seed for reproducible runs. Drawn from the OS when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for MutatorConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            min_zones: default_min_zones(),
            max_zones: default_max_zones(),
            delta_min: default_delta_min(),
            delta_max: default_delta_max(),
            seed: None,
        }
    }
}

impl MutatorConfig {
    /// Cycle interval as a [`Duration`].
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_zones > self.max_zones {
            return Err(ConfigError::Invalid(format!(
                "mutator.min_zones ({}) exceeds mutator.max_zones ({})",
                self.min_zones, self.max_zones
            )));
        }
        if self.delta_min > self.delta_max {
            return Err(ConfigError::Invalid(format!(
                "mutator.delta_min ({}) exceeds mutator.delta_max ({})",
                self.delta_min, self.delta_max
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// A monitoring agent registered at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentSeed {
    /// Unique agent name.
    pub name: String,
    /// Fixed operational status.
    pub status: AgentStatus,
}

impl AgentSeed {
    fn new(name: &str, status: AgentStatus) -> Self {
        Self {
            name: name.to_owned(),
            status,
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Command interpretation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandConfig {
    /// Zone tokens looked for in movement commands. First match in this
    /// order wins.
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,

    /// Target used when a movement command names no candidate.
    #[serde(default = "default_fallback_zone")]
    pub fallback_zone: String,

    /// Team dispatched by movement commands.
    #[serde(default = "default_team")]
    pub team: String,

    /// Shortest ETA in minutes.
    #[serde(default = "default_eta_min")]
    pub eta_min: u32,

    /// Longest ETA in minutes.
    #[serde(default = "default_eta_max")]
    pub eta_max: u32,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
            fallback_zone: default_fallback_zone(),
            team: default_team(),
            eta_min: default_eta_min(),
            eta_max: default_eta_max(),
        }
    }
}

impl CommandConfig {
    /// Parsed candidate zone ids, in configured order.
    pub fn candidate_ids(&self) -> Result<Vec<ZoneId>, ConfigError> {
        self.candidates
            .iter()
            .map(|raw| {
                ZoneId::parse(raw).map_err(|e| {
                    ConfigError::Invalid(format!("command.candidates entry {raw:?}: {e}"))
                })
            })
            .collect()
    }

    /// Parsed fallback zone id.
    pub fn fallback_id(&self) -> Result<ZoneId, ConfigError> {
        ZoneId::parse(&self.fallback_zone).map_err(|e| {
            ConfigError::Invalid(format!(
                "command.fallback_zone {:?}: {e}",
                self.fallback_zone
            ))
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.candidate_ids()?;
        self.fallback_id()?;
        if self.eta_min > self.eta_max {
            return Err(ConfigError::Invalid(format!(
                "command.eta_min ({}) exceeds command.eta_max ({})",
                self.eta_min, self.eta_max
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Forecast / broadcast / server / logging
// ---------------------------------------------------------------------------

/// Zone forecast settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForecastConfig {
    /// Number of one-minute steps in a forecast.
    #[serde(default = "default_horizon_minutes")]
    pub horizon_minutes: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_minutes: default_horizon_minutes(),
        }
    }
}

/// Push channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BroadcastConfig {
    /// Events buffered per subscriber before the oldest are dropped.
    #[serde(default = "default_broadcast_capacity")]
    pub capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            capacity: default_broadcast_capacity(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Name reported by the health endpoint.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            service_name: default_service_name(),
        }
    }
}

impl ServerConfig {
    /// Override host and port with `DRISHTI_HOST` / `DRISHTI_PORT` when set.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("DRISHTI_HOST") {
            self.host = val;
        }
        if let Ok(val) = std::env::var("DRISHTI_PORT") {
            self.port = val
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("invalid DRISHTI_PORT {val:?}: {e}")))?;
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_grid_rows() -> u8 {
    8
}
const fn default_grid_columns() -> u32 {
    8
}
const fn default_people_cap() -> u32 {
    150
}
const fn default_initial_people_max() -> u32 {
    100
}
const fn default_initial_confidence() -> ConfidenceBand {
    ConfidenceBand {
        low: 0.80,
        high: 0.98,
    }
}
const fn default_update_confidence() -> ConfidenceBand {
    ConfidenceBand {
        low: 0.85,
        high: 0.98,
    }
}
const fn default_interval_ms() -> u64 {
    5000
}
const fn default_min_zones() -> usize {
    3
}
const fn default_max_zones() -> usize {
    5
}
const fn default_delta_min() -> i32 {
    -10
}
const fn default_delta_max() -> i32 {
    15
}
fn default_agents() -> Vec<AgentSeed> {
    vec![
        AgentSeed::new("camera_surveillance", AgentStatus::Active),
        AgentSeed::new("crowd_analytics", AgentStatus::Active),
        AgentSeed::new("command_coordination", AgentStatus::Active),
        AgentSeed::new("emergency_response", AgentStatus::Standby),
        AgentSeed::new("missing_person", AgentStatus::Standby),
        AgentSeed::new("drone_control", AgentStatus::Active),
    ]
}
fn default_candidates() -> Vec<String> {
    ["a1", "a2", "b1", "c6", "d4", "e4", "f6", "g2", "h8"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_fallback_zone() -> String {
    String::from("C6")
}
fn default_team() -> String {
    String::from("Alpha")
}
const fn default_eta_min() -> u32 {
    2
}
const fn default_eta_max() -> u32 {
    8
}
const fn default_horizon_minutes() -> u32 {
    20
}
const fn default_broadcast_capacity() -> usize {
    256
}
fn default_host() -> String {
    String::from("0.0.0.0")
}
const fn default_port() -> u16 {
    4000
}
fn default_service_name() -> String {
    String::from("drishti-backend")
}
fn default_log_level() -> String {
    String::from("info")
}
