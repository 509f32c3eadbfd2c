//! Registry of monitoring agents.
//!
//! Names and statuses are fixed at startup; only `last_update` moves, and
//! only when the mutation cycle touches it.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use drishti_types::{AgentMap, AgentRecord};
use tracing::warn;

use crate::config::AgentSeed;
use crate::error::StoreError;

/// Thread-safe map of agent name to liveness record.
#[derive(Debug)]
pub struct AgentRegistry {
    agents: BTreeMap<String, RwLock<AgentRecord>>,
}

impl AgentRegistry {
    /// Register the configured agents. None has been touched yet.
    pub fn new(seeds: &[AgentSeed]) -> Self {
        let agents = seeds
            .iter()
            .map(|seed| {
                let record = AgentRecord {
                    status: seed.status,
                    last_update: None,
                };
                (seed.name.clone(), RwLock::new(record))
            })
            .collect();
        Self { agents }
    }

    /// Copy of one agent's record.
    pub fn get(&self, name: &str) -> Result<AgentRecord, StoreError> {
        let cell = self
            .agents
            .get(name)
            .ok_or_else(|| StoreError::AgentNotFound(name.to_owned()))?;
        let record = cell
            .read()
            .map_err(|_poisoned| StoreError::Poisoned(name.to_owned()))?;
        Ok(record.clone())
    }

    /// Copy of every record, keyed by name.
    pub fn get_all(&self) -> Result<AgentMap, StoreError> {
        self.agents
            .iter()
            .map(|(name, cell)| {
                let record = cell
                    .read()
                    .map_err(|_poisoned| StoreError::Poisoned(name.clone()))?;
                Ok((name.clone(), record.clone()))
            })
            .collect()
    }

    /// Stamp an agent's `last_update`. Status is left alone.
    pub fn touch(&self, name: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        let cell = self
            .agents
            .get(name)
            .ok_or_else(|| StoreError::AgentNotFound(name.to_owned()))?;
        let mut record = cell
            .write()
            .map_err(|_poisoned| StoreError::Poisoned(name.to_owned()))?;
        record.last_update = Some(at);
        Ok(())
    }

    /// Stamp every agent. An agent that cannot be written is logged and
    /// skipped; returns how many were stamped.
    pub fn touch_all(&self, at: DateTime<Utc>) -> usize {
        let mut touched: usize = 0;
        for name in self.agents.keys() {
            match self.touch(name, at) {
                Ok(()) => touched = touched.saturating_add(1),
                Err(e) => warn!(agent = %name, error = %e, "Agent heartbeat skipped"),
            }
        }
        touched
    }

    /// Number of registered agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether no agents are registered.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
