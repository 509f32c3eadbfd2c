//! Shared application state for the HTTP and `WebSocket` handlers.
//!
//! [`AppState`] owns handles to the live stores plus the components that
//! act on them. Handlers never hold a store lock across an `.await`; every
//! read is a copy taken under a per-entity lock inside `drishti-core`.

use std::sync::{Arc, Mutex, PoisonError};

use drishti_core::random::fork_rng;
use drishti_core::{
    AgentRegistry, Broadcaster, CommandInterpreter, ConfigError, DrishtiConfig, Forecaster,
    StoreError, Subscription, ZoneStore,
};
use drishti_types::{CommandResult, LiveEvent, ZoneForecast, ZoneId};
use rand::Rng;
use rand::rngs::StdRng;
use tracing::debug;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
pub struct AppState {
    /// Live zone state.
    pub zones: Arc<ZoneStore>,
    /// Monitoring agents.
    pub agents: Arc<AgentRegistry>,
    /// Fan-out to `WebSocket` sessions.
    pub broadcaster: Broadcaster,
    /// Free-text command interpreter.
    pub interpreter: CommandInterpreter,
    /// Per-zone forecaster.
    pub forecaster: Forecaster,
    /// Name reported by the health endpoint.
    pub service_name: String,
    /// Randomness for command ETAs and forecasts.
    rng: Mutex<StdRng>,
}

impl AppState {
    /// Build every store and component from configuration.
    ///
    /// Zones are populated from `rng`; handlers get their own generator
    /// forked from it.
    pub fn from_config<R: Rng + ?Sized>(
        config: &DrishtiConfig,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let zones = Arc::new(ZoneStore::initialize(
            config.grid.zone_ids(),
            config.zones.clone(),
            rng,
        ));
        let agents = Arc::new(AgentRegistry::new(&config.agents));
        let broadcaster = Broadcaster::new(
            Arc::clone(&zones),
            Arc::clone(&agents),
            config.broadcast.capacity,
        );

        Ok(Self {
            interpreter: CommandInterpreter::from_config(&config.command)?,
            forecaster: Forecaster::from_config(&config.forecast),
            service_name: config.server.service_name.clone(),
            rng: Mutex::new(fork_rng(rng)),
            zones,
            agents,
            broadcaster,
        })
    }

    /// Subscribe to the live feed, starting with current snapshots.
    pub fn subscribe(&self) -> Result<Subscription, StoreError> {
        self.broadcaster.subscribe()
    }

    /// Publish an event to all connected clients.
    ///
    /// Returns the number of receivers that received the message.
    /// Returns 0 if no clients are connected (this is not an error).
    pub fn broadcast(&self, event: LiveEvent) -> usize {
        self.broadcaster.publish(event)
    }

    /// Interpret a command and announce the result on the live feed.
    pub fn run_command(&self, text: &str) -> Result<CommandResult, StoreError> {
        let result = self.with_rng(|rng| self.interpreter.interpret(text, &self.zones, rng))?;
        let receivers = self.broadcast(LiveEvent::CommandProcessed(result.clone()));
        debug!(
            command = text,
            receivers,
            response = result.agent_response(),
            "Command processed"
        );
        Ok(result)
    }

    /// Forecast one zone from its current state.
    pub fn forecast(&self, id: &ZoneId) -> Result<ZoneForecast, StoreError> {
        let zone = self.zones.get(id)?;
        Ok(self.with_rng(|rng| self.forecaster.forecast(&zone, rng)))
    }

    /// Run `f` with exclusive access to the handler generator. Poisoning
    /// is ignored.
    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}
