//! Live state and background simulation for the Drishti backend.
//!
//! This crate owns everything the HTTP layer reads and writes: the zone
//! store, the agent registry, the mutation loop that keeps both moving, the
//! command interpreter, the forecaster, and the broadcaster that fans
//! updates out to push subscribers.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `drishti-config.yaml` into
//!   strongly-typed structs.
//! - [`zones`] -- [`ZoneStore`] with per-zone atomic updates.
//! - [`agents`] -- [`AgentRegistry`] of monitoring agents.
//! - [`mutator`] -- The periodic random-update loop and [`CycleCallback`].
//! - [`command`] -- Keyword-based [`CommandInterpreter`].
//! - [`forecast`] -- 20-minute [`Forecaster`].
//! - [`broadcast`] -- [`Broadcaster`] fan-out with per-subscriber buffers.
//! - [`random`] -- Seedable random helpers.
//! - [`error`] -- [`StoreError`].

pub mod agents;
pub mod broadcast;
pub mod command;
pub mod config;
pub mod error;
pub mod forecast;
pub mod mutator;
pub mod random;
pub mod zones;

pub use agents::AgentRegistry;
pub use broadcast::{Broadcaster, Subscription};
pub use command::{CommandInterpreter, HELP_TEXT};
pub use config::{ConfigError, DrishtiConfig};
pub use error::StoreError;
pub use forecast::Forecaster;
pub use mutator::{CycleCallback, CycleReport, Mutator, NoOpCallback, ZoneUpdateFailure};
pub use zones::ZoneStore;
