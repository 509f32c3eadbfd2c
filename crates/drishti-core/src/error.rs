//! Error types for the live-state stores.

/// Errors returned by [`ZoneStore`](crate::zones::ZoneStore) and
/// [`AgentRegistry`](crate::agents::AgentRegistry).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No zone with this id exists. Lookups never create zones.
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    /// No agent with this name is registered.
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    /// A writer panicked while holding the entity's lock.
    #[error("lock poisoned for {0}")]
    Poisoned(String),
}
