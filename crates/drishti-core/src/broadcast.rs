//! Fan-out of live events to every subscriber.
//!
//! Built on [`tokio::sync::broadcast`]: each subscriber owns a bounded ring
//! buffer, so [`Broadcaster::publish`] never waits on a slow consumer. A
//! consumer that falls more than `capacity` events behind loses the oldest
//! ones and resumes from the newest.
//!
//! A new [`Subscription`] starts with the current zone and agent snapshots.
//! The receiver is registered before those snapshots are read, so an update
//! that lands in between is delivered twice rather than lost.

use std::collections::VecDeque;
use std::sync::Arc;

use drishti_types::LiveEvent;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::agents::AgentRegistry;
use crate::error::StoreError;
use crate::mutator::{CycleCallback, CycleReport};
use crate::zones::ZoneStore;

/// Publishes [`LiveEvent`]s to all current subscribers.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<Arc<LiveEvent>>,
    zones: Arc<ZoneStore>,
    agents: Arc<AgentRegistry>,
}

impl Broadcaster {
    /// Create a broadcaster over the given stores.
    ///
    /// `capacity` is the per-subscriber buffer; zero is treated as one.
    pub fn new(zones: Arc<ZoneStore>, agents: Arc<AgentRegistry>, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, zones, agents }
    }

    /// Subscribe to the live feed, starting with the current snapshots.
    pub fn subscribe(&self) -> Result<Subscription, StoreError> {
        let rx = self.tx.subscribe();
        let zones = self.zones.get_all()?;
        let agents = self.agents.get_all()?;

        let mut pending = VecDeque::with_capacity(2);
        pending.push_back(Arc::new(LiveEvent::ZonesUpdate(zones)));
        pending.push_back(Arc::new(LiveEvent::AgentsStatus(agents)));

        Ok(Subscription {
            pending,
            rx,
            skipped: 0,
        })
    }

    /// Deliver an event to every live subscription.
    ///
    /// Returns the number of subscriptions reached; zero subscribers is
    /// not an error.
    pub fn publish(&self, event: LiveEvent) -> usize {
        self.tx.send(Arc::new(event)).unwrap_or(0)
    }

    /// Publish the current zone snapshot followed by the agent snapshot.
    pub fn publish_snapshot(&self) -> Result<usize, StoreError> {
        let zones = self.zones.get_all()?;
        let agents = self.agents.get_all()?;
        let reached = self.publish(LiveEvent::ZonesUpdate(zones));
        self.publish(LiveEvent::AgentsStatus(agents));
        Ok(reached)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl CycleCallback for Broadcaster {
    fn on_cycle(&mut self, report: &CycleReport) {
        match self.publish_snapshot() {
            Ok(receivers) => {
                debug!(cycle = report.cycle, receivers, "Cycle snapshot broadcast");
            }
            Err(e) => {
                warn!(cycle = report.cycle, error = %e, "Cycle snapshot not broadcast");
            }
        }
    }
}

/// One subscriber's view of the live feed. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    pending: VecDeque<Arc<LiveEvent>>,
    rx: broadcast::Receiver<Arc<LiveEvent>>,
    skipped: u64,
}

impl Subscription {
    /// Wait for the next event.
    ///
    /// Returns `None` once the broadcaster is gone. Cancel-safe, so it can
    /// sit in a `tokio::select!` arm.
    pub async fn recv(&mut self) -> Option<Arc<LiveEvent>> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    debug!(skipped = n, "Subscriber lagged, dropping oldest events");
                    self.skipped = self.skipped.saturating_add(n);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next event if one is ready, without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<LiveEvent>> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    self.skipped = self.skipped.saturating_add(n);
                }
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return None,
            }
        }
    }

    /// Events dropped so far because this subscriber fell behind.
    pub const fn skipped(&self) -> u64 {
        self.skipped
    }
}
