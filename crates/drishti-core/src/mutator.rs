//! The background mutation loop.
//!
//! Every cycle picks a handful of distinct zones, nudges each people count
//! by a bounded random delta, stamps every agent's heartbeat, and hands a
//! [`CycleReport`] to the registered [`CycleCallback`]. The loop itself
//! never fails: a zone that cannot be updated is logged and skipped.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use drishti_types::ZoneId;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::index;
use tracing::{debug, info, warn};

use crate::agents::AgentRegistry;
use crate::config::MutatorConfig;
use crate::error::StoreError;
use crate::random::{int_between, seeded_rng};
use crate::zones::ZoneStore;

/// What one mutation cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// 1-based cycle number.
    pub cycle: u64,
    /// Zones whose update was applied.
    pub updated: Vec<ZoneId>,
    /// Zones whose update was skipped, with the reason.
    pub failed: Vec<ZoneUpdateFailure>,
    /// Agents whose heartbeat was stamped.
    pub agents_touched: usize,
    /// Heartbeat time written to the agents.
    pub timestamp: DateTime<Utc>,
}

/// A zone update that did not apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneUpdateFailure {
    /// The zone that was picked.
    pub zone: ZoneId,
    /// Why the update was skipped.
    pub reason: StoreError,
}

/// Callback invoked after each cycle completes.
///
/// The server wires the [`Broadcaster`](crate::broadcast::Broadcaster) in
/// here so every cycle ends with fresh snapshots on the live feed.
pub trait CycleCallback: Send {
    /// Called once per cycle, after zones and agents were written.
    fn on_cycle(&mut self, report: &CycleReport);
}

/// A no-op cycle callback for testing.
pub struct NoOpCallback;

impl CycleCallback for NoOpCallback {
    fn on_cycle(&mut self, _report: &CycleReport) {}
}

/// Drives periodic random updates of the zone store.
pub struct Mutator {
    zones: Arc<ZoneStore>,
    agents: Arc<AgentRegistry>,
    config: MutatorConfig,
    rng: StdRng,
    callback: Box<dyn CycleCallback>,
    ids: Vec<ZoneId>,
    cycle: u64,
}

impl Mutator {
    /// Create a mutator seeded from `config.seed` (or the OS when unset).
    pub fn new(
        zones: Arc<ZoneStore>,
        agents: Arc<AgentRegistry>,
        config: MutatorConfig,
        callback: Box<dyn CycleCallback>,
    ) -> Self {
        let rng = seeded_rng(config.seed);
        Self::with_rng(zones, agents, config, callback, rng)
    }

    /// Create a mutator drawing from the given generator.
    pub fn with_rng(
        zones: Arc<ZoneStore>,
        agents: Arc<AgentRegistry>,
        config: MutatorConfig,
        callback: Box<dyn CycleCallback>,
        rng: StdRng,
    ) -> Self {
        let ids = zones.ids().cloned().collect();
        Self {
            zones,
            agents,
            config,
            rng,
            callback,
            ids,
            cycle: 0,
        }
    }

    /// Run one cycle immediately.
    pub fn run_cycle(&mut self) -> CycleReport {
        self.cycle = self.cycle.saturating_add(1);
        let targets = self.pick_targets();

        let mut updated = Vec::with_capacity(targets.len());
        let mut failed = Vec::new();
        for zone in targets {
            let delta = int_between(&mut self.rng, self.config.delta_min, self.config.delta_max);
            match self.zones.apply_delta(&zone, delta, &mut self.rng) {
                Ok(state) => {
                    debug!(
                        zone = %zone,
                        delta,
                        people = state.people_count,
                        threat = ?state.threat_level,
                        "Zone updated"
                    );
                    updated.push(zone);
                }
                Err(reason) => {
                    warn!(zone = %zone, error = %reason, "Zone update skipped");
                    failed.push(ZoneUpdateFailure { zone, reason });
                }
            }
        }

        let timestamp = Utc::now();
        let agents_touched = self.agents.touch_all(timestamp);

        let report = CycleReport {
            cycle: self.cycle,
            updated,
            failed,
            agents_touched,
            timestamp,
        };
        debug!(
            cycle = report.cycle,
            updated = report.updated.len(),
            failed = report.failed.len(),
            "Cycle complete"
        );
        self.callback.on_cycle(&report);
        report
    }

    /// Loop forever: sleep one interval, then cycle.
    ///
    /// Ends only when the task running it is dropped or aborted.
    pub async fn run(mut self) {
        info!(
            interval_ms = self.config.interval_ms,
            zones = self.ids.len(),
            min_zones = self.config.min_zones,
            max_zones = self.config.max_zones,
            "Mutator starting"
        );
        let interval = self.config.interval();
        loop {
            if interval.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(interval).await;
            }
            self.run_cycle();
        }
    }

    /// Number of cycles run so far.
    pub const fn cycles_completed(&self) -> u64 {
        self.cycle
    }

    /// Sample `k` distinct zones, `k` drawn from the configured range and
    /// capped to the zone count.
    fn pick_targets(&mut self) -> Vec<ZoneId> {
        let total = self.ids.len();
        if total == 0 {
            return Vec::new();
        }
        let lo = self.config.min_zones.min(total);
        let hi = self.config.max_zones.min(total);
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let k = self.rng.random_range(lo..=hi);

        index::sample(&mut self.rng, total, k)
            .into_iter()
            .filter_map(|i| self.ids.get(i).cloned())
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::config::{DrishtiConfig, ZoneConfig};

    fn stores(seed: u64) -> (Arc<ZoneStore>, Arc<AgentRegistry>) {
        let config = DrishtiConfig::default();
        let mut rng = seeded_rng(Some(seed));
        let zones = ZoneStore::initialize(config.grid.zone_ids(), config.zones, &mut rng);
        (Arc::new(zones), Arc::new(AgentRegistry::new(&config.agents)))
    }

    fn mutator(zones: &Arc<ZoneStore>, agents: &Arc<AgentRegistry>, config: MutatorConfig) -> Mutator {
        Mutator::with_rng(
            Arc::clone(zones),
            Arc::clone(agents),
            config,
            Box::new(NoOpCallback),
            seeded_rng(Some(77)),
        )
    }

    struct Counter(Arc<AtomicU64>);

    impl CycleCallback for Counter {
        fn on_cycle(&mut self, report: &CycleReport) {
            self.0.store(report.cycle, Ordering::SeqCst);
        }
    }

    #[test]
    fn cycle_updates_three_to_five_distinct_zones() {
        let (zones, agents) = stores(1);
        let mut m = mutator(&zones, &agents, MutatorConfig::default());
        for _ in 0..50 {
            let report = m.run_cycle();
            assert!((3..=5).contains(&report.updated.len()));
            assert!(report.failed.is_empty());
            let distinct: BTreeSet<_> = report.updated.iter().collect();
            assert_eq!(distinct.len(), report.updated.len());
        }
        assert_eq!(m.cycles_completed(), 50);
        assert_eq!(zones.len(), 64);
    }

    #[test]
    fn updated_zones_get_later_timestamps() {
        let (zones, agents) = stores(2);
        let before = zones.get_all().unwrap();
        std::thread::sleep(Duration::from_millis(2));

        let report = mutator(&zones, &agents, MutatorConfig::default()).run_cycle();
        for id in &report.updated {
            let old = before.get(id).unwrap();
            let new = zones.get(id).unwrap();
            assert!(new.last_updated > old.last_updated);
            assert!(new.people_count <= zones.people_cap());
        }

        // Zones outside the sample keep their timestamp.
        let after = zones.get_all().unwrap();
        let restamped: BTreeSet<&ZoneId> = after
            .iter()
            .filter(|(id, zone)| zone.last_updated > before.get(*id).unwrap().last_updated)
            .map(|(id, _)| id)
            .collect();
        assert!((3..=5).contains(&restamped.len()));
        assert_eq!(restamped, report.updated.iter().collect::<BTreeSet<_>>());
    }

    #[test]
    fn deltas_stay_in_range() {
        let (zones, agents) = stores(3);
        let config = MutatorConfig {
            min_zones: 64,
            max_zones: 64,
            ..MutatorConfig::default()
        };
        let mut m = mutator(&zones, &agents, config);
        for _ in 0..20 {
            let before = zones.get_all().unwrap();
            m.run_cycle();
            for (id, zone) in zones.get_all().unwrap() {
                let old = i64::from(before.get(&id).unwrap().people_count);
                let new = i64::from(zone.people_count);
                let diff = new.saturating_sub(old);
                assert!((-10..=15).contains(&diff), "zone {id} moved by {diff}");
            }
        }
    }

    #[test]
    fn cycle_touches_every_agent() {
        let (zones, agents) = stores(4);
        let report = mutator(&zones, &agents, MutatorConfig::default()).run_cycle();
        assert_eq!(report.agents_touched, 6);
        for record in agents.get_all().unwrap().values() {
            assert_eq!(record.last_update, Some(report.timestamp));
        }
    }

    #[test]
    fn k_is_capped_to_zone_count() {
        let mut rng = seeded_rng(Some(5));
        let ids = ["A1", "A2"].map(|raw| ZoneId::parse(raw).unwrap());
        let zones = Arc::new(ZoneStore::initialize(ids, ZoneConfig::default(), &mut rng));
        let agents = Arc::new(AgentRegistry::new(&[]));
        let report = mutator(&zones, &agents, MutatorConfig::default()).run_cycle();
        assert_eq!(report.updated.len(), 2);
        assert_eq!(report.agents_touched, 0);
    }

    #[test]
    fn poisoned_zone_is_skipped_and_cycle_continues() {
        let mut rng = seeded_rng(Some(6));
        let ids = ["A1", "A2", "A3"].map(|raw| ZoneId::parse(raw).unwrap());
        let zones = Arc::new(ZoneStore::initialize(ids, ZoneConfig::default(), &mut rng));
        let agents = Arc::new(AgentRegistry::new(&DrishtiConfig::default().agents));
        let bad = ZoneId::parse("A2").unwrap();
        zones.poison(&bad);

        let config = MutatorConfig {
            min_zones: 3,
            max_zones: 3,
            ..MutatorConfig::default()
        };
        let report = mutator(&zones, &agents, config).run_cycle();
        assert_eq!(report.updated.len(), 2);
        assert_eq!(
            report.failed,
            vec![ZoneUpdateFailure {
                zone: bad,
                reason: StoreError::Poisoned(String::from("A2")),
            }]
        );
        assert_eq!(report.agents_touched, 6);
    }

    #[test]
    fn callback_sees_every_cycle() {
        let (zones, agents) = stores(7);
        let seen = Arc::new(AtomicU64::new(0));
        let mut m = Mutator::with_rng(
            zones,
            agents,
            MutatorConfig::default(),
            Box::new(Counter(Arc::clone(&seen))),
            seeded_rng(Some(70)),
        );
        m.run_cycle();
        m.run_cycle();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn run_sleeps_before_each_cycle() {
        let (zones, agents) = stores(8);
        let seen = Arc::new(AtomicU64::new(0));
        let m = Mutator::with_rng(
            zones,
            agents,
            MutatorConfig::default(),
            Box::new(Counter(Arc::clone(&seen))),
            seeded_rng(Some(80)),
        );
        let task = tokio::spawn(m.run());

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(10_600)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 3);

        task.abort();
    }
}
