//! The zone store.
//!
//! [`ZoneStore`] owns one [`Zone`] per grid cell. The key set is fixed when
//! the store is built, so the map itself is never locked; each zone sits
//! behind its own [`RwLock`]. Writers compute the complete next state first
//! and swap it in with a single assignment, so a reader holding the read
//! lock sees either the old zone or the new one, never a mix.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use drishti_types::{AgentReports, FlowTrend, ShortHorizon, ThreatLevel, Zone, ZoneId, ZoneMap};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::config::ZoneConfig;
use crate::error::StoreError;
use crate::random::{int_between, uint_between};

/// Offsets applied to the people count for the 15- and 20-minute projections.
const HORIZON_15_SPREAD: (i32, i32) = (-20, 30);
const HORIZON_20_SPREAD: (i32, i32) = (-25, 35);

/// Ceiling of the projections drawn for a freshly created zone.
const INITIAL_HORIZON_15_MAX: u32 = 120;
const INITIAL_HORIZON_20_MAX: u32 = 130;

/// Range of the head count quoted in the camera report.
const CAMERA_REPORT_MAX: u32 = 100;

/// Thread-safe map of zone id to live zone state.
#[derive(Debug)]
pub struct ZoneStore {
    zones: BTreeMap<ZoneId, RwLock<Zone>>,
    config: ZoneConfig,
}

impl ZoneStore {
    /// Create the store with every zone populated.
    ///
    /// This is the only constructor, so no reader can observe the store
    /// before all zones exist. Duplicate ids collapse to one zone.
    pub fn initialize<R, I>(zone_ids: I, config: ZoneConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
        I: IntoIterator<Item = ZoneId>,
    {
        let now = Utc::now();
        let zones = zone_ids
            .into_iter()
            .map(|id| {
                let zone = new_zone(id.clone(), &config, rng, now);
                (id, RwLock::new(zone))
            })
            .collect();
        Self { zones, config }
    }

    /// Copy of one zone.
    pub fn get(&self, id: &ZoneId) -> Result<Zone, StoreError> {
        let cell = self
            .zones
            .get(id)
            .ok_or_else(|| StoreError::ZoneNotFound(id.to_string()))?;
        let zone = cell
            .read()
            .map_err(|_poisoned| StoreError::Poisoned(id.to_string()))?;
        Ok(zone.clone())
    }

    /// Copy of every zone, in id order.
    ///
    /// Each zone is copied under its own read lock: every entry is
    /// internally consistent, but two entries may straddle a concurrent
    /// cycle.
    pub fn get_all(&self) -> Result<ZoneMap, StoreError> {
        self.zones
            .iter()
            .map(|(id, cell)| {
                let zone = cell
                    .read()
                    .map_err(|_poisoned| StoreError::Poisoned(id.to_string()))?;
                Ok((id.clone(), zone.clone()))
            })
            .collect()
    }

    /// Shift a zone's people count by `people_delta` and refresh its
    /// derived fields. Returns the new state.
    ///
    /// The count is clamped to `[0, people_cap]`; threat level, confidence,
    /// projections and timestamp are all rewritten in the same swap.
    pub fn apply_delta<R: Rng + ?Sized>(
        &self,
        id: &ZoneId,
        people_delta: i32,
        rng: &mut R,
    ) -> Result<Zone, StoreError> {
        let cell = self
            .zones
            .get(id)
            .ok_or_else(|| StoreError::ZoneNotFound(id.to_string()))?;
        let mut zone = cell
            .write()
            .map_err(|_poisoned| StoreError::Poisoned(id.to_string()))?;
        let next = next_state(&zone, people_delta, &self.config, rng, Utc::now());
        *zone = next.clone();
        Ok(next)
    }

    /// Whether a zone with this id exists.
    pub fn contains(&self, id: &ZoneId) -> bool {
        self.zones.contains_key(id)
    }

    /// All zone ids, in id order.
    pub fn ids(&self) -> impl Iterator<Item = &ZoneId> {
        self.zones.keys()
    }

    /// Number of zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether the store holds no zones.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Upper bound on people counts.
    pub const fn people_cap(&self) -> u32 {
        self.config.people_cap
    }

    #[cfg(test)]
    #[allow(clippy::panic)]
    pub(crate) fn poison(&self, id: &ZoneId) {
        if let Some(cell) = self.zones.get(id) {
            std::thread::scope(|s| {
                let _ = s
                    .spawn(|| {
                        let _guard = cell.write();
                        panic!("poisoning {id} for a test");
                    })
                    .join();
            });
        }
    }
}

/// Build a freshly observed zone.
fn new_zone<R: Rng + ?Sized>(
    id: ZoneId,
    config: &ZoneConfig,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Zone {
    let people_count = uint_between(rng, 0, config.initial_people_max).min(config.people_cap);
    let camera_count = uint_between(rng, 0, CAMERA_REPORT_MAX);
    let trend = FlowTrend::ALL.choose(rng).copied().unwrap_or(FlowTrend::Stable);

    Zone {
        agent_reports: AgentReports {
            camera: format!("Zone {id} monitored - {camera_count} people detected"),
            analytics: format!("Flow prediction: {trend}"),
        },
        id,
        people_count,
        threat_level: ThreatLevel::from_people_count(people_count),
        confidence: config.initial_confidence.sample(rng),
        last_updated: now,
        predictions: ShortHorizon {
            in_15_min: uint_between(rng, 0, INITIAL_HORIZON_15_MAX),
            in_20_min: uint_between(rng, 0, INITIAL_HORIZON_20_MAX),
        },
    }
}

/// Compute the state that follows `zone` after a people-count shift.
fn next_state<R: Rng + ?Sized>(
    zone: &Zone,
    people_delta: i32,
    config: &ZoneConfig,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Zone {
    let people_count = shift_clamped(zone.people_count, people_delta, config.people_cap);
    Zone {
        id: zone.id.clone(),
        people_count,
        threat_level: ThreatLevel::from_people_count(people_count),
        confidence: config.update_confidence.sample(rng),
        last_updated: now,
        predictions: ShortHorizon {
            in_15_min: project(rng, people_count, HORIZON_15_SPREAD),
            in_20_min: project(rng, people_count, HORIZON_20_SPREAD),
        },
        agent_reports: zone.agent_reports.clone(),
    }
}

/// `count + delta`, clamped to `[0, cap]`.
fn shift_clamped(count: u32, delta: i32, cap: u32) -> u32 {
    let shifted = i64::from(count).saturating_add(i64::from(delta));
    let clamped = shifted.clamp(0, i64::from(cap));
    u32::try_from(clamped).unwrap_or(cap)
}

/// Project a count forward by a random offset, never below zero.
fn project<R: Rng + ?Sized>(rng: &mut R, count: u32, (lo, hi): (i32, i32)) -> u32 {
    let offset = int_between(rng, lo, hi);
    shift_clamped(count, offset, u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::GridConfig;
    use crate::random::seeded_rng;

    fn store(seed: u64) -> ZoneStore {
        let mut rng = seeded_rng(Some(seed));
        ZoneStore::initialize(
            GridConfig::default().zone_ids(),
            ZoneConfig::default(),
            &mut rng,
        )
    }

    fn id(raw: &str) -> ZoneId {
        ZoneId::parse(raw).unwrap()
    }

    #[test]
    fn initialize_populates_every_cell() {
        let zones = store(1);
        assert_eq!(zones.len(), 64);
        let all = zones.get_all().unwrap();
        for (key, zone) in &all {
            assert_eq!(key, &zone.id);
            assert!(zone.people_count <= 100);
            assert_eq!(zone.threat_level, ThreatLevel::from_people_count(zone.people_count));
            assert!((0.80..=0.98).contains(&zone.confidence));
            assert!(zone.agent_reports.camera.starts_with(&format!("Zone {key} monitored")));
            assert!(zone.agent_reports.analytics.starts_with("Flow prediction: "));
        }
        let first = all.keys().next().unwrap();
        assert_eq!(first.as_str(), "A1");
    }

    #[test]
    fn initial_count_respects_small_cap() {
        let mut rng = seeded_rng(Some(9));
        let config = ZoneConfig {
            people_cap: 10,
            ..ZoneConfig::default()
        };
        let zones = ZoneStore::initialize(GridConfig::default().zone_ids(), config, &mut rng);
        assert!(zones.get_all().unwrap().values().all(|z| z.people_count <= 10));
    }

    #[test]
    fn get_unknown_zone_is_not_found() {
        let zones = store(2);
        assert_eq!(
            zones.get(&id("Z9")),
            Err(StoreError::ZoneNotFound(String::from("Z9")))
        );
        assert!(!zones.contains(&id("Z9")));
        assert_eq!(zones.len(), 64);
    }

    #[test]
    fn get_is_idempotent_without_mutation() {
        let zones = store(3);
        assert_eq!(zones.get(&id("D4")).unwrap(), zones.get(&id("D4")).unwrap());
    }

    #[test]
    fn apply_delta_clamps_and_rederives() {
        let zones = store(4);
        let mut rng = seeded_rng(Some(40));
        let target = id("B2");

        let low = zones.apply_delta(&target, -10_000, &mut rng).unwrap();
        assert_eq!(low.people_count, 0);
        assert_eq!(low.threat_level, ThreatLevel::Low);

        let high = zones.apply_delta(&target, 10_000, &mut rng).unwrap();
        assert_eq!(high.people_count, 150);
        assert_eq!(high.threat_level, ThreatLevel::Critical);
        assert_eq!(zones.get(&target).unwrap(), high);
    }

    #[test]
    fn apply_delta_invariants_hold_under_random_walk() {
        let zones = store(5);
        let mut rng = seeded_rng(Some(50));
        let target = id("H8");
        for _ in 0..2_000 {
            let delta = int_between(&mut rng, -40, 40);
            let zone = zones.apply_delta(&target, delta, &mut rng).unwrap();
            assert!(zone.people_count <= zones.people_cap());
            assert_eq!(zone.threat_level, ThreatLevel::from_people_count(zone.people_count));
            assert!((0.85..=0.98).contains(&zone.confidence));
        }
    }

    #[test]
    fn apply_delta_refreshes_timestamp_and_keeps_reports() {
        let zones = store(6);
        let mut rng = seeded_rng(Some(60));
        let target = id("C3");
        let before = zones.get(&target).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let after = zones.apply_delta(&target, 1, &mut rng).unwrap();
        assert!(after.last_updated > before.last_updated);
        assert_eq!(after.agent_reports, before.agent_reports);
    }

    #[test]
    fn apply_delta_on_unknown_zone_creates_nothing() {
        let zones = store(7);
        let mut rng = seeded_rng(Some(70));
        assert!(zones.apply_delta(&id("Q1"), 5, &mut rng).is_err());
        assert!(zones.get(&id("Q1")).is_err());
        assert_eq!(zones.len(), 64);
    }

    #[test]
    fn projections_never_negative() {
        let mut rng = seeded_rng(Some(8));
        for _ in 0..500 {
            assert!(project(&mut rng, 0, HORIZON_20_SPREAD) <= 35);
        }
        assert_eq!(shift_clamped(3, -5, 150), 0);
        assert_eq!(shift_clamped(149, 5, 150), 150);
    }

    #[test]
    fn poisoned_zone_reports_error() {
        let zones = store(9);
        let target = id("A2");
        zones.poison(&target);
        assert_eq!(
            zones.get(&target),
            Err(StoreError::Poisoned(String::from("A2")))
        );
        assert!(zones.get(&id("A1")).is_ok());
    }

    #[test]
    fn concurrent_readers_never_see_torn_zones() {
        let zones = Arc::new(store(10));
        let writer_zones = Arc::clone(&zones);

        let writer = std::thread::spawn(move || {
            let mut rng = seeded_rng(Some(100));
            let ids: Vec<ZoneId> = writer_zones.ids().cloned().collect();
            for step in 0..5_000_usize {
                let target = ids.get(step % ids.len()).unwrap();
                let delta = int_between(&mut rng, -30, 30);
                writer_zones.apply_delta(target, delta, &mut rng).unwrap();
            }
        });

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let zones = Arc::clone(&zones);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        for zone in zones.get_all().unwrap().values() {
                            assert_eq!(
                                zone.threat_level,
                                ThreatLevel::from_people_count(zone.people_count)
                            );
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
