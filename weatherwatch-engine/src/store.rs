//! Thread-safe station state store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use weatherwatch_types::{HourlyRollup, Sample, Snapshot};

use crate::config::EngineConfig;
use crate::station::{StationState, StationUpdate};

/// Owns every station's aggregation state behind a single lock.
///
/// Writers take the lock for the duration of one in-memory fold, readers for
/// the duration of one copy; nothing blocking ever happens under it. Stores
/// are independent of each other, so tests can build as many as they like.
///
/// # Example
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use weatherwatch_engine::{EngineConfig, LocalZone, StationStore, StationUpdate};
///
/// let config = EngineConfig::builder().zone(LocalZone::utc()).build().unwrap();
/// let store = StationStore::new(config);
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 2, 12, 35, 0).unwrap();
/// store.upsert("S1", StationUpdate::new("20.5", "50", None, now));
///
/// let snapshot = store.snapshot_at(now);
/// assert_eq!(snapshot.get("S1").unwrap().temperature, "20.5 °C");
/// ```
#[derive(Debug)]
pub struct StationStore {
    config: EngineConfig,
    stations: RwLock<BTreeMap<String, StationState>>,
}

impl StationStore {
    /// Create a store, registering any stations listed in `config`.
    pub fn new(config: EngineConfig) -> Self {
        let stations = config
            .stations()
            .iter()
            .map(|id| (id.clone(), StationState::default()))
            .collect();
        Self {
            config,
            stations: RwLock::new(stations),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ensure a station is listed, without recording a message for it.
    pub fn register(&self, station_id: &str) {
        if self.stations.read().contains_key(station_id) {
            return;
        }
        self.stations
            .write()
            .entry(station_id.to_string())
            .or_default();
    }

    /// Fold one reading into a station, creating the station if needed.
    pub fn upsert(&self, station_id: &str, update: StationUpdate) {
        let mut stations = self.stations.write();
        if let Some(state) = stations.get_mut(station_id) {
            state.apply(update, &self.config);
            return;
        }

        tracing::debug!(station = station_id, "new station");
        stations
            .entry(station_id.to_string())
            .or_default()
            .apply(update, &self.config);
    }

    /// Snapshot evaluated against the wall clock.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_at(Utc::now())
    }

    /// Snapshot of every station sorted by identifier, with liveness and
    /// rolling averages evaluated at `now`.
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> Snapshot {
        let stations = self.stations.read();
        let views = stations
            .iter()
            .map(|(id, state)| state.view(id, now, &self.config))
            .collect();
        Snapshot::new(now, views)
    }

    /// Retained hourly rollups for a station, oldest first.
    pub fn hourly(&self, station_id: &str) -> Option<Vec<HourlyRollup>> {
        self.stations.read().get(station_id).map(StationState::hourly)
    }

    /// Copy of a station's sample buffer in receipt order.
    pub fn recent(&self, station_id: &str) -> Option<Vec<Sample>> {
        self.stations.read().get(station_id).map(StationState::recent)
    }

    /// Number of known stations.
    pub fn len(&self) -> usize {
        self.stations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.read().is_empty()
    }
}

impl Default for StationStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocalZone;
    use crate::timestamp::parse_iso_str;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;
    use std::thread;
    use weatherwatch_types::StationStatus;

    fn store() -> StationStore {
        StationStore::new(
            EngineConfig::builder()
                .zone(LocalZone::utc())
                .build()
                .unwrap(),
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 12, 35, 0).unwrap()
    }

    #[test]
    fn example_reading_renders_as_expected() {
        let store = store();
        store.upsert(
            "S1",
            StationUpdate::new("20.5", "50", parse_iso_str("2024-01-02T12:34:56Z"), now()),
        );

        let snapshot = store.snapshot_at(now());
        let s1 = snapshot.get("S1").unwrap();
        assert_eq!(s1.status, StationStatus::Ok);
        assert_eq!(s1.temperature, "20.5 °C");
        assert_eq!(s1.humidity, "50.0 %");
        assert_eq!(s1.payload_timestamp, "2024-01-02T12:34:56+00:00");
        assert_eq!(s1.last_received_at, "2024-01-02T12:35:00+00:00");
        assert_eq!(s1.rolling_avg_temp, "20.5");
        assert_eq!(s1.rolling_avg_humidity, "50.0");
    }

    #[test]
    fn one_entry_per_station_sorted_by_id() {
        let store = store();
        for id in ["C", "A", "B", "A"] {
            store.upsert(id, StationUpdate::new(10.0, 10.0, None, now()));
        }

        let snapshot = store.snapshot_at(now());
        let ids: Vec<&str> = snapshot.iter().map(|s| s.station_id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn buffer_is_bounded_and_evicts_oldest() {
        let store = store();
        let start = now();
        for i in 0..2001 {
            store.upsert(
                "A",
                StationUpdate::new(i as f64 / 100.0, 50.0, None, start + Duration::milliseconds(i)),
            );
        }

        let recent = store.recent("A").unwrap();
        assert_eq!(recent.len(), 2000);
        assert_eq!(recent[0].received_at, start + Duration::milliseconds(1));
        assert_eq!(recent[1999].received_at, start + Duration::milliseconds(2000));
        assert_eq!(store.snapshot_at(start).get("A").unwrap().samples, 2000);
    }

    #[test]
    fn rolling_average_excludes_samples_outside_window() {
        let store = store();
        let now = now();
        store.upsert("A", StationUpdate::new(30.0, 90.0, None, now - Duration::minutes(6)));
        store.upsert("A", StationUpdate::new(10.0, 40.0, None, now - Duration::minutes(4)));

        let view = store.snapshot_at(now).get("A").cloned().unwrap();
        assert_eq!(view.rolling_avg_temp, "10.0");
        assert_eq!(view.rolling_avg_humidity, "40.0");
    }

    #[test]
    fn liveness_statuses() {
        let store = StationStore::new(
            EngineConfig::builder()
                .zone(LocalZone::utc())
                .station("silent")
                .build()
                .unwrap(),
        );
        let now = now();
        let ago = |secs| now - Duration::seconds(secs);
        store.upsert("stale", StationUpdate::new(20.0, 50.0, None, ago(31)));
        store.upsert("stale-bad", StationUpdate::new(-999.0, 50.0, None, ago(31)));
        store.upsert("bad", StationUpdate::new(20.0, 150.0, None, ago(10)));
        store.upsert("good", StationUpdate::new(20.0, 50.0, None, ago(10)));

        let snapshot = store.snapshot_at(now);
        let status = |id: &str| snapshot.get(id).unwrap().status;
        assert_eq!(status("silent"), StationStatus::Offline);
        assert_eq!(status("stale"), StationStatus::Stale);
        assert_eq!(status("stale-bad"), StationStatus::Stale);
        assert_eq!(status("bad"), StationStatus::Invalid);
        assert_eq!(status("good"), StationStatus::Ok);
    }

    #[test]
    fn validity_reflects_latest_reading_only() {
        let store = store();
        store.upsert("A", StationUpdate::new("abc", 50.0, None, now()));
        store.upsert("A", StationUpdate::new(20.0, 50.0, None, now()));

        let view = store.snapshot_at(now()).get("A").cloned().unwrap();
        assert!(view.valid);
        assert!(view.problems.is_empty());
    }

    #[test]
    fn daily_rollup_resets_on_new_local_date() {
        let store = store();
        let evening = Utc.with_ymd_and_hms(2024, 1, 2, 23, 50, 0).unwrap();
        let morning = Utc.with_ymd_and_hms(2024, 1, 3, 0, 10, 0).unwrap();

        store.upsert("A", StationUpdate::new(-5.0, 80.0, None, evening));
        store.upsert("A", StationUpdate::new(3.0, 70.0, None, evening));
        let daily = store.snapshot_at(evening).get("A").unwrap().daily.unwrap();
        assert_eq!(daily.temperature.unwrap().min(), -5.0);
        assert_eq!(daily.temperature.unwrap().max(), 3.0);

        store.upsert("A", StationUpdate::new(1.0, 60.0, None, morning));
        let daily = store.snapshot_at(morning).get("A").unwrap().daily.unwrap();
        assert_eq!(daily.date.to_string(), "2024-01-03");
        assert_eq!(daily.temperature.unwrap().min(), 1.0);
        assert_eq!(daily.temperature.unwrap().max(), 1.0);
        assert_eq!(daily.humidity.unwrap().max(), 60.0);
    }

    #[test]
    fn register_does_not_overwrite_state() {
        let store = store();
        store.upsert("A", StationUpdate::new(20.0, 50.0, None, now()));
        store.register("A");
        store.register("B");

        let snapshot = store.snapshot_at(now());
        assert_eq!(snapshot.get("A").unwrap().status, StationStatus::Ok);
        assert_eq!(snapshot.get("B").unwrap().status, StationStatus::Offline);
        assert!(store.hourly("B").unwrap().is_empty());
        assert!(store.hourly("missing").is_none());
    }

    #[test]
    fn independent_stores_do_not_share_state() {
        let a = store();
        let b = store();
        a.upsert("A", StationUpdate::new(20.0, 50.0, None, now()));
        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
    }

    #[test]
    fn concurrent_writes_and_snapshots() {
        let store = Arc::new(store());
        let start = now();

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..500 {
                        let at = start + Duration::milliseconds(i);
                        store.upsert(&format!("S{}", w), StationUpdate::new(20.0, 50.0, None, at));
                    }
                })
            })
            .collect();

        let reader = {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    for view in store.snapshot_at(start).iter() {
                        // A torn read would show a sample count without a reading.
                        if view.samples > 0 {
                            assert_eq!(view.temperature, "20.0 °C");
                        }
                    }
                }
            })
        };

        for w in writers {
            w.join().unwrap();
        }
        reader.join().unwrap();

        let snapshot = store.snapshot_at(start);
        assert_eq!(snapshot.len(), 4);
        assert!(snapshot.iter().all(|s| s.samples == 500));
        for w in 0..4 {
            let hourly = store.hourly(&format!("S{}", w)).unwrap();
            assert_eq!(hourly.iter().map(|h| h.count).sum::<u64>(), 500);
        }
    }
}
