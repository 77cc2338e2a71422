//! Snapshot - a consistent, point-in-time read of every station.

use chrono::{DateTime, Utc};

use crate::{DailyRollup, StationStatus};

/// One entry of a station's receipt-ordered sample buffer.
///
/// `temperature` and `humidity` are `None` when the raw value did not coerce
/// to a finite number.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Sample {
    pub received_at: DateTime<Utc>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

/// Read-only view of a single station, formatted for display.
///
/// Text fields are already rendered: numbers with one decimal place and a
/// unit suffix, missing values as `"n/a"`, timestamps as ISO-8601 with an
/// explicit `+00:00` offset.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct StationView {
    pub station_id: String,
    pub temperature: String,
    pub humidity: String,
    pub rolling_avg_temp: String,
    pub rolling_avg_humidity: String,
    pub payload_timestamp: String,
    pub last_received_at: String,
    pub status: StationStatus,

    /// Validity of the most recent reading.
    pub valid: bool,
    /// Problems found in the most recent reading, in validation order.
    pub problems: Vec<String>,
    /// Extrema for the current local day, if any message arrived.
    pub daily: Option<DailyRollup>,
    /// Entries currently held in the sample buffer.
    pub samples: usize,
}

/// Every station, sorted by station identifier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Snapshot {
    /// Instant the liveness and rolling windows were evaluated against.
    pub taken_at: DateTime<Utc>,
    pub stations: Vec<StationView>,
}

impl Snapshot {
    pub fn new(taken_at: DateTime<Utc>, stations: Vec<StationView>) -> Self {
        Self { taken_at, stations }
    }

    /// An empty snapshot, used before the first refresh.
    pub fn empty(taken_at: DateTime<Utc>) -> Self {
        Self::new(taken_at, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Look up a station by identifier.
    pub fn get(&self, station_id: &str) -> Option<&StationView> {
        self.stations
            .binary_search_by(|s| s.station_id.as_str().cmp(station_id))
            .ok()
            .map(|idx| &self.stations[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &StationView> {
        self.stations.iter()
    }

    /// Number of stations currently in `status`.
    pub fn count(&self, status: StationStatus) -> usize {
        self.stations.iter().filter(|s| s.status == status).count()
    }

    /// Stations whose status needs attention, in station order.
    pub fn attention(&self) -> impl Iterator<Item = &StationView> {
        self.stations.iter().filter(|s| s.status.needs_attention())
    }
}
