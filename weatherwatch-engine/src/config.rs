//! Engine configuration.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, Utc};

use crate::error::ConfigError;

/// Default staleness threshold.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(30);
/// Default trailing window for rolling averages.
pub const DEFAULT_ROLLING_WINDOW: Duration = Duration::from_secs(5 * 60);
/// Default number of samples kept per station.
pub const DEFAULT_BUFFER_CAPACITY: usize = 2000;
/// Default number of hourly buckets kept per station (one week).
pub const DEFAULT_HOURLY_RETENTION: usize = 7 * 24;

/// Time zone used to derive local calendar days and hour buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalZone {
    /// The host's local time zone.
    #[default]
    System,
    /// A fixed offset from UTC.
    Fixed(FixedOffset),
}

impl LocalZone {
    /// Fixed zero offset.
    pub fn utc() -> Self {
        LocalZone::Fixed(Utc.fix())
    }

    /// Parse an offset such as `+02:00`, `-0530`, `+01`, `Z` or `UTC`.
    pub fn parse_offset(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
            return Some(Self::utc());
        }

        let (sign, rest) = match s.as_bytes().first()? {
            b'+' => (1, &s[1..]),
            b'-' => (-1, &s[1..]),
            _ => return None,
        };
        let digits = match rest.len() {
            2 | 4 => rest.to_string(),
            5 if rest.as_bytes()[2] == b':' => format!("{}{}", &rest[..2], &rest[3..]),
            _ => return None,
        };
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let (hours, minutes) = match digits.len() {
            2 => (digits.parse::<i32>().ok()?, 0),
            4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
            _ => return None,
        };
        if minutes >= 60 {
            return None;
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).map(LocalZone::Fixed)
    }

    /// Wall-clock time of `instant` in this zone.
    pub fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            LocalZone::System => instant.with_timezone(&Local).naive_local(),
            LocalZone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }
}

/// Parameters of a [`StationStore`](crate::StationStore).
///
/// Build one with [`EngineConfig::builder()`], or use [`EngineConfig::default()`]
/// for the dashboard defaults (30 s staleness, 5 min window, 2000 samples).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    stale_after: Duration,
    rolling_window: Duration,
    buffer_capacity: usize,
    hourly_retention: Option<usize>,
    zone: LocalZone,
    stations: Vec<String>,
    // Pre-converted for arithmetic on UTC instants.
    stale_after_delta: chrono::Duration,
    rolling_window_delta: chrono::Duration,
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    pub fn rolling_window(&self) -> Duration {
        self.rolling_window
    }

    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    /// Maximum hourly buckets per station; `None` keeps every bucket.
    pub fn hourly_retention(&self) -> Option<usize> {
        self.hourly_retention
    }

    pub fn zone(&self) -> LocalZone {
        self.zone
    }

    /// Stations registered up front so they show as offline until they report.
    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    pub(crate) fn stale_after_delta(&self) -> chrono::Duration {
        self.stale_after_delta
    }

    pub(crate) fn rolling_window_delta(&self) -> chrono::Duration {
        self.rolling_window_delta
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stale_after: DEFAULT_STALE_AFTER,
            rolling_window: DEFAULT_ROLLING_WINDOW,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            hourly_retention: Some(DEFAULT_HOURLY_RETENTION),
            zone: LocalZone::System,
            stations: Vec::new(),
            stale_after_delta: chrono::Duration::seconds(DEFAULT_STALE_AFTER.as_secs() as i64),
            rolling_window_delta: chrono::Duration::seconds(
                DEFAULT_ROLLING_WINDOW.as_secs() as i64,
            ),
        }
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    stale_after: Option<Duration>,
    rolling_window: Option<Duration>,
    buffer_capacity: Option<usize>,
    hourly_retention: Option<Option<usize>>,
    zone: LocalZone,
    stations: Vec<String>,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Age after which a station is reported stale. Defaults to 30 seconds.
    pub fn stale_after(mut self, threshold: Duration) -> Self {
        self.stale_after = Some(threshold);
        self
    }

    /// Trailing window for rolling averages. Defaults to 5 minutes.
    pub fn rolling_window(mut self, window: Duration) -> Self {
        self.rolling_window = Some(window);
        self
    }

    /// Samples kept per station. Defaults to 2000.
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = Some(capacity);
        self
    }

    /// Hourly buckets kept per station, `None` for no limit. Defaults to 168.
    pub fn hourly_retention(mut self, retention: Option<usize>) -> Self {
        self.hourly_retention = Some(retention);
        self
    }

    /// Zone for daily and hourly bucketing. Defaults to the host zone.
    pub fn zone(mut self, zone: LocalZone) -> Self {
        self.zone = zone;
        self
    }

    /// Register a station that should be listed before it first reports.
    pub fn station(mut self, station_id: impl Into<String>) -> Self {
        self.stations.push(station_id.into());
        self
    }

    pub fn stations<I, S>(mut self, station_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stations.extend(station_ids.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        let stale_after = self.stale_after.unwrap_or(DEFAULT_STALE_AFTER);
        let rolling_window = self.rolling_window.unwrap_or(DEFAULT_ROLLING_WINDOW);
        let buffer_capacity = self.buffer_capacity.unwrap_or(DEFAULT_BUFFER_CAPACITY);
        let hourly_retention = self.hourly_retention.unwrap_or(Some(DEFAULT_HOURLY_RETENTION));

        if buffer_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if rolling_window.is_zero() {
            return Err(ConfigError::ZeroWindow);
        }
        if stale_after.is_zero() {
            return Err(ConfigError::ZeroStaleness);
        }
        if hourly_retention == Some(0) {
            return Err(ConfigError::ZeroRetention);
        }

        let stale_after_delta = chrono::Duration::from_std(stale_after)
            .map_err(|e| ConfigError::DurationOutOfRange(e.to_string()))?;
        let rolling_window_delta = chrono::Duration::from_std(rolling_window)
            .map_err(|e| ConfigError::DurationOutOfRange(e.to_string()))?;

        let mut stations = self.stations;
        stations.sort();
        stations.dedup();

        Ok(EngineConfig {
            stale_after,
            rolling_window,
            buffer_capacity,
            hourly_retention,
            zone: self.zone,
            stations,
            stale_after_delta,
            rolling_window_delta,
        })
    }
}
