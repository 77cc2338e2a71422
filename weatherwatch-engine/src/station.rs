//! Per-station aggregation state.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use weatherwatch_types::{
    DailyRollup, HourBucket, HourlyRollup, Sample, StationStatus, StationView,
};

use crate::config::EngineConfig;
use crate::format::{self, HUMIDITY_UNIT, TEMPERATURE_UNIT};
use crate::reading::RawValue;
use crate::validate::{validate, Validation};

/// One reading ready to be folded into a station.
#[derive(Debug, Clone, PartialEq)]
pub struct StationUpdate {
    pub temperature: RawValue,
    pub humidity: RawValue,
    pub validation: Validation,
    pub payload_timestamp: Option<DateTime<Utc>>,
    pub received_at: DateTime<Utc>,
}

impl StationUpdate {
    /// Build an update, validating the raw values.
    pub fn new(
        temperature: impl Into<RawValue>,
        humidity: impl Into<RawValue>,
        payload_timestamp: Option<DateTime<Utc>>,
        received_at: DateTime<Utc>,
    ) -> Self {
        let temperature = temperature.into();
        let humidity = humidity.into();
        let validation = validate(&temperature, &humidity);
        Self {
            temperature,
            humidity,
            validation,
            payload_timestamp,
            received_at,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct StationState {
    temperature: RawValue,
    humidity: RawValue,
    payload_timestamp: Option<DateTime<Utc>>,
    received_at: Option<DateTime<Utc>>,
    valid: bool,
    problems: Vec<String>,
    buffer: VecDeque<Sample>,
    daily: Option<DailyRollup>,
    hourly: BTreeMap<HourBucket, HourlyRollup>,
}

impl StationState {
    pub(crate) fn apply(&mut self, update: StationUpdate, config: &EngineConfig) {
        let temperature = update.temperature.as_finite();
        let humidity = update.humidity.as_finite();
        let received_at = update.received_at;

        self.valid = update.validation.is_ok();
        self.problems = update.validation.into_problems();
        self.temperature = update.temperature;
        self.humidity = update.humidity;
        self.payload_timestamp = update.payload_timestamp;
        self.received_at = Some(received_at);

        if self.buffer.len() >= config.buffer_capacity() {
            self.buffer.pop_front();
        }
        self.buffer.push_back(Sample {
            received_at,
            temperature,
            humidity,
        });

        let local = config.zone().to_local(received_at);

        let today = local.date();
        if self.daily.map_or(true, |d| d.date != today) {
            self.daily = Some(DailyRollup::new(today));
        }
        if let Some(daily) = &mut self.daily {
            daily.observe(temperature, humidity);
        }

        let bucket = HourBucket::containing(local);
        if self.predates_full_history(bucket, config.hourly_retention()) {
            tracing::trace!(%bucket, "hour predates retained history");
            return;
        }
        self.hourly
            .entry(bucket)
            .or_insert_with(|| HourlyRollup::new(bucket))
            .observe(temperature, humidity);
        if let Some(limit) = config.hourly_retention() {
            while self.hourly.len() > limit {
                self.hourly.pop_first();
            }
        }
    }

    /// A new bucket older than every retained one, with no room left, would
    /// be evicted as soon as it was inserted.
    fn predates_full_history(&self, bucket: HourBucket, limit: Option<usize>) -> bool {
        let Some(limit) = limit else {
            return false;
        };
        self.hourly.len() >= limit
            && !self.hourly.contains_key(&bucket)
            && self
                .hourly
                .first_key_value()
                .is_some_and(|(oldest, _)| bucket < *oldest)
    }

    pub(crate) fn status(&self, now: DateTime<Utc>, config: &EngineConfig) -> StationStatus {
        match self.received_at {
            None => StationStatus::Offline,
            Some(last) if now - last > config.stale_after_delta() => StationStatus::Stale,
            Some(_) if !self.valid => StationStatus::Invalid,
            Some(_) => StationStatus::Ok,
        }
    }

    /// Means of the numeric samples received at or after `now - window`.
    ///
    /// The buffer is in receipt order, so the scan stops at the first sample
    /// older than the cutoff.
    pub(crate) fn rolling_average(
        &self,
        now: DateTime<Utc>,
        config: &EngineConfig,
    ) -> (Option<f64>, Option<f64>) {
        let cutoff = now - config.rolling_window_delta();
        let mut temperature = (0.0, 0u32);
        let mut humidity = (0.0, 0u32);

        for sample in self
            .buffer
            .iter()
            .rev()
            .take_while(|s| s.received_at >= cutoff)
        {
            if let Some(t) = sample.temperature {
                temperature.0 += t;
                temperature.1 += 1;
            }
            if let Some(h) = sample.humidity {
                humidity.0 += h;
                humidity.1 += 1;
            }
        }

        let mean = |(sum, n): (f64, u32)| (n > 0).then(|| sum / f64::from(n));
        (mean(temperature), mean(humidity))
    }

    pub(crate) fn view(
        &self,
        station_id: &str,
        now: DateTime<Utc>,
        config: &EngineConfig,
    ) -> StationView {
        let (avg_temp, avg_humidity) = self.rolling_average(now, config);
        StationView {
            station_id: station_id.to_string(),
            temperature: format::measurement(&self.temperature, TEMPERATURE_UNIT),
            humidity: format::measurement(&self.humidity, HUMIDITY_UNIT),
            rolling_avg_temp: format::average(avg_temp),
            rolling_avg_humidity: format::average(avg_humidity),
            payload_timestamp: format::instant(self.payload_timestamp),
            last_received_at: format::instant(self.received_at),
            status: self.status(now, config),
            valid: self.valid,
            problems: self.problems.clone(),
            daily: self.daily,
            samples: self.buffer.len(),
        }
    }

    pub(crate) fn hourly(&self) -> Vec<HourlyRollup> {
        self.hourly.values().copied().collect()
    }

    pub(crate) fn recent(&self) -> Vec<Sample> {
        self.buffer.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocalZone;
    use chrono::{Duration, TimeZone};

    fn config() -> EngineConfig {
        EngineConfig::builder()
            .zone(LocalZone::utc())
            .build()
            .unwrap()
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, h, m, s).unwrap()
    }

    #[test]
    fn never_updated_station_is_offline() {
        let state = StationState::default();
        let view = state.view("S1", at(12, 0, 0), &config());
        assert_eq!(view.status, StationStatus::Offline);
        assert_eq!(view.temperature, "n/a");
        assert_eq!(view.rolling_avg_temp, "n/a");
        assert_eq!(view.last_received_at, "n/a");
        assert!(view.daily.is_none());
    }

    #[test]
    fn staleness_takes_precedence_over_validity() {
        let config = config();
        let mut state = StationState::default();
        state.apply(StationUpdate::new("-999", "50", None, at(12, 0, 0)), &config);

        assert_eq!(state.status(at(12, 0, 10), &config), StationStatus::Invalid);
        assert_eq!(state.status(at(12, 0, 30), &config), StationStatus::Invalid);
        assert_eq!(state.status(at(12, 0, 31), &config), StationStatus::Stale);

        state.apply(StationUpdate::new("20", "50", None, at(12, 1, 0)), &config);
        assert_eq!(state.status(at(12, 1, 10), &config), StationStatus::Ok);
        assert_eq!(state.status(at(12, 1, 31), &config), StationStatus::Stale);
    }

    #[test]
    fn non_numeric_values_display_but_do_not_aggregate() {
        let config = config();
        let mut state = StationState::default();
        state.apply(StationUpdate::new("abc", "40", None, at(12, 0, 0)), &config);

        let view = state.view("S1", at(12, 0, 1), &config);
        assert_eq!(view.temperature, "abc");
        assert_eq!(view.humidity, "40.0 %");
        assert_eq!(view.rolling_avg_temp, "n/a");
        assert_eq!(view.rolling_avg_humidity, "40.0");
        assert_eq!(view.problems, ["temperature not a number: abc"]);

        let daily = view.daily.unwrap();
        assert!(daily.temperature.is_none());
        assert_eq!(daily.humidity.unwrap().max(), 40.0);

        let hourly = state.hourly();
        assert_eq!(hourly[0].count, 1);
        assert_eq!(hourly[0].temperature.samples, 0);
    }

    #[test]
    fn rolling_average_window_edges() {
        let config = config();
        let now = at(12, 10, 0);
        let mut state = StationState::default();
        state.apply(StationUpdate::new(100.0, 0.0, None, now - Duration::minutes(6)), &config);
        state.apply(StationUpdate::new(10.0, 40.0, None, now - Duration::minutes(4)), &config);
        state.apply(StationUpdate::new(20.0, 60.0, None, now - Duration::seconds(5)), &config);

        let (t, h) = state.rolling_average(now, &config);
        assert_eq!(t, Some(15.0));
        assert_eq!(h, Some(50.0));

        let (t, _) = state.rolling_average(now + Duration::minutes(10), &config);
        assert_eq!(t, None);
    }

    #[test]
    fn hourly_buckets_follow_local_zone() {
        let config = EngineConfig::builder()
            .zone(LocalZone::parse_offset("+02:00").unwrap())
            .build()
            .unwrap();
        let mut state = StationState::default();
        state.apply(StationUpdate::new(10.0, 50.0, None, at(21, 59, 0)), &config);
        state.apply(StationUpdate::new(12.0, 50.0, None, at(22, 0, 0)), &config);

        let buckets: Vec<String> = state.hourly().iter().map(|h| h.bucket.to_string()).collect();
        assert_eq!(buckets, ["2024-01-02 23:00", "2024-01-03 00:00"]);

        // 22:00 UTC is already the next local day.
        let daily = state.daily.unwrap();
        assert_eq!(daily.date.to_string(), "2024-01-03");
        assert_eq!(daily.temperature.unwrap().min(), 12.0);
    }

    #[test]
    fn hourly_retention_evicts_oldest_bucket() {
        let config = EngineConfig::builder()
            .zone(LocalZone::utc())
            .hourly_retention(Some(3))
            .build()
            .unwrap();
        let mut state = StationState::default();
        for hour in 0..5 {
            state.apply(StationUpdate::new(1.0, 1.0, None, at(hour, 0, 0)), &config);
        }

        let hours: Vec<u32> = state.hourly().iter().map(|h| h.bucket.hour).collect();
        assert_eq!(hours, [2, 3, 4]);
    }

    #[test]
    fn backdated_hour_leaves_full_history_untouched() {
        let config = EngineConfig::builder()
            .zone(LocalZone::utc())
            .hourly_retention(Some(2))
            .build()
            .unwrap();
        let mut state = StationState::default();
        state.apply(StationUpdate::new(1.0, 1.0, None, at(5, 0, 0)), &config);
        state.apply(StationUpdate::new(2.0, 2.0, None, at(6, 0, 0)), &config);
        state.apply(StationUpdate::new(3.0, 3.0, None, at(3, 0, 0)), &config);

        let hourly = state.hourly();
        let hours: Vec<u32> = hourly.iter().map(|h| h.bucket.hour).collect();
        assert_eq!(hours, [5, 6]);
        assert_eq!(hourly[0].count, 1);
        assert_eq!(hourly[1].count, 1);

        // The reading itself still counts as the latest one.
        assert_eq!(state.temperature, RawValue::Number(3.0));
        assert_eq!(state.buffer.len(), 3);

        // A backdated hour that is still retained keeps aggregating.
        state.apply(StationUpdate::new(4.0, 4.0, None, at(5, 30, 0)), &config);
        assert_eq!(state.hourly()[0].count, 2);
    }
}
