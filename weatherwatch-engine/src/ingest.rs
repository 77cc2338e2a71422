//! Ingestion pipeline: payload bytes in, station state updated.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::DecodeError;
use crate::reading::Reading;
use crate::station::StationUpdate;
use crate::store::StationStore;
use crate::timestamp::parse_iso;
use crate::validate::validate;

/// Why a payload did not reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Malformed,
    NotAnObject,
    MissingStationId,
    UnsupportedValue,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::Malformed => "malformed",
            DropReason::NotAnObject => "not an object",
            DropReason::MissingStationId => "missing stationId",
            DropReason::UnsupportedValue => "unsupported value",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&DecodeError> for DropReason {
    fn from(err: &DecodeError) -> Self {
        match err {
            DecodeError::Json(_) => DropReason::Malformed,
            DecodeError::NotAnObject => DropReason::NotAnObject,
            DecodeError::MissingStationId => DropReason::MissingStationId,
            DecodeError::UnsupportedValue(_) => DropReason::UnsupportedValue,
        }
    }
}

/// Result of handing one payload to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Accepted { station_id: String, valid: bool },
    Dropped(DropReason),
}

impl IngestOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, IngestOutcome::Accepted { .. })
    }
}

/// Point-in-time copy of the pipeline counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestStats {
    pub accepted: u64,
    pub dropped: u64,
}

impl IngestStats {
    pub fn total(&self) -> u64 {
        self.accepted + self.dropped
    }
}

#[derive(Debug, Default)]
struct Counters {
    accepted: AtomicU64,
    dropped: AtomicU64,
}

/// Entry point for transports. Cloning is cheap; clones share the store
/// and the counters.
///
/// # Example
///
/// ```rust
/// use weatherwatch_engine::{IngestOutcome, Ingestor, StationStore};
///
/// let ingestor = Ingestor::new(StationStore::default());
/// let outcome = ingestor.ingest(br#"{"stationId":"S1","temperature":20.5,"humidity":50}"#);
/// assert!(outcome.is_accepted());
///
/// // Frames from other publishers on the topic are dropped quietly.
/// assert!(!ingestor.ingest(b"hello").is_accepted());
/// assert_eq!(ingestor.stats().dropped, 1);
/// ```
#[derive(Debug, Clone)]
pub struct Ingestor {
    store: Arc<StationStore>,
    counters: Arc<Counters>,
}

impl Ingestor {
    pub fn new(store: StationStore) -> Self {
        Self::with_store(Arc::new(store))
    }

    /// Feed an already shared store.
    pub fn with_store(store: Arc<StationStore>) -> Self {
        Self {
            store,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn store(&self) -> &Arc<StationStore> {
        &self.store
    }

    /// Ingest a payload received now.
    pub fn ingest(&self, payload: &[u8]) -> IngestOutcome {
        self.ingest_at(payload, Utc::now())
    }

    /// Ingest a payload received at `received_at`.
    ///
    /// Never fails: undecodable payloads are counted and dropped.
    pub fn ingest_at(&self, payload: &[u8], received_at: DateTime<Utc>) -> IngestOutcome {
        let reading = match Reading::decode(payload) {
            Ok(reading) => reading,
            Err(e) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(error = %e, bytes = payload.len(), "dropping payload");
                return IngestOutcome::Dropped(DropReason::from(&e));
            }
        };

        let validation = validate(&reading.temperature, &reading.humidity);
        let valid = validation.is_ok();
        let payload_timestamp = parse_iso(&reading.timestamp);
        if payload_timestamp.is_none() && !reading.timestamp.is_absent() {
            tracing::trace!(
                station = %reading.station_id,
                raw = %reading.timestamp,
                "unparseable timestamp"
            );
        }

        self.store.upsert(
            &reading.station_id,
            StationUpdate {
                temperature: reading.temperature,
                humidity: reading.humidity,
                validation,
                payload_timestamp,
                received_at,
            },
        );
        self.counters.accepted.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(station = %reading.station_id, valid, "reading accepted");

        IngestOutcome::Accepted {
            station_id: reading.station_id,
            valid,
        }
    }

    pub fn stats(&self) -> IngestStats {
        IngestStats {
            accepted: self.counters.accepted.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }
}
