//! # weatherwatch-engine
//!
//! In-memory aggregation of weather station readings.
//!
//! Transports hand raw payload bytes to an [`Ingestor`], which decodes,
//! validates and timestamps each reading and folds it into a
//! [`StationStore`]. Renderers periodically take a [`Snapshot`] of every
//! station: formatted last values, a rolling average, daily extrema and a
//! liveness [`StationStatus`].
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use weatherwatch_engine::{EngineConfig, Ingestor, StationStatus, StationStore};
//!
//! let store = Arc::new(StationStore::new(EngineConfig::default()));
//! let ingestor = Ingestor::with_store(store.clone());
//!
//! // Transport side
//! ingestor.ingest(br#"{"stationId":"S1","temperature":"20.5","humidity":"50"}"#);
//!
//! // Render side
//! let snapshot = store.snapshot();
//! let s1 = snapshot.get("S1").unwrap();
//! assert_eq!(s1.status, StationStatus::Ok);
//! assert_eq!(s1.humidity, "50.0 %");
//! ```
//!
//! ## Concurrency
//!
//! All station state sits behind one `parking_lot` lock held only for the
//! in-memory fold or copy. Ingestion and snapshots may run on different
//! threads; a snapshot never observes a half-applied reading.

mod config;
mod error;
mod format;
mod ingest;
mod reading;
mod station;
mod store;
mod timestamp;
mod validate;

pub use config::{
    EngineConfig, EngineConfigBuilder, LocalZone, DEFAULT_BUFFER_CAPACITY,
    DEFAULT_HOURLY_RETENTION, DEFAULT_ROLLING_WINDOW, DEFAULT_STALE_AFTER,
};
pub use error::{ConfigError, DecodeError};
pub use format::{HUMIDITY_UNIT, NOT_AVAILABLE, TEMPERATURE_UNIT};
pub use ingest::{DropReason, IngestOutcome, IngestStats, Ingestor};
pub use reading::{RawValue, Reading};
pub use station::StationUpdate;
pub use store::StationStore;
pub use timestamp::{format_iso, parse_iso, parse_iso_str};
pub use validate::{validate, Validation};

// Re-export the view types so callers need only one dependency.
pub use weatherwatch_types::{
    Aggregate, DailyRollup, HourBucket, HourlyRollup, Range, Sample, Snapshot, StationStatus,
    StationView,
};
