//! Data source abstraction for the dashboard.
//!
//! Every transport ends in the same place: an [`Ingestor`] feeding a
//! [`StationStore`](weatherwatch_engine::StationStore). The dashboard only
//! needs to read snapshots back out and learn whether the feed is healthy,
//! which is what [`DataSource`] exposes.

mod file;
mod stream;

pub use file::{replay, replay_reader, ReplaySummary};
pub use stream::spawn_line_feed;

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;
use weatherwatch_engine::{HourlyRollup, IngestStats, Ingestor, Snapshot};

/// Trait for reading station data into the TUI.
///
/// # Example
///
/// ```
/// use weatherwatch::{DataSource, FeedState, LiveSource};
/// use weatherwatch_engine::{Ingestor, StationStore};
///
/// let ingestor = Ingestor::new(StationStore::default());
/// ingestor.ingest(br#"{"stationId":"S1","temperature":20,"humidity":40}"#);
///
/// let mut source = LiveSource::new(ingestor, "example", FeedState::default());
/// let snapshot = source.poll().unwrap();
/// assert_eq!(snapshot.len(), 1);
/// ```
pub trait DataSource: Send + Debug {
    /// Take a snapshot of every station.
    ///
    /// Returns `None` when no data is available. Must not block.
    fn poll(&mut self) -> Option<Snapshot>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI header.
    fn description(&self) -> &str;

    /// Last error reported by the feed, if it is currently failing.
    fn error(&self) -> Option<String>;

    /// Ingestion counters.
    fn stats(&self) -> IngestStats;

    /// Retained hourly rollups for one station, oldest first.
    fn hourly(&self, station_id: &str) -> Vec<HourlyRollup>;
}

/// Shared health slot a feed task writes and the UI reads.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    error: Arc<Mutex<Option<String>>>,
}

impl FeedState {
    pub fn set_error(&self, message: impl Into<String>) {
        *self.error.lock() = Some(message.into());
    }

    pub fn clear(&self) {
        *self.error.lock() = None;
    }

    pub fn error(&self) -> Option<String> {
        self.error.lock().clone()
    }
}

/// A data source reading from a live store that some transport feeds.
#[derive(Debug)]
pub struct LiveSource {
    ingestor: Ingestor,
    description: String,
    feed: FeedState,
}

impl LiveSource {
    pub fn new(ingestor: Ingestor, description: &str, feed: FeedState) -> Self {
        Self {
            ingestor,
            description: description.to_string(),
            feed,
        }
    }

    pub fn ingestor(&self) -> &Ingestor {
        &self.ingestor
    }
}

impl DataSource for LiveSource {
    fn poll(&mut self) -> Option<Snapshot> {
        Some(self.ingestor.store().snapshot())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.feed.error()
    }

    fn stats(&self) -> IngestStats {
        self.ingestor.stats()
    }

    fn hourly(&self, station_id: &str) -> Vec<HourlyRollup> {
        self.ingestor.store().hourly(station_id).unwrap_or_default()
    }
}
