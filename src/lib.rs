//! # weatherwatch
//!
//! A live console dashboard for weather station readings.
//!
//! Stations publish small JSON payloads to a message bus. The dashboard
//! subscribes, feeds every payload through the
//! [`weatherwatch_engine::Ingestor`] and redraws a per-station table a few
//! times per second: latest values, rolling averages, timestamps and a
//! liveness status.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  MQTT | NATS | TCP | stdin | replay file                    │
//! │                 │                                           │
//! │                 ▼                                           │
//! │  ┌──────────┐  ingest   ┌──────────────┐                    │
//! │  │ Ingestor │──────────▶│ StationStore │                    │
//! │  └──────────┘           └──────┬───────┘                    │
//! │                                │ snapshot                   │
//! │  ┌─────────┐    ┌─────────┐    ▼                            │
//! │  │   ui    │◀───│   app   │◀── source (DataSource)          │
//! │  └─────────┘    └─────────┘                                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation and export
//! - **[`source`]**: The [`DataSource`] trait, line-oriented feeds and replay
//! - **[`settings`]**: Layered settings (defaults, file, environment)
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Subscribe to the local MQTT broker
//! weatherwatch
//!
//! # Read newline-delimited JSON from a TCP endpoint
//! weatherwatch --transport tcp --connect localhost:9000
//!
//! # Replay a capture and export the resulting state
//! weatherwatch --replay readings.jsonl --export state.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use std::time::Duration;
//! use weatherwatch::{App, FeedState, LiveSource};
//! use weatherwatch_engine::{Ingestor, StationStore};
//!
//! let ingestor = Ingestor::new(StationStore::default());
//! let source = LiveSource::new(ingestor.clone(), "example", FeedState::default());
//! let app = App::new(Box::new(source), Duration::from_secs(300));
//! ```

pub mod app;
pub mod duration;
pub mod events;
pub mod settings;
pub mod source;
pub mod ui;

pub use app::App;
pub use settings::Settings;
pub use source::{
    replay, replay_reader, spawn_line_feed, DataSource, FeedState, LiveSource, ReplaySummary,
};
