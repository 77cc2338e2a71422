//! # weatherwatch-adapters
//!
//! Transport adapters that subscribe to a message bus and hand every payload
//! to a [`weatherwatch_engine::Ingestor`].
//!
//! ## Supported Systems
//!
//! - **MQTT** (`mqtt` feature) - subscribes to `<topic>` and `<topic>/#` at
//!   QoS 1, resubscribing after every reconnect
//! - **NATS** (`nats` feature) - subscribes to `<subject>` and `<subject>.>`
//!
//! ## Quick Start (MQTT)
//!
//! ```rust,ignore
//! use weatherwatch_adapters::mqtt::MqttAdapter;
//! use weatherwatch_engine::{Ingestor, StationStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ingestor = Ingestor::new(StationStore::default());
//!     let adapter = MqttAdapter::builder()
//!         .host("localhost")
//!         .port(1883)
//!         .topic("weather")
//!         .build()?;
//!
//!     // Runs until the task is aborted.
//!     adapter.run(ingestor).await?;
//!     Ok(())
//! }
//! ```

pub mod backoff;
pub mod error;

#[cfg(feature = "mqtt")]
pub mod mqtt;

#[cfg(feature = "nats")]
pub mod nats;

pub use backoff::Backoff;
pub use error::AdapterError;

// Re-export the ingestion entry point for convenience
pub use weatherwatch_engine::{IngestOutcome, Ingestor};
