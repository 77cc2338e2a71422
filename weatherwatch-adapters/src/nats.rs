//! NATS adapter.
//!
//! Subscribes to a subject and every subject beneath it, and feeds each
//! message payload to the ingestor.
//!
//! ## Example
//!
//! ```rust,no_run
//! use weatherwatch_adapters::nats::NatsAdapter;
//! use weatherwatch_engine::{Ingestor, StationStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = NatsAdapter::builder()
//!         .url("nats://localhost:4222")
//!         .subject("weather")
//!         .build()?;
//!     adapter.run(Ingestor::new(StationStore::default())).await?;
//!     Ok(())
//! }
//! ```

use futures_util::stream::{self, StreamExt};
use weatherwatch_engine::Ingestor;

use crate::AdapterError;

pub const DEFAULT_URL: &str = "nats://localhost:4222";
pub const DEFAULT_SUBJECT: &str = "weather";

/// Subscription subjects for a base subject: the subject itself and all below it.
pub fn subject_filters(subject: &str) -> [String; 2] {
    let base = subject.trim_end_matches('.');
    [base.to_string(), format!("{}.>", base)]
}

/// NATS subscriber feeding an [`Ingestor`].
#[derive(Debug, Clone)]
pub struct NatsAdapter {
    url: String,
    subject: String,
}

impl NatsAdapter {
    pub fn builder() -> NatsAdapterBuilder {
        NatsAdapterBuilder::default()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Connect, subscribe and forward messages until the connection closes.
    pub async fn run(self, ingestor: Ingestor) -> Result<(), AdapterError> {
        let client = async_nats::connect(&self.url)
            .await
            .map_err(|e| AdapterError::Connection(e.to_string()))?;
        tracing::info!(url = %self.url, "connected to NATS");

        let [exact, nested] = subject_filters(&self.subject);
        let exact = client
            .subscribe(exact)
            .await
            .map_err(|e| AdapterError::Subscribe(e.to_string()))?;
        let nested = client
            .subscribe(nested)
            .await
            .map_err(|e| AdapterError::Subscribe(e.to_string()))?;
        tracing::info!(subject = %self.subject, "subscribed");

        let mut messages = stream::select(exact, nested);
        while let Some(message) = messages.next().await {
            let outcome = ingestor.ingest(&message.payload);
            tracing::trace!(subject = %message.subject, ?outcome, "message");
        }

        tracing::warn!(url = %self.url, "NATS subscription closed");
        Ok(())
    }
}

/// Builder for [`NatsAdapter`].
#[derive(Debug, Default)]
pub struct NatsAdapterBuilder {
    url: Option<String>,
    subject: Option<String>,
}

impl NatsAdapterBuilder {
    /// Server URL (default: "nats://localhost:4222").
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Base subject (default: "weather").
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn build(self) -> Result<NatsAdapter, AdapterError> {
        let subject = self.subject.unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
        if subject.trim_end_matches('.').is_empty()
            || subject.contains(['*', '>'])
            || subject.contains(char::is_whitespace)
        {
            return Err(AdapterError::InvalidTopic(subject));
        }

        Ok(NatsAdapter {
            url: self.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
            subject,
        })
    }
}
