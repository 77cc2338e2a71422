//! MQTT adapter.
//!
//! Connects with a clean session, subscribes to the configured topic and
//! every subtopic on each successful connection acknowledgement, and feeds
//! publish payloads to the ingestor. Connection errors are logged and
//! retried forever with [`Backoff`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use weatherwatch_adapters::mqtt::MqttAdapter;
//! use weatherwatch_engine::{Ingestor, StationStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = MqttAdapter::builder()
//!         .host("broker.local")
//!         .topic("weather")
//!         .build()?;
//!     adapter.run(Ingestor::new(StationStore::default())).await?;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use rumqttc::{AsyncClient, ConnectReturnCode, Event, MqttOptions, Packet, QoS};
use weatherwatch_engine::Ingestor;

use crate::{AdapterError, Backoff};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 1883;
pub const DEFAULT_TOPIC: &str = "weather";
pub const DEFAULT_CLIENT_ID: &str = "weather_dashboard";
pub const KEEP_ALIVE: Duration = Duration::from_secs(60);

/// Subscription filters for a base topic: the topic itself and all subtopics.
pub fn topic_filters(topic: &str) -> [String; 2] {
    let base = topic.trim_end_matches('/');
    [base.to_string(), format!("{}/#", base)]
}

/// MQTT subscriber feeding an [`Ingestor`].
#[derive(Debug, Clone)]
pub struct MqttAdapter {
    host: String,
    port: u16,
    client_id: String,
    topic: String,
    backoff: Backoff,
}

impl MqttAdapter {
    pub fn builder() -> MqttAdapterBuilder {
        MqttAdapterBuilder::default()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(KEEP_ALIVE);
        options.set_clean_session(true);
        options
    }

    /// Run the event loop until the task is aborted.
    pub async fn run(self, ingestor: Ingestor) -> Result<(), AdapterError> {
        let (client, mut eventloop) = AsyncClient::new(self.options(), 64);
        let filters = topic_filters(&self.topic);
        let mut backoff = self.backoff.clone();

        tracing::info!(
            host = %self.host,
            port = self.port,
            topic = %self.topic,
            "connecting to MQTT broker"
        );

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    if ack.code != ConnectReturnCode::Success {
                        tracing::warn!(code = ?ack.code, "broker refused connection");
                        continue;
                    }
                    backoff.reset();
                    tracing::info!(host = %self.host, "connected");
                    for filter in &filters {
                        client
                            .try_subscribe(filter.as_str(), QoS::AtLeastOnce)
                            .map_err(|e| AdapterError::Subscribe(e.to_string()))?;
                        tracing::info!(filter = %filter, "subscribed");
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let outcome = ingestor.ingest(&publish.payload);
                    tracing::trace!(topic = %publish.topic, ?outcome, "message");
                }
                Ok(_) => {}
                Err(e) => {
                    let delay = backoff.next_delay();
                    tracing::warn!(error = %e, retry_in = ?delay, "MQTT connection error");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Builder for [`MqttAdapter`].
#[derive(Debug, Default)]
pub struct MqttAdapterBuilder {
    host: Option<String>,
    port: Option<u16>,
    client_id: Option<String>,
    topic: Option<String>,
    backoff: Option<Backoff>,
}

impl MqttAdapterBuilder {
    /// Broker host (default: "localhost").
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Broker port (default: 1883).
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Client identifier (default: "weather_dashboard").
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Base topic (default: "weather").
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Reconnect policy (default: 1 s doubling to 30 s).
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = Some(backoff);
        self
    }

    pub fn build(self) -> Result<MqttAdapter, AdapterError> {
        let topic = self.topic.unwrap_or_else(|| DEFAULT_TOPIC.to_string());
        if topic.trim_end_matches('/').is_empty() || topic.contains(['#', '+']) {
            return Err(AdapterError::InvalidTopic(topic));
        }

        Ok(MqttAdapter {
            host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            client_id: self
                .client_id
                .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string()),
            topic,
            backoff: self.backoff.unwrap_or_default(),
        })
    }
}
