//! Dashboard settings.
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! settings file (TOML, YAML or JSON by extension), then environment
//! variables such as `BROKER_HOST` or `STATIONS=north,south`.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use weatherwatch_engine::{EngineConfig, LocalZone};

use crate::duration::parse_duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub broker_host: String,
    pub broker_port: u16,
    pub topic: String,
    pub client_id: String,
    pub nats_url: String,
    pub stale_after: String,
    pub rolling_window: String,
    pub buffer_capacity: usize,
    /// Hourly buckets kept per station; 0 keeps all of them.
    pub hourly_retention: usize,
    /// Fixed offset such as `+01:00` for day and hour bucketing.
    pub utc_offset: Option<String>,
    pub stations: Vec<String>,
    pub refresh: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            topic: "weather".to_string(),
            client_id: "weather_dashboard".to_string(),
            nats_url: "nats://localhost:4222".to_string(),
            stale_after: "30s".to_string(),
            rolling_window: "5m".to_string(),
            buffer_capacity: 2000,
            hourly_retention: 168,
            utc_offset: None,
            stations: Vec::new(),
            refresh: "250ms".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, environment())
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(env)
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")?;
        Ok(settings)
    }

    pub fn refresh_interval(&self) -> Result<Duration> {
        parse_duration(&self.refresh).with_context(|| format!("Invalid refresh: {}", self.refresh))
    }

    /// Build the engine configuration these settings describe.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let stale_after = parse_duration(&self.stale_after)
            .with_context(|| format!("Invalid stale_after: {}", self.stale_after))?;
        let rolling_window = parse_duration(&self.rolling_window)
            .with_context(|| format!("Invalid rolling_window: {}", self.rolling_window))?;
        let zone = match self.utc_offset.as_deref() {
            None | Some("") => LocalZone::System,
            Some(offset) => LocalZone::parse_offset(offset)
                .with_context(|| format!("Invalid utc_offset: {}", offset))?,
        };
        let retention = (self.hourly_retention > 0).then_some(self.hourly_retention);

        let config = EngineConfig::builder()
            .stale_after(stale_after)
            .rolling_window(rolling_window)
            .buffer_capacity(self.buffer_capacity)
            .hourly_retention(retention)
            .zone(zone)
            .stations(self.stations.iter().map(|s| s.trim()).filter(|s| !s.is_empty()))
            .build()?;
        Ok(config)
    }
}

fn environment() -> Environment {
    Environment::default()
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("stations")
}
