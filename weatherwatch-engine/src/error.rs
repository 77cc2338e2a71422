//! Error types for the engine.
//!
//! None of these ever escape the ingestion path: decode failures become a
//! dropped message, configuration failures surface when the engine is built.

use thiserror::Error;

/// Reasons an inbound payload could not be attributed to a station.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Payload is not valid JSON.
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload is JSON but not an object.
    #[error("payload is not a JSON object")]
    NotAnObject,

    /// `stationId` is missing or not a string.
    #[error("payload has no text stationId")]
    MissingStationId,

    /// A measurement is a boolean, array or object.
    #[error("{0} is neither a number nor a string")]
    UnsupportedValue(&'static str),
}

/// Invalid engine configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The sample buffer must hold at least one entry.
    #[error("buffer capacity must be greater than zero")]
    ZeroCapacity,

    /// The rolling average window must be non-zero.
    #[error("rolling window must be greater than zero")]
    ZeroWindow,

    /// The staleness threshold must be non-zero.
    #[error("staleness threshold must be greater than zero")]
    ZeroStaleness,

    /// A retention limit, when set, must keep at least one hour.
    #[error("hourly retention must keep at least one bucket")]
    ZeroRetention,

    /// A duration does not fit chrono's range.
    #[error("duration out of range: {0}")]
    DurationOutOfRange(String),
}
