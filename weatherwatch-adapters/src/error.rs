//! Error types for adapters.

use thiserror::Error;

/// Errors that can stop an adapter.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Connection failed or was lost for good.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Subscription request was rejected.
    #[error("Subscribe failed: {0}")]
    Subscribe(String),

    /// Topic or subject cannot be subscribed to.
    #[error("Invalid topic: {0:?}")]
    InvalidTopic(String),
}
