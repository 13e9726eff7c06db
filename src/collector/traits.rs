//! Core collector traits and types.

use crate::exposition::MetricRecord;
use crate::job::Job;
use thiserror::Error;

/// Errors that can occur during a scrape cycle.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Network I/O error (connect, write).
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    /// HTTP request failed before a response was received.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status.
    #[error("unexpected http status: {0}")]
    Status(u16),

    /// Timeout elapsed.
    #[error("timeout elapsed")]
    Timeout,

    /// Failed to serialize records.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

/// Confirmation of a forwarded batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// JSON payload written to the connection, without the trailing newline.
    pub payload: String,
}

impl std::fmt::Display for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Message sent: {}", self.payload)
    }
}

/// Source of raw exposition text.
///
/// A failed fetch skips the current cycle; it is never fatal to the worker.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync + 'static {
    /// Fetch the raw body of `job.url`.
    async fn fetch(&self, job: &Job) -> Result<String, CollectorError>;
}

/// Destination for parsed record batches.
#[async_trait::async_trait]
pub trait Forwarder: Send + Sync + 'static {
    /// Serialize `records` and send them to `address`.
    async fn forward(
        &self,
        address: &str,
        records: &[MetricRecord],
    ) -> Result<Delivery, CollectorError>;
}
