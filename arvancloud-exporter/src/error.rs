//! Error types for the exporter.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors a producer can return from a collection pass.
///
/// These never fail a scrape; the collector turns them into
/// `arvancloud_scrape_collector_success 0` and a log line.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The request could not be sent or the response body not read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The response body did not match the expected shape.
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A sample was built with the wrong number of label values.
    #[error("Metric {metric} expects {expected} label values, got {got}")]
    InconsistentLabels {
        metric: String,
        expected: usize,
        got: usize,
    },

    /// Any other failure reported by a producer.
    #[error("{0}")]
    Upstream(String),
}

impl CollectError {
    /// Create an upstream error.
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }
}

/// Errors that abort exporter construction.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build API client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Result type alias using [`ExporterError`].
pub type Result<T> = std::result::Result<T, ExporterError>;
