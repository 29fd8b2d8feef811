//! Prometheus exporter for Arvancloud usage.
//!
//! On every scrape the exporter runs each enabled product producer against
//! the Arvancloud API and exposes the result via an HTTP `/metrics` endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │  Arvancloud API │<────│    Producers    │<────│    Collector    │<──── HTTP scrape
//! │  (cdn, obs)     │     │  (per product)  │     │ (timing/success)│
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! Producers run sequentially in registration order. The first failing
//! producer ends the pass; every pass still reports
//! `arvancloud_scrape_collector_duration_seconds` and
//! `arvancloud_scrape_collector_success`.
//!
//! # Usage
//!
//! ```bash
//! arvancloud-exporter --config-file config.yml
//! arvancloud-exporter --token "Apikey ..." --with-cdn --with-object
//! ```
//!
//! # Configuration
//!
//! See [`config::ExporterConfig`] for configuration options.

pub mod cli;
pub mod client;
pub mod collector;
pub mod config;
pub mod context;
pub mod error;
pub mod exposition;
pub mod http;
pub mod metrics;
pub mod producer;
pub mod producers;
pub mod sink;

pub use collector::{Collector, CollectorBuilder, DEFAULT_TIMEOUT, ScrapeStats, SharedCollector};
pub use config::{ExporterConfig, LogFormat, LoggingConfig};
pub use context::CollectionContext;
pub use error::{CollectError, ExporterError};
pub use http::HttpServer;
pub use metrics::{Desc, Sample, ValueType};
pub use producer::Producer;
pub use sink::{DescriptorSink, MetricSet, SampleSink};

/// Initialize tracing with the given configuration.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), config::ConfigError> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            config::ConfigError::Validation(format!("Invalid log level {}: {}", config.level, e))
        })?,
    };

    let result = match config.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .try_init(),
    };

    result.map_err(|e| {
        config::ConfigError::Validation(format!("Failed to initialize tracing: {}", e))
    })
}
