//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ExporterConfig, LogFormat};
use crate::error::Result;

/// Prometheus exporter for Arvancloud.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "arvancloud-exporter")]
#[command(about = "Export Arvancloud CDN and Object Storage usage as Prometheus metrics")]
#[command(version)]
pub struct Args {
    /// Config file to load (YAML, or JSON5 with a .json5 extension).
    #[arg(long)]
    pub config_file: Option<PathBuf>,

    /// Log format (overrides config).
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Log level: trace, debug, info, warn, error (overrides config).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to answer metrics requests on (overrides config).
    #[arg(long)]
    pub path: Option<String>,

    /// Authentication token for the API (overrides config).
    #[arg(long)]
    pub token: Option<String>,

    /// Address to listen on, `host:port` or `:port` (overrides config).
    #[arg(long, alias = "port")]
    pub listen: Option<String>,

    /// Timeout in seconds for API requests (overrides config).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Retrieve CDN metrics.
    #[arg(long)]
    pub with_cdn: bool,

    /// Retrieve Object Storage metrics.
    #[arg(long)]
    pub with_object: bool,
}

impl Args {
    /// Build the effective configuration.
    ///
    /// The config file, when given, is loaded first. Flags that were passed
    /// override its values and product flags are OR-ed with its switches.
    pub fn load_config(&self) -> Result<ExporterConfig> {
        let mut config = match &self.config_file {
            Some(path) => ExporterConfig::load_from_file(path)?,
            None => ExporterConfig::default(),
        };

        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut ExporterConfig) {
        if let Some(token) = &self.token {
            config.token = token.clone();
        }
        if let Some(path) = &self.path {
            config.http.path = path.clone();
        }
        if let Some(listen) = &self.listen {
            config.http.listen = listen_address(listen);
        }
        if let Some(timeout) = self.timeout {
            config.api.timeout_secs = timeout;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }

        config.products.cdn |= self.with_cdn;
        config.products.object_storage |= self.with_object;
    }
}

/// Expand a bare `:port` into an address on all interfaces.
fn listen_address(value: &str) -> String {
    if value.starts_with(':') {
        format!("0.0.0.0{}", value)
    } else {
        value.to_string()
    }
}
