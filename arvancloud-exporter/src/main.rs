//! Prometheus exporter for Arvancloud.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};

use arvancloud_exporter::cli::Args;
use arvancloud_exporter::{Collector, HttpServer, LoggingConfig, init_tracing};

/// Exit status when the configuration cannot be loaded.
const EXIT_CONFIG: i32 = 3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            let logging = LoggingConfig {
                level: args.log_level.clone().unwrap_or_else(|| "info".to_string()),
                format: args.log_format.unwrap_or_default(),
            };
            let _ = init_tracing(&logging);
            error!(error = %e, "Could not load config");
            std::process::exit(EXIT_CONFIG);
        }
    };

    init_tracing(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Welcome to Arvancloud Prometheus Exporter"
    );

    if config.token.is_empty() && (config.products.cdn || config.products.object_storage) {
        warn!("No API token configured, upstream requests will be unauthenticated");
    }

    let collector = Arc::new(
        Collector::builder(&config)
            .with_timeout(config.api.timeout())
            .with_products(&config)
            .build()?,
    );

    let listen_addr: SocketAddr = config
        .http
        .listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;

    // Bind before spawning so a busy port fails startup
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", listen_addr))?;

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let http_server = HttpServer::new(collector.clone(), config.http.path.clone());
    let mut http_task = tokio::spawn(http_server.serve(listener, shutdown_rx));

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = async {
            #[cfg(unix)]
            {
                match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                    }
                    Err(e) => {
                        warn!("Failed to install SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
            }
        } => {
            info!("Received SIGTERM, shutting down...");
        }
        result = &mut http_task => {
            let err = match result {
                Ok(Ok(())) => anyhow::anyhow!("HTTP server stopped unexpectedly"),
                Ok(Err(e)) => e,
                Err(e) => anyhow::anyhow!("HTTP server task failed: {}", e),
            };
            error!(error = %err, "HTTP server error");
            return Err(err);
        }
    }

    let _ = shutdown_tx.send(true);

    let _ = tokio::time::timeout(Duration::from_secs(5), http_task).await;

    let stats = collector.stats();
    info!(
        passes_total = stats.passes_total,
        passes_failed = stats.passes_failed,
        "Final statistics"
    );

    info!("Exporter stopped");
    Ok(())
}
