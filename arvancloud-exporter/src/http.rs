//! HTTP server for the Prometheus metrics endpoint.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::collector::SharedCollector;
use crate::exposition;

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    collector: SharedCollector,
    metrics_path: String,
}

/// Create the HTTP router.
fn create_router(collector: SharedCollector, metrics_path: &str) -> Router {
    let state = AppState {
        collector,
        metrics_path: metrics_path.to_string(),
    };

    Router::new()
        .route(metrics_path, get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/", get(index_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for the metrics endpoint.
///
/// Runs one collection pass per request. A failed pass still answers 200;
/// the failure is visible through `arvancloud_scrape_collector_success`.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    let set = state.collector.scrape().await;
    let body = exposition::render(set.samples());

    (
        StatusCode::OK,
        [("content-type", exposition::CONTENT_TYPE)],
        body,
    )
        .into_response()
}

/// Handler for the /health endpoint.
async fn health_handler() -> Response {
    (StatusCode::OK, "ok").into_response()
}

/// Handler for the /ready endpoint.
async fn ready_handler(State(state): State<AppState>) -> Response {
    let stats = state.collector.stats();

    // Ready once the most recent pass reached the API successfully
    match stats.last_success {
        Some(true) => (StatusCode::OK, "ready\n").into_response(),
        Some(false) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "not ready - last scrape failed\n",
        )
            .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "not ready - no scrape yet\n",
        )
            .into_response(),
    }
}

/// Landing page linking to the metrics path.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>
<head><title>Arvancloud Exporter</title></head>
<body>
<h1>Arvancloud Exporter</h1>
<p><a href=\"{}\">Metrics</a></p>
</body>
</html>",
        state.metrics_path
    ))
}

/// HTTP server configuration.
pub struct HttpServer {
    collector: SharedCollector,
    metrics_path: String,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(collector: SharedCollector, metrics_path: String) -> Self {
        Self {
            collector,
            metrics_path,
        }
    }

    /// Serve on an already bound listener until the shutdown signal is received.
    pub async fn serve(
        self,
        listener: tokio::net::TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<()> {
        let router = create_router(self.collector, &self.metrics_path);
        let addr = listener.local_addr()?;

        info!(
            addr = %addr,
            path = %self.metrics_path,
            "HTTP server listening"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                loop {
                    if shutdown.changed().await.is_err() {
                        break;
                    }
                    if *shutdown.borrow() {
                        break;
                    }
                }
                info!("HTTP server shutting down");
            })
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

        info!("HTTP server stopped");
        Ok(())
    }
}
