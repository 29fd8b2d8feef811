//! CDN usage producer.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::client::ApiClient;
use crate::context::CollectionContext;
use crate::error::CollectError;
use crate::metrics::{Desc, NAMESPACE, build_fq_name};
use crate::producer::Producer;

const SUBSYSTEM: &str = "cdn";

#[derive(Debug, Deserialize)]
struct DomainList {
    data: Vec<Domain>,
}

#[derive(Debug, Deserialize)]
struct Domain {
    name: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct TrafficReport {
    data: TrafficData,
}

#[derive(Debug, Deserialize)]
struct TrafficData {
    statistics: Statistics,
}

#[derive(Debug, Deserialize)]
struct Statistics {
    #[serde(default)]
    traffics: Totals,
    #[serde(default)]
    requests: Totals,
}

#[derive(Debug, Default, Deserialize)]
struct Totals {
    #[serde(default)]
    total: f64,
    #[serde(default)]
    saved: f64,
}

/// Collects per-domain traffic and request totals from the CDN API.
pub struct CdnProducer {
    client: ApiClient,
    report_period: String,
    domains: Arc<Desc>,
    domain_up: Arc<Desc>,
    traffic: Arc<Desc>,
    traffic_saved: Arc<Desc>,
    requests: Arc<Desc>,
    requests_saved: Arc<Desc>,
}

impl CdnProducer {
    /// Create a producer reporting traffic over `report_period` (e.g. "1h").
    pub fn new(client: ApiClient, report_period: impl Into<String>) -> Self {
        let name = |n: &str| build_fq_name(NAMESPACE, SUBSYSTEM, n);

        Self {
            client,
            report_period: report_period.into(),
            domains: Desc::new(name("domains"), "Number of CDN domains", &[]),
            domain_up: Desc::new(
                name("domain_up"),
                "Whether the CDN domain is active",
                &["domain", "status"],
            ),
            traffic: Desc::new(
                name("traffic_bytes"),
                "Traffic served for the domain over the report period",
                &["domain"],
            ),
            traffic_saved: Desc::new(
                name("traffic_saved_bytes"),
                "Traffic served from cache over the report period",
                &["domain"],
            ),
            requests: Desc::new(
                name("requests"),
                "Requests served for the domain over the report period",
                &["domain"],
            ),
            requests_saved: Desc::new(
                name("requests_saved"),
                "Requests served from cache over the report period",
                &["domain"],
            ),
        }
    }
}

#[async_trait]
impl Producer for CdnProducer {
    fn name(&self) -> &'static str {
        "cdn"
    }

    fn describe(&self) -> Vec<Arc<Desc>> {
        vec![
            Arc::clone(&self.domains),
            Arc::clone(&self.domain_up),
            Arc::clone(&self.traffic),
            Arc::clone(&self.traffic_saved),
            Arc::clone(&self.requests),
            Arc::clone(&self.requests_saved),
        ]
    }

    async fn collect(&self, ctx: &mut CollectionContext<'_>) -> Result<(), CollectError> {
        let list: DomainList = self
            .client
            .get_json("/cdn/4.0/domains", ctx.token())
            .await?;

        ctx.gauge(&self.domains, list.data.len() as f64, &[])?;

        for domain in &list.data {
            let up = if domain.status == "active" { 1.0 } else { 0.0 };
            let name = domain.name.as_str();
            ctx.gauge(&self.domain_up, up, &[name, domain.status.as_str()])?;

            let path = format!(
                "/cdn/4.0/domains/{}/reports/traffics?period={}",
                domain.name, self.report_period
            );
            let report: TrafficReport = self.client.get_json(&path, ctx.token()).await?;
            let stats = report.data.statistics;

            ctx.gauge(&self.traffic, stats.traffics.total, &[name])?;
            ctx.gauge(&self.traffic_saved, stats.traffics.saved, &[name])?;
            ctx.gauge(&self.requests, stats.requests.total, &[name])?;
            ctx.gauge(&self.requests_saved, stats.requests.saved, &[name])?;
        }

        debug!(domains = list.data.len(), "Collected CDN metrics");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producers::testing::spawn_mock_api;
    use crate::sink::MetricSet;
    use axum::Router;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::time::Duration;

    fn mock_router() -> Router {
        Router::new()
            .route(
                "/cdn/4.0/domains",
                get(|headers: HeaderMap| async move {
                    let token = headers.get("authorization").and_then(|v| v.to_str().ok());
                    if token != Some("Apikey test") {
                        return Err(StatusCode::UNAUTHORIZED);
                    }
                    Ok(axum::Json(json!({
                        "data": [
                            { "id": "1", "name": "example.com", "status": "active" },
                            { "id": "2", "name": "parked.ir", "status": "pending" }
                        ]
                    })))
                }),
            )
            .route(
                "/cdn/4.0/domains/:name/reports/traffics",
                get(traffic_report),
            )
    }

    async fn traffic_report(
        Path(name): Path<String>,
        Query(q): Query<HashMap<String, String>>,
    ) -> axum::Json<Value> {
        let scale = if name == "example.com" { 10.0 } else { 1.0 };
        let period = q.get("period").cloned().unwrap_or_default();
        axum::Json(json!({
            "data": {
                "period": period,
                "statistics": {
                    "traffics": { "total": 1000.0 * scale, "saved": 400.0 * scale },
                    "requests": { "total": 50.0 * scale, "saved": 20.0 * scale }
                }
            }
        }))
    }

    async fn producer_for(router: Router) -> CdnProducer {
        let base = spawn_mock_api(router).await;
        let client = ApiClient::new(&base, Duration::from_secs(2)).unwrap();
        CdnProducer::new(client, "1h")
    }

    #[test]
    fn test_describe_is_stable() {
        let client = ApiClient::new("http://localhost", Duration::from_secs(1)).unwrap();
        let producer = CdnProducer::new(client, "1h");

        let first: Vec<_> = producer.describe().iter().map(|d| d.fq_name().to_string()).collect();
        let second: Vec<_> = producer.describe().iter().map(|d| d.fq_name().to_string()).collect();

        assert_eq!(first, second);
        assert_eq!(first[0], "arvancloud_cdn_domains");
        assert!(first.contains(&"arvancloud_cdn_traffic_bytes".to_string()));
    }

    #[tokio::test]
    async fn test_collect_domains() {
        let producer = producer_for(mock_router()).await;
        let mut set = MetricSet::new();

        let mut ctx = CollectionContext::new(&mut set, "Apikey test");
        producer.collect(&mut ctx).await.unwrap();
        drop(ctx);

        assert_eq!(set.value_of("arvancloud_cdn_domains"), Some(2.0));

        let up: Vec<_> = set
            .by_name("arvancloud_cdn_domain_up")
            .map(|s| (s.label_values()[0].clone(), s.value()))
            .collect();
        assert_eq!(
            up,
            vec![("example.com".to_string(), 1.0), ("parked.ir".to_string(), 0.0)]
        );

        let traffic = set
            .by_name("arvancloud_cdn_traffic_bytes")
            .find(|s| s.label_values()[0] == "example.com")
            .unwrap();
        assert_eq!(traffic.value(), 10000.0);
        assert_eq!(set.by_name("arvancloud_cdn_requests_saved").count(), 2);
    }

    #[tokio::test]
    async fn test_collect_unauthorized() {
        let producer = producer_for(mock_router()).await;
        let mut set = MetricSet::new();

        let mut ctx = CollectionContext::new(&mut set, "Apikey wrong");
        let err = producer.collect(&mut ctx).await.unwrap_err();
        drop(ctx);

        assert!(matches!(
            err,
            CollectError::Status { status, .. } if status == StatusCode::UNAUTHORIZED
        ));
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_collect_malformed_report_keeps_earlier_samples() {
        let router = Router::new()
            .route(
                "/cdn/4.0/domains",
                get(|| async {
                    axum::Json(json!({ "data": [{ "name": "example.com", "status": "active" }] }))
                }),
            )
            .route(
                "/cdn/4.0/domains/:name/reports/traffics",
                get(|| async { axum::Json(json!({ "unexpected": Value::Null })) }),
            );
        let producer = producer_for(router).await;
        let mut set = MetricSet::new();

        let mut ctx = CollectionContext::new(&mut set, "Apikey test");
        let err = producer.collect(&mut ctx).await.unwrap_err();
        drop(ctx);

        assert!(matches!(err, CollectError::Decode { .. }));
        assert_eq!(set.value_of("arvancloud_cdn_domains"), Some(1.0));
        assert_eq!(set.value_of("arvancloud_cdn_domain_up"), Some(1.0));
        assert_eq!(set.value_of("arvancloud_cdn_traffic_bytes"), None);
    }
}
