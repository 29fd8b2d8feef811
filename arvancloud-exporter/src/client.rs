//! HTTP client for the Arvancloud REST API.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::{CollectError, ExporterError};

/// Thin wrapper around [`reqwest::Client`] bound to one API base URL.
///
/// The timeout applies to every request made through this client. Cloning
/// is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ExporterError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("arvancloud-exporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ExporterError::Client)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and decode the JSON body.
    ///
    /// `token` is sent as the `Authorization` header when non-empty.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> Result<T, CollectError> {
        let url = format!("{}{}", self.base_url, path);
        trace!(%url, "Requesting");

        let mut request = self.http.get(&url).header(ACCEPT, "application/json");
        if !token.is_empty() {
            request = request.header(AUTHORIZATION, token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CollectError::Status { url, status });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| CollectError::Decode { url, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("https://napi.arvancloud.ir/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "https://napi.arvancloud.ir");
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = ApiClient::new(
            &format!("http://127.0.0.1:{}", port),
            Duration::from_millis(500),
        )
        .unwrap();
        let result: Result<serde_json::Value, _> = client.get_json("/cdn/4.0/domains", "").await;
        assert!(matches!(result, Err(CollectError::Http(_))));
    }
}
