//! `reqwest`-backed [`HttpTransport`].

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::transport::{ApiRequest, ApiResponse, BoxFuture, HttpTransport};

const PROVIDER_NAME: &str = "google";

/// HTTP transport over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with the given request timeout.
    pub fn new(timeout: Duration) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("worklocation/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self { http_client })
    }

    async fn send(&self, request: ApiRequest) -> ProviderResult<ApiResponse> {
        let response = self
            .http_client
            .get(&request.url)
            .bearer_auth(&request.bearer_token)
            .query(&request.query)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %request.url, error = %e, "calendar request failed");
                let error = if e.is_timeout() {
                    ProviderError::timeout("request timeout")
                } else if e.is_connect() {
                    ProviderError::transient(format!("connection failed: {}", e))
                } else {
                    ProviderError::transient(format!("request failed: {}", e))
                };
                error.with_provider(PROVIDER_NAME).with_source(e)
            })?;

        let status = response.status().as_u16();

        let body = response.text().await.map_err(|e| {
            ProviderError::transient(format!("failed to read response: {}", e))
                .with_provider(PROVIDER_NAME)
                .with_status(status)
                .with_source(e)
        })?;

        debug!(status, bytes = body.len(), "calendar response received");
        Ok(ApiResponse::new(status, body))
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, request: ApiRequest) -> BoxFuture<'_, ProviderResult<ApiResponse>> {
        Box::pin(self.send(request))
    }
}
