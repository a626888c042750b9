use crate::domain::ports::{HttpResponse, Transport};
use crate::utils::error::{FeedError, FetchFailure, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// reqwest 實作的 [`Transport`]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wp-feed/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn network_failure(e: reqwest::Error) -> FetchFailure {
    let name = if e.is_timeout() {
        "TimeoutError"
    } else if e.is_connect() {
        "ConnectError"
    } else {
        "NetworkError"
    };
    FetchFailure::network(name, e.to_string())
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, uri: &str) -> std::result::Result<HttpResponse, FetchFailure> {
        tracing::debug!("Making API request to: {}", uri);
        let response = self.client.get(uri).send().await.map_err(network_failure)?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        let body = response.text().await.map_err(network_failure)?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}
