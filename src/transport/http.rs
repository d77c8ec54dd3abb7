use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tokio::time::timeout;

use crate::city::{City, CityDraft, RecordId};
use crate::config::ApiConfig;

use super::error::TransportError;
use super::CityTransport;

/// Timeouts applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Whole exchange, from send to last body byte.
    pub request: Duration,
    pub connect: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for TimeoutConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            request: Duration::from_secs(api.timeout_seconds.into()),
            connect: Duration::from_secs(api.connect_timeout_seconds.into()),
        }
    }
}

/// reqwest-backed transport for the `/cities` JSON API.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    timeouts: TimeoutConfig,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeouts: TimeoutConfig) -> Result<Self, TransportError> {
        let parsed = Url::parse(base_url).map_err(|e| TransportError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeouts,
        })
    }

    pub fn from_config(api: &ApiConfig) -> Result<Self, TransportError> {
        Self::new(&api.base_url, TimeoutConfig::from(api))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the request under the request timeout and returns the body of a
    /// 2xx response.
    async fn send(&self, url: &str, builder: RequestBuilder) -> Result<Vec<u8>, TransportError> {
        let exchange = async {
            let response = builder
                .send()
                .await
                .map_err(|e| TransportError::Connection {
                    url: url.to_string(),
                    source: e,
                })?;

            let status = response.status();
            if !status.is_success() {
                let message = response
                    .text()
                    .await
                    .ok()
                    .filter(|body| !body.trim().is_empty())
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.bytes().await.map_err(TransportError::Body)?;
            Ok(body.to_vec())
        };

        match timeout(self.timeouts.request, exchange).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                duration: self.timeouts.request.as_secs(),
            }),
        }
    }

    async fn get_json<V: DeserializeOwned>(&self, path: &str) -> Result<V, TransportError> {
        let url = self.url(path);
        let body = self.send(&url, self.client.get(&url)).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl CityTransport for HttpTransport {
    async fn fetch_all(&self) -> Result<Vec<City>, TransportError> {
        self.get_json("/cities").await
    }

    async fn fetch_one(&self, id: RecordId) -> Result<City, TransportError> {
        self.get_json(&format!("/cities/{}", id)).await
    }

    async fn create(&self, draft: &CityDraft) -> Result<City, TransportError> {
        let url = self.url("/cities");
        let body = self.send(&url, self.client.post(&url).json(draft)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn delete(&self, id: RecordId) -> Result<(), TransportError> {
        let url = self.url(&format!("/cities/{}", id));
        self.send(&url, self.client.delete(&url)).await?;
        Ok(())
    }
}
