//! HTTP client for the Sentinel Hub Process API.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client};
use tracing::{info, instrument};

use crate::auth::{fetch_token, truncate};
use crate::error::{SentinelHubError, SentinelHubResult};
use crate::process::CompositeRequest;

pub const DEFAULT_BASE_URL: &str = "https://services.sentinel-hub.com";
pub const DEFAULT_TOKEN_URL: &str =
    "https://services.sentinel-hub.com/auth/realms/main/protocol/openid-connect/token";

/// Something that can produce a composite PNG for a request.
///
/// The service talks to this trait so tests can substitute a canned source.
#[async_trait]
pub trait ImagerySource: Send + Sync {
    async fn fetch_composite(&self, request: &CompositeRequest) -> SentinelHubResult<Bytes>;
}

/// Connection settings for [`SentinelHubClient`].
#[derive(Debug, Clone)]
pub struct SentinelHubConfig {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
    pub token_url: String,
    /// Applies to both the token and the process request
    pub request_timeout: Duration,
}

impl SentinelHubConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }

    pub fn process_url(&self) -> String {
        format!("{}/api/v1/process", self.base_url.trim_end_matches('/'))
    }
}

pub struct SentinelHubClient {
    config: SentinelHubConfig,
    client: Client,
}

impl SentinelHubClient {
    pub fn new(config: SentinelHubConfig) -> SentinelHubResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl ImagerySource for SentinelHubClient {
    /// Fetch a fresh token, then run the process request.
    #[instrument(skip(self, request), fields(width = request.width, height = request.height))]
    async fn fetch_composite(&self, request: &CompositeRequest) -> SentinelHubResult<Bytes> {
        let token = fetch_token(
            &self.client,
            &self.config.token_url,
            &self.config.client_id,
            &self.config.client_secret,
        )
        .await?;

        let response = self
            .client
            .post(self.config.process_url())
            .bearer_auth(token)
            .header(header::ACCEPT, "image/png")
            .json(&request.to_process_body())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SentinelHubError::RemoteStatus {
                status: status.as_u16(),
                body: truncate(&body).to_string(),
            });
        }

        let bytes = response.bytes().await?;
        info!(size = bytes.len(), "Fetched satellite composite");
        Ok(bytes)
    }
}
