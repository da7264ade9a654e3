//! Clients for an HTTP generation relay.
//!
//! The relay accepts `{prompt}` and answers `{text}` or `{image}`, or an
//! error body `{error}` with a 4xx/5xx status; 504 means the upstream timed out.

use crate::http::{client_with_timeout, snippet, transport_error};
use async_trait::async_trait;
use huntchapter_core::{
    GenerationRequest, ImagePrompt, ImageRef, RelayErrorBody, RelayImageResponse, RelayRequest,
    RelayTextResponse,
};
use huntchapter_error::{BackendError, BackendErrorKind, HuntChapterResult, IllustrationError};
use huntchapter_interface::{ImageGenerator, TextGenerator};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Describe a failed relay response from its status and body.
fn relay_failure(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<RelayErrorBody>(body) {
        Ok(parsed) => match parsed.status {
            Some(upstream) => format!(
                "relay returned {} ({}, upstream status {})",
                status, parsed.error, upstream
            ),
            None => format!("relay returned {} ({})", status, parsed.error),
        },
        Err(_) => format!("relay returned {}: {}", status, snippet(body)),
    }
}

/// Text generation through a relay endpoint.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl RelayClient {
    /// Default whole-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a client for the relay at `base_url` (e.g. `http://localhost:8787`).
    pub fn new(base_url: impl Into<String>) -> HuntChapterResult<Self> {
        Ok(Self {
            http: client_with_timeout("relay", Self::DEFAULT_TIMEOUT)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    /// Change the whole-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> HuntChapterResult<Self> {
        self.http = client_with_timeout("relay", timeout)?;
        self.timeout = timeout;
        Ok(self)
    }
}

#[async_trait]
impl TextGenerator for RelayClient {
    #[instrument(skip(self, request), fields(relay = %self.base_url, attempt = request.attempt))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        let url = format!("{}/api/generate", self.base_url);
        debug!(prompt_length = request.prompt.len(), "Sending relay request");

        let response = self
            .http
            .post(&url)
            .json(&RelayRequest {
                prompt: request.prompt.clone(),
            })
            .send()
            .await
            .map_err(|e| transport_error(&e, self.timeout))?;

        let status = response.status();
        if status == StatusCode::GATEWAY_TIMEOUT {
            warn!("Relay reported an upstream timeout");
            return Err(BackendError::new(BackendErrorKind::Timeout {
                waited_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Relay returned an error status");
            return Err(BackendError::unavailable(relay_failure(status, &body)));
        }

        let parsed: RelayTextResponse = response
            .json()
            .await
            .map_err(|e| BackendError::unavailable(format!("Unreadable relay response: {}", e)))?;
        if parsed.text.trim().is_empty() {
            return Err(BackendError::unavailable("relay returned an empty response"));
        }
        Ok(parsed.text)
    }

    fn provider_name(&self) -> &'static str {
        "relay"
    }

    fn model_name(&self) -> &str {
        &self.base_url
    }
}

/// Image generation through a relay endpoint.
#[derive(Debug, Clone)]
pub struct RelayImageClient {
    http: reqwest::Client,
    base_url: String,
}

impl RelayImageClient {
    /// Create a client for the relay at `base_url`.
    pub fn new(base_url: impl Into<String>) -> HuntChapterResult<Self> {
        Ok(Self {
            http: client_with_timeout("relay images", Duration::from_secs(90))?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ImageGenerator for RelayImageClient {
    #[instrument(skip(self, prompt), fields(relay = %self.base_url))]
    async fn generate_image(&self, prompt: &ImagePrompt) -> Result<ImageRef, IllustrationError> {
        let url = format!("{}/api/generate-image", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&RelayRequest {
                prompt: prompt.text.clone(),
            })
            .send()
            .await
            .map_err(|e| IllustrationError::new(format!("Image relay request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IllustrationError::new(relay_failure(status, &body)));
        }

        let parsed: RelayImageResponse = response
            .json()
            .await
            .map_err(|e| IllustrationError::new(format!("Unreadable image response: {}", e)))?;
        if !parsed.image.starts_with("data:image/") {
            return Err(IllustrationError::new("relay image is not a data URI"));
        }
        Ok(ImageRef::new(parsed.image))
    }

    fn provider_name(&self) -> &'static str {
        "relay"
    }
}
