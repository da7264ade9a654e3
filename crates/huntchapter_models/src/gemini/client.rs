//! Gemini text generation client.

use super::dto::{GenerateContentRequest, GenerateContentResponse, GenerationConfig};
use super::{DEFAULT_BASE_URL, api_key_from_env};
use crate::http::{client_with_timeout, snippet, transport_error};
use async_trait::async_trait;
use huntchapter_core::GenerationRequest;
use huntchapter_error::{BackendError, HuntChapterResult};
use huntchapter_interface::TextGenerator;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Gemini REST client producing raw scene text.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Default whole-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a client for `model` with an explicit API key.
    #[instrument(name = "gemini_client_new", skip_all)]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> HuntChapterResult<Self> {
        let model = model.into();
        debug!(model = %model, "Creating Gemini client");
        Ok(Self {
            http: client_with_timeout("gemini", Self::DEFAULT_TIMEOUT)?,
            api_key: api_key.into(),
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    /// Create a client reading `GEMINI_API_KEY` from the environment.
    pub fn from_env(model: impl Into<String>) -> HuntChapterResult<Self> {
        Self::new(api_key_from_env()?, model)
    }

    /// Point the client at another endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Change the whole-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> HuntChapterResult<Self> {
        self.http = client_with_timeout("gemini", timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(skip(self, request), fields(model = %self.model, attempt = request.attempt))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        let mut body = GenerateContentRequest::from_text(&request.prompt);
        if request.json_output {
            body = body.with_config(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                ..Default::default()
            });
        }

        debug!(prompt_length = request.prompt.len(), "Sending Gemini request");
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, "Gemini returned an error status");
            return Err(BackendError::unavailable(format!(
                "Gemini returned {}: {}",
                status,
                snippet(&text)
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| BackendError::unavailable(format!("Unreadable Gemini response: {}", e)))?;

        let text = parsed.text();
        if text.trim().is_empty() {
            warn!("Gemini returned no text");
            return Err(BackendError::unavailable("Gemini returned an empty response"));
        }

        debug!(response_length = text.len(), "Received Gemini response");
        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
