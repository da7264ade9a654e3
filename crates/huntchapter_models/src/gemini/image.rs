//! Gemini image generation client.

use super::dto::{GenerateContentRequest, GenerateContentResponse, GenerationConfig};
use super::{DEFAULT_BASE_URL, api_key_from_env};
use crate::http::{client_with_timeout, snippet};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use huntchapter_core::{ImagePrompt, ImageRef};
use huntchapter_error::{HuntChapterResult, IllustrationError};
use huntchapter_interface::ImageGenerator;
use std::time::Duration;
use tracing::{debug, instrument};

/// Gemini client returning inline PNG illustrations.
#[derive(Debug, Clone)]
pub struct GeminiImageClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiImageClient {
    /// Image model used unless configured otherwise.
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash-image";

    /// Create a client for `model` with an explicit API key.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> HuntChapterResult<Self> {
        Ok(Self {
            http: client_with_timeout("gemini images", Duration::from_secs(90))?,
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
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
}

#[async_trait]
impl ImageGenerator for GeminiImageClient {
    #[instrument(skip(self, prompt), fields(model = %self.model, seed = prompt.seed))]
    async fn generate_image(&self, prompt: &ImagePrompt) -> Result<ImageRef, IllustrationError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateContentRequest::from_text(&prompt.text).with_config(GenerationConfig {
            response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
            ..Default::default()
        });
        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| IllustrationError::new(format!("Image request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IllustrationError::new(format!(
                "Gemini image returned {}: {}",
                status,
                snippet(&text)
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| IllustrationError::new(format!("Unreadable image response: {}", e)))?;

        let inline = parsed
            .inline_image()
            .ok_or_else(|| IllustrationError::new("No image from upstream"))?;
        let bytes = STANDARD
            .decode(&inline.data)
            .map_err(|e| IllustrationError::new(format!("Image payload is not base64: {}", e)))?;

        debug!(bytes = bytes.len(), "Received Gemini illustration");
        let mime_type = inline.mime_type.as_deref().unwrap_or("image/png");
        Ok(ImageRef::from_base64(mime_type, &inline.data))
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}
