//! Generation relay endpoints.
//!
//! Browsers and thin clients call these instead of holding an API key.

use super::{ApiError, AppState};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use huntchapter_core::{
    GenerationRequest, ImagePrompt, RelayImageResponse, RelayRequest, RelayTextResponse,
    hash_seed,
};
use huntchapter_interface::{ImageGenerator, TextGenerator};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Upstream models behind the relay.
#[derive(Clone, Default)]
pub struct RelayUpstream {
    text: Option<Arc<dyn TextGenerator>>,
    image: Option<Arc<dyn ImageGenerator>>,
}

impl std::fmt::Debug for RelayUpstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayUpstream")
            .field("text", &self.text.as_ref().map(|g| g.provider_name()))
            .field("image", &self.image.as_ref().map(|g| g.provider_name()))
            .finish()
    }
}

impl RelayUpstream {
    /// Relay without upstreams; every call answers 500.
    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Forward text prompts to `text`.
    pub fn with_text(mut self, text: Arc<dyn TextGenerator>) -> Self {
        self.text = Some(text);
        self
    }

    /// Forward image prompts to `image`.
    pub fn with_image(mut self, image: Arc<dyn ImageGenerator>) -> Self {
        self.image = Some(image);
        self
    }
}

fn prompt_of(body: Result<Json<RelayRequest>, JsonRejection>) -> Result<String, ApiError> {
    let Json(request) = body?;
    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::bad_request("Missing prompt"));
    }
    Ok(prompt.to_string())
}

fn missing_key() -> ApiError {
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Missing GEMINI_API_KEY")
}

/// `POST /api/generate`
#[instrument(skip_all)]
pub async fn generate_text(
    State(state): State<AppState>,
    body: Result<Json<RelayRequest>, JsonRejection>,
) -> Result<Json<RelayTextResponse>, ApiError> {
    let prompt = prompt_of(body)?;
    let upstream = state.relay.text.as_ref().ok_or_else(missing_key)?;

    debug!(prompt_length = prompt.len(), "Relaying text prompt");
    match upstream.generate(&GenerationRequest::new(prompt)).await {
        Ok(text) => Ok(Json(RelayTextResponse { text })),
        Err(e) => {
            warn!(error = %e.kind, "Upstream text generation failed");
            Err(ApiError::upstream(&e.kind))
        }
    }
}

/// `POST /api/generate-image`
#[instrument(skip_all)]
pub async fn generate_image(
    State(state): State<AppState>,
    body: Result<Json<RelayRequest>, JsonRejection>,
) -> Result<Json<RelayImageResponse>, ApiError> {
    let prompt = prompt_of(body)?;
    let upstream = state.relay.image.as_ref().ok_or_else(missing_key)?;

    debug!(prompt_length = prompt.len(), "Relaying image prompt");
    let image_prompt = ImagePrompt {
        seed: hash_seed(&prompt),
        text: prompt,
    };
    match upstream.generate_image(&image_prompt).await {
        Ok(image) if image.is_data_uri() => Ok(Json(RelayImageResponse {
            image: image.as_str().to_string(),
        })),
        Ok(_) => Err(ApiError::new(StatusCode::BAD_GATEWAY, "No image returned")),
        Err(e) => {
            warn!(error = %e, "Upstream image generation failed");
            let mut error = ApiError::new(StatusCode::BAD_GATEWAY, "Upstream error");
            error.body.body = Some(e.message);
            Err(error)
        }
    }
}
