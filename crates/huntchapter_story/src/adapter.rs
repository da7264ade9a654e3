//! Generation adapter: one backend behind "next validated scene".

use crate::{parse_json, validate};
use huntchapter_core::{GenerationRequest, PromptPayload, SceneContent};
use huntchapter_error::{BackendError, BackendErrorKind, ValidationError};
use huntchapter_interface::TextGenerator;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Corrective retries allowed after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Prompt re-sent after `error`, restating the required shape.
///
/// # Examples
///
/// ```
/// use huntchapter_core::{PromptPayload, SceneRole};
/// use huntchapter_error::{ValidationError, ValidationErrorKind};
/// use huntchapter_story::corrective_prompt;
///
/// let prompt = PromptPayload {
///     text: "Write scene 2.".to_string(),
///     role: SceneRole::Normal,
///     position: 2,
///     shape: "{ \"narration\": \"...\" }".to_string(),
/// };
/// let error = ValidationError::new("narration", ValidationErrorKind::Empty);
/// let text = corrective_prompt(&prompt, &error);
/// assert!(text.starts_with("Write scene 2."));
/// assert!(text.contains("`narration`: must not be empty"));
/// ```
pub fn corrective_prompt(prompt: &PromptPayload, error: &ValidationError) -> String {
    format!(
        "{}\n\nIMPORTANT: your previous response was rejected ({}). Respond ONLY with one JSON object for a {} scene, in exactly this shape:\n{}",
        prompt.text,
        error.describe(),
        prompt.role,
        prompt.shape
    )
}

/// Wraps one text backend with extraction, validation and bounded retries.
#[derive(Clone)]
pub struct GenerationAdapter {
    generator: Arc<dyn TextGenerator>,
    max_retries: u32,
}

impl std::fmt::Debug for GenerationAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationAdapter")
            .field("provider", &self.generator.provider_name())
            .field("model", &self.generator.model_name())
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl GenerationAdapter {
    /// Adapter allowing `max_retries` corrective retries.
    pub fn new(generator: Arc<dyn TextGenerator>, max_retries: u32) -> Self {
        Self {
            generator,
            max_retries,
        }
    }

    /// Provider name of the wrapped backend.
    pub fn provider_name(&self) -> &'static str {
        self.generator.provider_name()
    }

    /// Produce a scene satisfying the prompt's role.
    ///
    /// # Errors
    ///
    /// Backend failures are returned as soon as they happen. Output that
    /// still fails validation after every retry yields
    /// [`BackendErrorKind::InvalidResponse`].
    #[instrument(
        skip(self, prompt),
        fields(provider = self.generator.provider_name(), role = %prompt.role, position = prompt.position)
    )]
    pub async fn generate(&self, prompt: &PromptPayload) -> Result<SceneContent, BackendError> {
        let mut text = prompt.text.clone();
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            let request = GenerationRequest::new(text).with_attempt(attempt);
            let raw = self.generator.generate(&request).await?;
            debug!(attempt, response_length = raw.len(), "Received raw scene");

            match parse_json(&raw).and_then(|value| validate(&value, prompt.role)) {
                Ok(content) => {
                    if attempt > 0 {
                        info!(attempts = attempt + 1, "Scene accepted after corrective retry");
                    }
                    return Ok(content);
                }
                Err(error) => {
                    warn!(attempt, error = %error.describe(), "Generated scene failed validation");
                    text = corrective_prompt(prompt, &error);
                    last_error = Some(error);
                }
            }
        }

        Err(BackendError::new(BackendErrorKind::InvalidResponse {
            attempts: self.max_retries + 1,
            last_error: last_error.map(|e| e.describe()).unwrap_or_default(),
        }))
    }

    /// Drop any session the backend keeps between calls.
    pub async fn reset_session(&self) {
        self.generator.reset_session().await;
    }
}
