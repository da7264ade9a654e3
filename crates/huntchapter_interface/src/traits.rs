//! Trait definitions for generation backends.

use async_trait::async_trait;
use huntchapter_core::{GenerationRequest, ImagePrompt, ImageRef};
use huntchapter_error::{BackendError, IllustrationError};

/// A backend producing raw text for a prompt.
///
/// Implementations return the model output untouched; extraction and shape
/// validation happen in the generation adapter.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce text for the request.
    ///
    /// Transport failures, error statuses and empty output are reported as
    /// [`BackendError`]s.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError>;

    /// Provider name (e.g., "gemini", "relay", "ollama").
    fn provider_name(&self) -> &'static str;

    /// Model identifier.
    fn model_name(&self) -> &str;

    /// Drop any per-session state held by the backend.
    async fn reset_session(&self) {}
}

/// A backend producing illustrations.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Produce an image for the prompt.
    async fn generate_image(&self, prompt: &ImagePrompt) -> Result<ImageRef, IllustrationError>;

    /// Provider name (e.g., "gemini", "pollinations").
    fn provider_name(&self) -> &'static str;
}

/// Opens sessions on an on-device model.
///
/// Creating a session may be expensive (model load); callers keep at most
/// one alive and reuse it.
#[async_trait]
pub trait LocalSessionFactory: Send + Sync {
    /// Session type handed out by this factory.
    type Session: LocalTextSession + 'static;

    /// Open a session, failing with `Unavailable` when no model is present.
    async fn create_session(&self) -> Result<Self::Session, BackendError>;

    /// Provider name (e.g., "ollama").
    fn provider_name(&self) -> &'static str;

    /// Model identifier.
    fn model_name(&self) -> &str;
}

/// A live session on an on-device model.
#[async_trait]
pub trait LocalTextSession: Send + Sync {
    /// Send one prompt and wait for the complete answer.
    async fn prompt(&self, input: &str) -> Result<String, BackendError>;
}
