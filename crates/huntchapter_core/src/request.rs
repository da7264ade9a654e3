//! Payloads exchanged with text generation backends.

use crate::SceneRole;
use serde::{Deserialize, Serialize};

/// Instructions for one scene, as produced by the prompt composer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPayload {
    /// Full instruction text
    pub text: String,
    /// Role the generated scene must satisfy
    pub role: SceneRole,
    /// 1-indexed position of the scene being generated
    pub position: usize,
    /// JSON shape restated when asking for a corrected answer
    pub shape: String,
}

/// A single call to a text backend.
///
/// # Examples
///
/// ```
/// use huntchapter_core::GenerationRequest;
///
/// let request = GenerationRequest::new("Tell me a story").with_attempt(2);
/// assert_eq!(request.attempt, 2);
/// assert!(request.json_output);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Prompt text, possibly extended with corrective instructions
    pub prompt: String,
    /// Zero-based retry attempt; local backends lengthen their timeout with it
    pub attempt: u32,
    /// Ask the backend for a JSON-only answer
    pub json_output: bool,
}

impl GenerationRequest {
    /// First attempt at a JSON answer for `prompt`.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            attempt: 0,
            json_output: true,
        }
    }

    /// Set the retry attempt.
    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }
}
