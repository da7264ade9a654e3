//! Google Gemini REST backends.

mod client;
mod dto;
mod image;

pub use client::GeminiClient;
pub use image::GeminiImageClient;

/// Default REST endpoint.
pub(crate) const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variable holding the API key.
pub(crate) const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Read the API key from the environment.
pub(crate) fn api_key_from_env() -> Result<String, huntchapter_error::ConfigError> {
    std::env::var(API_KEY_VAR)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            huntchapter_error::ConfigError::new("environment variable not set").for_key(API_KEY_VAR)
        })
}
