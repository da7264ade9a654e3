//! Story engine configuration.

use crate::{DEFAULT_HISTORY_WINDOW, DEFAULT_MAX_RETRIES, MAX_HISTORY_WINDOW};
use derive_getters::Getters;
use huntchapter_core::PacingConfig;
use huntchapter_error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};

/// Tunables of a [`crate::StoryEngine`].
///
/// # Examples
///
/// ```
/// use huntchapter_story::EngineConfig;
///
/// let config = EngineConfig::default().with_max_retries(1);
/// assert_eq!(*config.max_retries(), 1);
/// assert_eq!(config.pacing().total_scenes(), 6);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct EngineConfig {
    /// Scene count and challenge positions
    #[serde(default)]
    #[builder(default)]
    pacing: PacingConfig,

    /// Corrective retries after a malformed scene
    #[serde(default = "default_max_retries")]
    #[builder(default = "default_max_retries()")]
    max_retries: u32,

    /// Recent scenes shown to the model, between 1 and 4
    #[serde(
        default = "default_history_window",
        deserialize_with = "history_window_in_range"
    )]
    #[builder(default = "default_history_window()")]
    history_window: usize,

    /// Language of the narration
    #[serde(default = "default_language")]
    #[builder(default = "default_language()")]
    language: String,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_history_window() -> usize {
    DEFAULT_HISTORY_WINDOW
}

fn default_language() -> String {
    "English".to_string()
}

/// Accept a history window of 1 to [`MAX_HISTORY_WINDOW`] scenes.
///
/// # Examples
///
/// ```
/// use huntchapter_story::check_history_window;
///
/// assert_eq!(check_history_window(2).unwrap(), 2);
/// assert!(check_history_window(0).is_err());
/// assert!(check_history_window(5).is_err());
/// ```
pub fn check_history_window(window: usize) -> Result<usize, ConfigError> {
    if (1..=MAX_HISTORY_WINDOW).contains(&window) {
        Ok(window)
    } else {
        Err(ConfigError::new(format!(
            "history window must be between 1 and {} scenes, got {}",
            MAX_HISTORY_WINDOW, window
        ))
        .for_key("generation.history_window"))
    }
}

fn history_window_in_range<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let window = usize::deserialize(deserializer)?;
    check_history_window(window).map_err(serde::de::Error::custom)
}

impl EngineConfig {
    /// Check values the type system does not constrain.
    ///
    /// # Errors
    ///
    /// A [`ConfigError`] naming the offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_history_window(self.history_window)?;
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pacing: PacingConfig::default(),
            max_retries: default_max_retries(),
            history_window: default_history_window(),
            language: default_language(),
        }
    }
}
