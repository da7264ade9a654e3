//! Application configuration.
//!
//! Settings are layered with the `config` crate, later sources winning:
//! - Bundled defaults (include_str! from huntchapter.toml)
//! - ~/.config/huntchapter/huntchapter.toml
//! - ./huntchapter.toml
//! - An explicit file given on the command line

use derive_getters::Getters;
use huntchapter_core::PacingConfig;
use huntchapter_error::{ConfigError, HuntChapterError, HuntChapterResult};
use huntchapter_models::LocalTimeouts;
use huntchapter_story::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../huntchapter.toml");

/// Backend authoring the story when the local model is unavailable.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RemoteProvider {
    /// Google Gemini REST API
    Gemini,
    /// HTTP relay speaking `/api/generate`
    Relay,
}

/// Primary illustration backend.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImageProvider {
    /// Gemini image model
    Gemini,
    /// HTTP relay speaking `/api/generate-image`
    Relay,
    /// No primary backend
    None,
}

/// Illustration used when the primary backend fails.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImageFallback {
    /// Seeded Pollinations URL
    Pollinations,
    /// Inline gradient SVG
    Placeholder,
    /// No fallback
    None,
}

/// `[generation]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct GenerationSection {
    /// Corrective retries after a malformed scene
    #[serde(default = "default_max_retries")]
    max_retries: u32,
    /// Recent scenes shown to the model
    #[serde(default = "default_history_window")]
    history_window: usize,
    /// Language of the narration
    #[serde(default = "default_language")]
    language: String,
    /// Local deadline of the first attempt, in milliseconds
    #[serde(default = "default_local_timeout_ms")]
    local_timeout_ms: u64,
    /// Extra local deadline per retry, in milliseconds
    #[serde(default = "default_local_timeout_step_ms")]
    local_timeout_step_ms: u64,
}

fn default_max_retries() -> u32 {
    huntchapter_story::DEFAULT_MAX_RETRIES
}

fn default_history_window() -> usize {
    huntchapter_story::DEFAULT_HISTORY_WINDOW
}

fn default_language() -> String {
    "English".to_string()
}

fn default_local_timeout_ms() -> u64 {
    5000
}

fn default_local_timeout_step_ms() -> u64 {
    1500
}

impl GenerationSection {
    /// Per-attempt deadlines of the local backend.
    pub fn local_timeouts(&self) -> LocalTimeouts {
        LocalTimeouts {
            base: Duration::from_millis(self.local_timeout_ms),
            step: Duration::from_millis(self.local_timeout_step_ms),
        }
    }
}

/// `[local]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct LocalSection {
    /// Try the on-device model first
    #[serde(default)]
    enabled: bool,
    /// Model name as known to the daemon
    model: String,
    /// Daemon host, with scheme
    #[serde(default = "default_local_host")]
    host: String,
    /// Daemon port
    #[serde(default = "default_local_port")]
    port: u16,
}

fn default_local_host() -> String {
    "http://localhost".to_string()
}

fn default_local_port() -> u16 {
    11434
}

/// `[remote]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct RemoteSection {
    /// Which remote backend to use
    provider: RemoteProvider,
    /// Gemini model name
    model: String,
    /// Relay base URL
    #[serde(default)]
    relay_url: Option<String>,
    /// Whole-request timeout in seconds
    #[serde(default = "default_remote_timeout_secs")]
    timeout_secs: u64,
}

fn default_remote_timeout_secs() -> u64 {
    60
}

/// `[images]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct ImagesSection {
    /// Primary illustration backend
    provider: ImageProvider,
    /// Gemini image model name
    #[serde(default)]
    model: Option<String>,
    /// Relay base URL
    #[serde(default)]
    relay_url: Option<String>,
    /// Used when the primary backend fails
    fallback: ImageFallback,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct ServerSection {
    /// Socket address to listen on
    bind: String,
    /// JSON document holding saved sessions
    sessions_file: PathBuf,
    /// Serve the generation relay endpoints
    #[serde(default = "default_relay")]
    relay: bool,
}

fn default_relay() -> bool {
    true
}

/// Complete application configuration.
///
/// # Example
///
/// ```no_run
/// use huntchapter::HuntChapterConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = HuntChapterConfig::load()?;
/// println!("Stories last {} scenes", config.pacing().total_scenes());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct HuntChapterConfig {
    /// Scene count and challenge positions
    pacing: PacingConfig,
    /// Retries, history window, language and local deadlines
    generation: GenerationSection,
    /// On-device model
    local: LocalSection,
    /// Remote backend
    remote: RemoteSection,
    /// Illustration backends
    images: ImagesSection,
    /// HTTP server
    server: ServerSection,
}

impl HuntChapterConfig {
    /// Bundled defaults only.
    pub fn bundled() -> HuntChapterResult<Self> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Parse a complete configuration document.
    pub fn from_toml(document: &str) -> HuntChapterResult<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(document, config::FileFormat::Toml))
            .build()
            .map_err(|e| build_error(&e))?
            .try_deserialize()
            .map_err(|e| parse_error(&e))?;
        config.validated()
    }

    /// Load the layered configuration.
    #[instrument]
    pub fn load() -> HuntChapterResult<Self> {
        Self::load_with(None)
    }

    /// Load the layered configuration, with `explicit` as the last layer.
    ///
    /// # Errors
    ///
    /// Fails when `explicit` is missing, when any file is malformed, or when
    /// the merged pacing or history window is invalid.
    #[instrument]
    pub fn load_with(explicit: Option<&Path>) -> HuntChapterResult<Self> {
        debug!("Loading configuration with precedence: explicit > current dir > home dir > bundled defaults");

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/huntchapter/huntchapter.toml");
            builder = builder.add_source(config::File::from(home_config).required(false));
        }

        builder = builder.add_source(config::File::with_name("huntchapter").required(false));

        if let Some(path) = explicit {
            debug!(path = %path.display(), "Adding explicit configuration file");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config: Self = builder
            .build()
            .map_err(|e| build_error(&e))?
            .try_deserialize()
            .map_err(|e| parse_error(&e))?;
        config.validated()
    }

    fn validated(self) -> HuntChapterResult<Self> {
        self.engine_config().validate()?;
        Ok(self)
    }

    /// Story engine settings derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_pacing(self.pacing.clone())
            .with_max_retries(self.generation.max_retries)
            .with_history_window(self.generation.history_window)
            .with_language(self.generation.language.clone())
    }
}

fn build_error(e: &config::ConfigError) -> HuntChapterError {
    ConfigError::new(format!("Failed to build configuration: {}", e)).into()
}

fn parse_error(e: &config::ConfigError) -> HuntChapterError {
    ConfigError::new(format!("Failed to parse configuration: {}", e)).into()
}
