//! Provider wiring from configuration.

use crate::{HuntChapterConfig, ImageFallback, ImageProvider, RemoteProvider};
use huntchapter_error::{ConfigError, HuntChapterResult};
use huntchapter_interface::{ImageGenerator, TextGenerator};
use huntchapter_models::{
    GeminiClient, GeminiImageClient, PollinationsImages, RelayClient, RelayImageClient,
};
use huntchapter_story::{Illustrator, PlaceholderImages, StoryEngine};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Backends shared by every engine of a process.
///
/// Engines are cheap; each session gets its own while the providers behind
/// them, including the single local model session, are shared.
#[derive(Clone)]
pub struct Runtime {
    config: HuntChapterConfig,
    remote: Arc<dyn TextGenerator>,
    local: Option<Arc<dyn TextGenerator>>,
    illustrator: Illustrator,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("remote", &self.remote.provider_name())
            .field("local", &self.local.as_ref().map(|l| l.provider_name()))
            .field("illustrator", &self.illustrator)
            .finish()
    }
}

impl Runtime {
    /// Runtime using explicit backends; local generation and images start disabled.
    pub fn new(config: HuntChapterConfig, remote: Arc<dyn TextGenerator>) -> Self {
        Self {
            config,
            remote,
            local: None,
            illustrator: Illustrator::disabled(),
        }
    }

    /// Prefer `local` for new engines.
    pub fn with_local(mut self, local: Arc<dyn TextGenerator>) -> Self {
        self.local = Some(local);
        self
    }

    /// Illustrate scenes of new engines with `illustrator`.
    pub fn with_illustrator(mut self, illustrator: Illustrator) -> Self {
        self.illustrator = illustrator;
        self
    }

    /// Build every backend the configuration names.
    ///
    /// # Errors
    ///
    /// Fails when the remote backend cannot be built, e.g. `GEMINI_API_KEY`
    /// is unset or no relay URL is configured. Local and image backends that
    /// cannot be built are disabled with a warning instead.
    #[instrument(skip(config))]
    pub fn from_config(config: HuntChapterConfig) -> HuntChapterResult<Self> {
        let remote = remote_backend(&config)?;
        let local = local_backend(&config);
        let illustrator = illustrator(&config);
        info!(
            remote = remote.provider_name(),
            local = local.as_ref().map(|l| l.provider_name()).unwrap_or("none"),
            images = illustrator.is_enabled(),
            "Runtime ready"
        );
        Ok(Self {
            config,
            remote,
            local,
            illustrator,
        })
    }

    /// Loaded configuration.
    pub fn config(&self) -> &HuntChapterConfig {
        &self.config
    }

    /// Remote text backend.
    pub fn remote(&self) -> &Arc<dyn TextGenerator> {
        &self.remote
    }

    /// Fresh idle engine over the shared backends.
    pub fn engine(&self) -> StoryEngine {
        let mut engine = StoryEngine::new(self.config.engine_config(), self.remote.clone())
            .with_illustrator(self.illustrator.clone());
        if let Some(local) = &self.local {
            engine = engine.with_local(local.clone());
        }
        engine
    }
}

fn remote_backend(config: &HuntChapterConfig) -> HuntChapterResult<Arc<dyn TextGenerator>> {
    let remote = config.remote();
    let timeout = Duration::from_secs(*remote.timeout_secs());
    let backend: Arc<dyn TextGenerator> = match remote.provider() {
        RemoteProvider::Gemini => {
            Arc::new(GeminiClient::from_env(remote.model().clone())?.with_timeout(timeout)?)
        }
        RemoteProvider::Relay => {
            let url = remote
                .relay_url()
                .clone()
                .ok_or_else(|| {
                    ConfigError::new("required for the relay provider").for_key("remote.relay_url")
                })?;
            Arc::new(RelayClient::new(url)?.with_timeout(timeout)?)
        }
    };
    Ok(backend)
}

#[cfg(feature = "ollama")]
fn local_backend(config: &HuntChapterConfig) -> Option<Arc<dyn TextGenerator>> {
    use huntchapter_models::{LocalProvider, OllamaSessionFactory};

    let local = config.local();
    if !*local.enabled() {
        return None;
    }
    let factory = OllamaSessionFactory::new(local.host().clone(), *local.port(), local.model().clone());
    let provider = LocalProvider::new(factory).with_timeouts(config.generation().local_timeouts());
    Some(Arc::new(provider))
}

#[cfg(not(feature = "ollama"))]
fn local_backend(config: &HuntChapterConfig) -> Option<Arc<dyn TextGenerator>> {
    if *config.local().enabled() {
        warn!("Local generation is enabled but this build has no local provider");
    }
    None
}

fn illustrator(config: &HuntChapterConfig) -> Illustrator {
    let images = config.images();

    let primary: Option<Arc<dyn ImageGenerator>> = match images.provider() {
        ImageProvider::Gemini => {
            let model = images
                .model()
                .clone()
                .unwrap_or_else(|| GeminiImageClient::DEFAULT_MODEL.to_string());
            match GeminiImageClient::from_env(model) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    warn!(error = %e, "Gemini illustrations disabled");
                    None
                }
            }
        }
        ImageProvider::Relay => match images.relay_url() {
            Some(url) => match RelayImageClient::new(url.clone()) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    warn!(error = %e, "Relay illustrations disabled");
                    None
                }
            },
            None => {
                warn!("[images] relay_url missing; relay illustrations disabled");
                None
            }
        },
        ImageProvider::None => None,
    };

    let fallback: Option<Arc<dyn ImageGenerator>> = match images.fallback() {
        ImageFallback::Pollinations => Some(Arc::new(PollinationsImages::default())),
        ImageFallback::Placeholder => Some(Arc::new(PlaceholderImages)),
        ImageFallback::None => None,
    };

    match (primary, fallback) {
        (Some(primary), Some(fallback)) => Illustrator::new(primary).with_fallback(fallback),
        (Some(only), None) | (None, Some(only)) => Illustrator::new(only),
        (None, None) => Illustrator::disabled(),
    }
}
