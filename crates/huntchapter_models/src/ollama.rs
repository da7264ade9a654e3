//! Local sessions served by an Ollama daemon.

use async_trait::async_trait;
use huntchapter_error::BackendError;
use huntchapter_interface::{LocalSessionFactory, LocalTextSession};
use ollama_rs::Ollama;
use ollama_rs::generation::completion::request::GenerationRequest as OllamaRequest;
use tracing::{debug, instrument, warn};

/// Opens sessions on a model pulled into a local Ollama daemon.
#[derive(Debug, Clone)]
pub struct OllamaSessionFactory {
    client: Ollama,
    model: String,
    host: String,
    port: u16,
}

impl OllamaSessionFactory {
    /// Factory for `model` on the daemon at `host:port` (e.g. `http://localhost`, 11434).
    pub fn new(host: impl Into<String>, port: u16, model: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            client: Ollama::new(host.clone(), port),
            model: model.into(),
            host,
            port,
        }
    }

    fn matches(&self, installed: &str) -> bool {
        installed == self.model || installed.split(':').next() == Some(self.model.as_str())
    }
}

#[async_trait]
impl LocalSessionFactory for OllamaSessionFactory {
    type Session = OllamaSession;

    #[instrument(skip(self), fields(model = %self.model, host = %self.host, port = self.port))]
    async fn create_session(&self) -> Result<Self::Session, BackendError> {
        let models = self.client.list_local_models().await.map_err(|e| {
            warn!(error = %e, "Ollama daemon unreachable");
            BackendError::unavailable(format!(
                "Ollama unreachable at {}:{}: {}",
                self.host, self.port, e
            ))
        })?;

        if !models.iter().any(|m| self.matches(&m.name)) {
            warn!(
                available = ?models.iter().map(|m| &m.name).collect::<Vec<_>>(),
                "Model not found locally"
            );
            return Err(BackendError::unavailable(format!(
                "model {} is not installed",
                self.model
            )));
        }

        debug!("Ollama model available");
        Ok(OllamaSession {
            client: self.client.clone(),
            model: self.model.clone(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// A prompt channel to one Ollama model.
#[derive(Debug, Clone)]
pub struct OllamaSession {
    client: Ollama,
    model: String,
}

#[async_trait]
impl LocalTextSession for OllamaSession {
    async fn prompt(&self, input: &str) -> Result<String, BackendError> {
        let request = OllamaRequest::new(self.model.clone(), input.to_string());
        let response = self
            .client
            .generate(request)
            .await
            .map_err(|e| BackendError::unavailable(format!("Ollama generation failed: {}", e)))?;
        debug!(response_length = response.response.len(), "Ollama answered");
        Ok(response.response)
    }
}
