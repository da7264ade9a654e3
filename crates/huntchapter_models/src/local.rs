//! Provider driving an on-device model through a single reusable session.

use async_trait::async_trait;
use huntchapter_core::GenerationRequest;
use huntchapter_error::{BackendError, BackendErrorKind};
use huntchapter_interface::{LocalSessionFactory, LocalTextSession, TextGenerator};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Instruction appended to every prompt asking for JSON.
const JSON_ONLY: &str = "Respond only with a valid JSON object.";

/// Per-call deadline for local generation: `base + step * attempt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTimeouts {
    /// Deadline of the first attempt
    pub base: Duration,
    /// Extra time granted to each retry
    pub step: Duration,
}

impl Default for LocalTimeouts {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(5000),
            step: Duration::from_millis(1500),
        }
    }
}

impl LocalTimeouts {
    /// Deadline for the given zero-based attempt.
    ///
    /// # Examples
    ///
    /// ```
    /// use huntchapter_models::LocalTimeouts;
    /// use std::time::Duration;
    ///
    /// let timeouts = LocalTimeouts::default();
    /// assert_eq!(timeouts.for_attempt(0), Duration::from_millis(5000));
    /// assert_eq!(timeouts.for_attempt(2), Duration::from_millis(8000));
    /// ```
    pub fn for_attempt(&self, attempt: u32) -> Duration {
        self.base + self.step.saturating_mul(attempt)
    }
}

/// Text generator backed by a lazily opened local model session.
///
/// The session is created on first use and reused afterwards. Any failure,
/// timeout or empty answer discards it so the next call starts fresh. The
/// slot lock is held for the whole call, so one session never serves two
/// prompts at once.
pub struct LocalProvider<F: LocalSessionFactory> {
    factory: F,
    slot: Mutex<Option<F::Session>>,
    timeouts: LocalTimeouts,
}

impl<F: LocalSessionFactory> LocalProvider<F> {
    /// Wrap a session factory with default timeouts.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            slot: Mutex::new(None),
            timeouts: LocalTimeouts::default(),
        }
    }

    /// Override the per-call deadlines.
    pub fn with_timeouts(mut self, timeouts: LocalTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Whether a session is currently open.
    pub async fn has_session(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    async fn prompt_in_slot(
        &self,
        slot: &mut Option<F::Session>,
        request: &GenerationRequest,
    ) -> Result<String, BackendError> {
        if slot.is_none() {
            debug!("Opening local model session");
            *slot = Some(self.factory.create_session().await?);
            info!(model = %self.factory.model_name(), "Local model session ready");
        }
        let Some(session) = slot.as_ref() else {
            return Err(BackendError::unavailable("local session could not be opened"));
        };

        let prompt = if request.json_output {
            format!("{}\n\n{}", request.prompt, JSON_ONLY)
        } else {
            request.prompt.clone()
        };

        let deadline = self.timeouts.for_attempt(request.attempt);
        let text = tokio::time::timeout(deadline, session.prompt(&prompt))
            .await
            .map_err(|_| {
                BackendError::new(BackendErrorKind::Timeout {
                    waited_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                })
            })??;

        if text.trim().is_empty() {
            return Err(BackendError::unavailable("local model returned an empty response"));
        }
        Ok(text)
    }
}

#[async_trait]
impl<F: LocalSessionFactory> TextGenerator for LocalProvider<F> {
    #[instrument(skip(self, request), fields(model = %self.factory.model_name(), attempt = request.attempt))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        let mut slot = self.slot.lock().await;
        let result = self.prompt_in_slot(&mut slot, request).await;
        if let Err(e) = &result {
            warn!(error = %e.kind, "Discarding local model session");
            *slot = None;
        }
        result
    }

    fn provider_name(&self) -> &'static str {
        self.factory.provider_name()
    }

    fn model_name(&self) -> &str {
        self.factory.model_name()
    }

    async fn reset_session(&self) {
        if self.slot.lock().await.take().is_some() {
            debug!("Local model session discarded");
        }
    }
}
