//! Tests for the local session provider.

use async_trait::async_trait;
use huntchapter_core::GenerationRequest;
use huntchapter_error::{BackendError, BackendErrorKind};
use huntchapter_interface::{LocalSessionFactory, LocalTextSession, TextGenerator};
use huntchapter_models::{LocalProvider, LocalTimeouts};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a scripted session does when prompted.
#[derive(Debug, Clone)]
enum Step {
    Answer(&'static str),
    Fail,
    Hang,
}

#[derive(Clone)]
struct ScriptedFactory {
    available: bool,
    created: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
    script: Arc<Mutex<VecDeque<Step>>>,
}

impl ScriptedFactory {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            available: true,
            created: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(Mutex::new(steps.into())),
        }
    }
}

struct ScriptedSession {
    prompts: Arc<Mutex<Vec<String>>>,
    script: Arc<Mutex<VecDeque<Step>>>,
}

#[async_trait]
impl LocalSessionFactory for ScriptedFactory {
    type Session = ScriptedSession;

    async fn create_session(&self) -> Result<ScriptedSession, BackendError> {
        if !self.available {
            return Err(BackendError::unavailable("no local model"));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedSession {
            prompts: self.prompts.clone(),
            script: self.script.clone(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

#[async_trait]
impl LocalTextSession for ScriptedSession {
    async fn prompt(&self, input: &str) -> Result<String, BackendError> {
        self.prompts.lock().unwrap().push(input.to_string());
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Answer(text)) => Ok(text.to_string()),
            Some(Step::Fail) | None => Err(BackendError::unavailable("session crashed")),
            Some(Step::Hang) => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(String::new())
            }
        }
    }
}

fn fast_timeouts() -> LocalTimeouts {
    LocalTimeouts {
        base: Duration::from_millis(50),
        step: Duration::from_millis(10),
    }
}

#[tokio::test]
async fn test_session_is_created_lazily_and_reused() {
    let factory = ScriptedFactory::new(vec![Step::Answer("{}"), Step::Answer("{\"a\":1}")]);
    let provider = LocalProvider::new(factory.clone()).with_timeouts(fast_timeouts());

    assert!(!provider.has_session().await);
    assert_eq!(factory.created.load(Ordering::SeqCst), 0);

    provider.generate(&GenerationRequest::new("one")).await.unwrap();
    provider.generate(&GenerationRequest::new("two")).await.unwrap();

    assert_eq!(factory.created.load(Ordering::SeqCst), 1);
    assert!(provider.has_session().await);
}

#[tokio::test]
async fn test_json_instruction_is_appended() {
    let factory = ScriptedFactory::new(vec![Step::Answer("{}")]);
    let provider = LocalProvider::new(factory.clone());

    provider.generate(&GenerationRequest::new("Tell a tale")).await.unwrap();

    let prompts = factory.prompts.lock().unwrap();
    assert!(prompts[0].starts_with("Tell a tale"));
    assert!(prompts[0].contains("valid JSON object"));
}

#[tokio::test]
async fn test_failure_discards_session() {
    let factory = ScriptedFactory::new(vec![Step::Fail, Step::Answer("{}")]);
    let provider = LocalProvider::new(factory.clone()).with_timeouts(fast_timeouts());

    let err = provider.generate(&GenerationRequest::new("x")).await.unwrap_err();
    assert!(matches!(err.kind, BackendErrorKind::Unavailable(_)));
    assert!(!provider.has_session().await);

    provider.generate(&GenerationRequest::new("x")).await.unwrap();
    assert_eq!(factory.created.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_timeout_discards_session() {
    let factory = ScriptedFactory::new(vec![Step::Hang]);
    let provider = LocalProvider::new(factory.clone()).with_timeouts(fast_timeouts());

    let err = provider
        .generate(&GenerationRequest::new("x").with_attempt(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind, BackendErrorKind::Timeout { waited_ms: 60 });
    assert!(!provider.has_session().await);
}

#[tokio::test]
async fn test_empty_answer_is_unavailable() {
    let factory = ScriptedFactory::new(vec![Step::Answer("   ")]);
    let provider = LocalProvider::new(factory);

    let err = provider.generate(&GenerationRequest::new("x")).await.unwrap_err();
    assert!(matches!(err.kind, BackendErrorKind::Unavailable(_)));
    assert!(!provider.has_session().await);
}

#[tokio::test]
async fn test_missing_model_is_unavailable() {
    let mut factory = ScriptedFactory::new(vec![]);
    factory.available = false;
    let provider = LocalProvider::new(factory);

    let err = provider.generate(&GenerationRequest::new("x")).await.unwrap_err();
    assert!(matches!(err.kind, BackendErrorKind::Unavailable(_)));
}

#[tokio::test]
async fn test_reset_session_drops_handle() {
    let factory = ScriptedFactory::new(vec![Step::Answer("{}")]);
    let provider = LocalProvider::new(factory);

    provider.generate(&GenerationRequest::new("x")).await.unwrap();
    assert!(provider.has_session().await);
    provider.reset_session().await;
    assert!(!provider.has_session().await);
}
