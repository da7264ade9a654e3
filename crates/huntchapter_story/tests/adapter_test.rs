//! Generation adapter retries.

mod common;

use common::{Step, Storyteller, unavailable};
use huntchapter_core::{PacingConfig, SceneBody};
use huntchapter_error::BackendErrorKind;
use huntchapter_story::{GenerationAdapter, PromptComposer};

#[tokio::test]
async fn test_valid_first_answer_uses_one_call() {
    let backend = Storyteller::new("remote");
    let adapter = GenerationAdapter::new(backend.clone(), 2);
    let prompt = PromptComposer::new(PacingConfig::default()).compose_intro(&common::params());

    let content = adapter.generate(&prompt).await.unwrap();
    assert!(matches!(content.body, SceneBody::Normal { .. }));
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_corrective_retry_recovers() {
    let backend = Storyteller::scripted(
        "remote",
        vec![Step::Raw("I'd love to help with your story!".to_string())],
    );
    let adapter = GenerationAdapter::new(backend.clone(), 2);
    let prompt = PromptComposer::new(PacingConfig::default()).compose_intro(&common::params());

    adapter.generate(&prompt).await.unwrap();
    let prompts = backend.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].starts_with(&prompt.text));
    assert!(prompts[1].contains("previous response was rejected"));
    assert!(prompts[1].ends_with(&prompt.shape));
}

#[tokio::test]
async fn test_retry_limit_is_respected() {
    let junk = || Step::Raw("{\"narration\": \"x\"}".to_string());
    let backend = Storyteller::scripted("remote", vec![junk(), junk()]);
    let adapter = GenerationAdapter::new(backend.clone(), 1);
    let prompt = PromptComposer::new(PacingConfig::default()).compose_intro(&common::params());

    let err = adapter.generate(&prompt).await.unwrap_err();
    assert_eq!(
        err.kind,
        BackendErrorKind::InvalidResponse {
            attempts: 2,
            last_error: "`options`: field is required".to_string()
        }
    );
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn test_backend_errors_are_not_retried() {
    let backend = Storyteller::scripted("remote", vec![unavailable("503")]);
    let adapter = GenerationAdapter::new(backend.clone(), 2);
    let prompt = PromptComposer::new(PacingConfig::default()).compose_intro(&common::params());

    let err = adapter.generate(&prompt).await.unwrap_err();
    assert_eq!(err.kind, BackendErrorKind::Unavailable("503".to_string()));
    assert_eq!(backend.calls(), 1);
}
