//! Story engine behavior against scripted backends.

mod common;

use common::{BrokenImages, Step, Storyteller, params, unavailable};
use huntchapter_core::{Mode, PacingConfig, SceneRole, SceneStatus};
use huntchapter_error::{BackendErrorKind, EngineErrorKind};
use huntchapter_story::{EngineConfig, EnginePhase, Illustrator, PlaceholderImages, StoryEngine};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

fn hybrid(local: &Arc<Storyteller>, remote: &Arc<Storyteller>) -> StoryEngine {
    StoryEngine::new(EngineConfig::default(), remote.clone()).with_local(local.clone())
}

fn remote_only(remote: &Arc<Storyteller>) -> StoryEngine {
    StoryEngine::new(EngineConfig::default(), remote.clone())
}

#[tokio::test]
async fn test_full_local_run_reaches_ending() {
    let local = Storyteller::new("local");
    let remote = Storyteller::new("remote");
    let engine = hybrid(&local, &remote);

    let session = engine.start_game(params()).await.unwrap();
    assert_eq!(session.mode, Mode::Local);
    assert_eq!(engine.phase(), EnginePhase::Active(Mode::Local));

    engine.submit_choice("Climb").await.unwrap();
    let session = engine.submit_choice("Hide").await.unwrap();
    assert_eq!(session.latest_scene().unwrap().role(), SceneRole::Challenge);

    engine.answer_challenge(0).await.unwrap();
    engine.submit_choice("Call out").await.unwrap();
    engine.answer_challenge(2).await.unwrap();

    let session = engine.session().unwrap();
    assert_eq!(session.scene_count(), 6);
    assert!(session.is_ended());
    assert_eq!(session.latest_scene().unwrap().status(), SceneStatus::Win);
    assert_eq!(session.history.len(), 11);
    assert_eq!(session.active_index, 10);

    let pacing = PacingConfig::default();
    for (i, scene) in session.scenes().enumerate() {
        assert_eq!(scene.role(), pacing.role_at(i + 1), "scene {}", i + 1);
    }

    assert_eq!(local.calls(), 6);
    assert_eq!(remote.calls(), 0);
}

#[tokio::test]
async fn test_zero_history_window_still_shows_latest_scene() {
    let remote = Storyteller::new("remote");
    let config = EngineConfig::default().with_history_window(0);
    let engine = StoryEngine::new(config, remote.clone());

    engine.start_game(params()).await.unwrap();
    engine.submit_choice("Climb").await.unwrap();

    let prompt = remote.prompts().pop().unwrap();
    assert!(prompt.contains("remote scene 1."));
}

#[tokio::test]
async fn test_ended_story_refuses_choices() {
    let remote = Storyteller::new("remote");
    let config = EngineConfig::default().with_pacing(PacingConfig::try_new(2, Vec::<usize>::new()).unwrap());
    let engine = StoryEngine::new(config, remote.clone());

    engine.start_game(params()).await.unwrap();
    let session = engine.submit_choice("Climb").await.unwrap();
    assert!(session.is_ended());

    let err = engine.submit_choice("Again").await.unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::StoryEnded);
    assert_eq!(engine.session().unwrap().history.len(), 3);
    assert_eq!(remote.calls(), 2);
}

#[tokio::test]
async fn test_premature_ending_is_rejected_and_retried() {
    let local = Storyteller::scripted(
        "local",
        vec![
            Step::Scene,
            Step::Raw(
                json!({"narration": "You die.", "endingTitle": "Gone", "status": "loss"})
                    .to_string(),
            ),
        ],
    );
    let remote = Storyteller::new("remote");
    let engine = hybrid(&local, &remote);

    engine.start_game(params()).await.unwrap();
    let session = engine.submit_choice("Climb").await.unwrap();

    let latest = session.latest_scene().unwrap();
    assert_eq!(latest.role(), SceneRole::Normal);
    assert!(!session.is_ended());
    assert_eq!(local.calls(), 3);
    assert!(local.prompts()[2].contains("previous response was rejected"));
}

#[tokio::test]
async fn test_local_failure_replays_session_on_remote() {
    let local = Storyteller::scripted(
        "local",
        vec![
            Step::Scene,
            Step::Scene,
            Step::Scene,
            unavailable("model unloaded"),
        ],
    );
    let remote = Storyteller::new("remote");
    let engine = hybrid(&local, &remote);

    engine.start_game(params()).await.unwrap();
    engine.submit_choice("Climb").await.unwrap();
    engine.submit_choice("Hide").await.unwrap();
    let session = engine.answer_challenge(1).await.unwrap();

    assert_eq!(session.mode, Mode::Remote);
    assert_eq!(engine.phase(), EnginePhase::Active(Mode::Remote));
    assert_eq!(session.scene_count(), 4);
    assert_eq!(session.player_choices(), vec!["Climb", "Hide", "Iron"]);
    assert!(session.scenes().all(|s| s.narration.starts_with("remote")));
    assert_eq!(session.active_index, session.history.len() - 1);

    let pacing = PacingConfig::default();
    for (i, scene) in session.scenes().enumerate() {
        assert_eq!(scene.role(), pacing.role_at(i + 1));
    }

    assert_eq!(local.calls(), 4);
    assert_eq!(local.resets(), 1);
    assert_eq!(remote.calls(), 4);

    // Later turns stay on the remote backend.
    let session = engine.submit_choice("Climb").await.unwrap();
    assert_eq!(session.scene_count(), 5);
    assert_eq!(local.calls(), 4);
    assert_eq!(remote.calls(), 5);
}

#[tokio::test]
async fn test_replay_keeps_answer_correctness_context() {
    let local = Storyteller::scripted(
        "local",
        vec![Step::Scene, Step::Scene, Step::Scene, unavailable("gone")],
    );
    let remote = Storyteller::new("remote");
    let engine = hybrid(&local, &remote);

    engine.start_game(params()).await.unwrap();
    engine.submit_choice("Climb").await.unwrap();
    engine.submit_choice("Hide").await.unwrap();
    engine.answer_challenge(0).await.unwrap();

    let last_prompt = remote.prompts().pop().unwrap();
    assert!(last_prompt.contains("Which key opens the vault?"));
    assert!(last_prompt.contains("This answer is correct."));
}

#[tokio::test]
async fn test_replay_keeps_verdict_when_remote_challenge_differs() {
    let riddle = json!({
        "narration": "A lighthouse keeper blocks the stair.",
        "challenge": {
            "question": "Which light guides sailors home?",
            "choices": ["Moon", "Sun", "Rain"],
            "answerIndex": 0
        },
        "status": "ongoing"
    })
    .to_string();
    let local = Storyteller::scripted(
        "local",
        vec![Step::Scene, Step::Scene, Step::Raw(riddle), unavailable("gone")],
    );
    let remote = Storyteller::new("remote");
    let engine = hybrid(&local, &remote);

    engine.start_game(params()).await.unwrap();
    engine.submit_choice("Climb").await.unwrap();
    engine.submit_choice("Hide").await.unwrap();
    let session = engine.answer_challenge(0).await.unwrap();
    assert_eq!(session.mode, Mode::Remote);
    assert_eq!(session.player_choices(), vec!["Climb", "Hide", "Moon"]);

    // The remote backend regenerated a different challenge at scene 3.
    let regenerated = session.scenes().nth(2).unwrap().challenge().unwrap();
    assert!(!regenerated.choices.contains(&"Moon".to_string()));

    let last_prompt = remote.prompts().pop().unwrap();
    assert!(last_prompt.contains("Which light guides sailors home?"));
    assert!(last_prompt.contains("with: Moon"));
    assert!(last_prompt.contains("This answer is correct."));
    assert!(!last_prompt.contains("This answer is incorrect."));
}

#[tokio::test]
async fn test_invalid_local_output_also_falls_back() {
    let bad = json!({"narration": "", "options": ["a", "b", "c"]}).to_string();
    let local = Storyteller::scripted(
        "local",
        vec![
            Step::Scene,
            Step::Raw(bad.clone()),
            Step::Raw(bad.clone()),
            Step::Raw(bad),
        ],
    );
    let remote = Storyteller::new("remote");
    let engine = hybrid(&local, &remote);

    engine.start_game(params()).await.unwrap();
    let session = engine.submit_choice("Climb").await.unwrap();

    assert_eq!(session.mode, Mode::Remote);
    assert_eq!(session.scene_count(), 2);
    assert_eq!(local.calls(), 4);
    assert_eq!(remote.calls(), 2);
}

#[tokio::test]
async fn test_failed_replay_faults_engine() {
    let local = Storyteller::scripted("local", vec![Step::Scene, unavailable("gone")]);
    let remote = Storyteller::scripted("remote", vec![Step::Scene, unavailable("quota")]);
    let engine = hybrid(&local, &remote);

    engine.start_game(params()).await.unwrap();
    let err = engine.submit_choice("Climb").await.unwrap_err();
    assert!(matches!(err.kind, EngineErrorKind::Fatal(_)));
    assert!(err.is_fatal());
    assert_eq!(engine.phase(), EnginePhase::Faulted);

    let session = engine.session().unwrap();
    assert_eq!(session.history.len(), 1);
    assert_eq!(session.mode, Mode::Local);

    let err = engine.submit_choice("Climb").await.unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::ResetRequired);
    let err = engine.start_game(params()).await.unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::ResetRequired);

    engine.reset().await.unwrap();
    assert_eq!(engine.phase(), EnginePhase::Idle);
    assert!(engine.session().is_none());
    engine.start_game(params()).await.unwrap();
}

#[tokio::test]
async fn test_malformed_remote_output_exhausts_retries() {
    let remote = Storyteller::new("remote");
    let engine = remote_only(&remote);
    engine.start_game(params()).await.unwrap();

    let empty = json!({"narration": "   ", "options": ["a", "b", "c"]}).to_string();
    for _ in 0..3 {
        remote.push(Step::Raw(empty.clone()));
    }
    let err = engine.submit_choice("Climb").await.unwrap_err();
    match err.kind {
        EngineErrorKind::Generation(BackendErrorKind::InvalidResponse {
            attempts,
            last_error,
        }) => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("narration"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(remote.calls(), 4);

    let session = engine.session().unwrap();
    assert_eq!(session.history.len(), 1);
    assert_eq!(engine.phase(), EnginePhase::Active(Mode::Remote));
}

#[tokio::test]
async fn test_remote_failure_rolls_back_and_allows_retry() {
    let remote = Storyteller::new("remote");
    let engine = remote_only(&remote);
    let before = engine.start_game(params()).await.unwrap();

    remote.push(Step::Fail(BackendErrorKind::Timeout { waited_ms: 30_000 }));
    let err = engine.submit_choice("Climb").await.unwrap_err();
    assert_eq!(
        err.kind,
        EngineErrorKind::Generation(BackendErrorKind::Timeout { waited_ms: 30_000 })
    );
    assert!(!err.is_fatal());
    assert_eq!(engine.session().unwrap(), before);

    let session = engine.submit_choice("Climb").await.unwrap();
    assert_eq!(session.scene_count(), 2);
    assert_eq!(session.player_choices(), vec!["Climb"]);
}

#[tokio::test]
async fn test_start_falls_back_to_remote() {
    let local = Storyteller::scripted("local", vec![unavailable("no model")]);
    let remote = Storyteller::new("remote");
    let engine = hybrid(&local, &remote);

    let session = engine.start_game(params()).await.unwrap();
    assert_eq!(session.mode, Mode::Remote);
    assert_eq!(local.resets(), 1);

    engine.submit_choice("Climb").await.unwrap();
    assert_eq!(local.calls(), 1);
    assert_eq!(remote.calls(), 2);
}

#[tokio::test]
async fn test_start_fails_when_no_backend_answers() {
    let local = Storyteller::scripted("local", vec![unavailable("no model")]);
    let remote = Storyteller::scripted("remote", vec![unavailable("no key")]);
    let engine = hybrid(&local, &remote);

    let err = engine.start_game(params()).await.unwrap_err();
    assert!(matches!(err.kind, EngineErrorKind::Fatal(_)));
    assert_eq!(engine.phase(), EnginePhase::Idle);
    assert!(engine.session().is_none());

    let session = engine.start_game(params()).await.unwrap();
    assert_eq!(session.mode, Mode::Local);
}

#[tokio::test]
async fn test_refusals_leave_state_untouched() {
    let remote = Storyteller::new("remote");
    let engine = remote_only(&remote);

    let err = engine.submit_choice("Climb").await.unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::NotStarted);
    assert_eq!(engine.go_back().unwrap_err().kind, EngineErrorKind::NotStarted);

    engine.start_game(params()).await.unwrap();
    let err = engine.start_game(params()).await.unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::AlreadyStarted);

    let err = engine.submit_choice("   ").await.unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::EmptyChoice);

    let err = engine.answer_challenge(0).await.unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::NoChallenge);

    engine.submit_choice("Climb").await.unwrap();
    engine.submit_choice("Hide").await.unwrap();
    let err = engine.answer_challenge(7).await.unwrap_err();
    assert_eq!(
        err.kind,
        EngineErrorKind::ChoiceOutOfRange {
            index: 7,
            available: 3
        }
    );
    assert_eq!(engine.session().unwrap().scene_count(), 3);
    assert_eq!(remote.calls(), 3);
}

#[tokio::test]
async fn test_go_back_only_moves_display() {
    let remote = Storyteller::new("remote");
    let engine = remote_only(&remote);
    engine.start_game(params()).await.unwrap();

    let session = engine.go_back().unwrap();
    assert_eq!(session.active_index, 0);
    assert_eq!(session.history.len(), 1);

    engine.submit_choice("Climb").await.unwrap();
    engine.submit_choice("Hide").await.unwrap();
    assert_eq!(engine.go_back().unwrap().active_index, 2);
    let session = engine.go_back().unwrap();
    assert_eq!(session.active_index, 0);
    assert_eq!(session.history.len(), 5);

    // Playing on continues from the latest scene.
    let session = engine.submit_choice("Iron").await.unwrap();
    assert_eq!(session.scene_count(), 4);
    assert_eq!(session.active_index, 6);
}

#[tokio::test]
async fn test_concurrent_operations_are_busy() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let remote = Storyteller::new("remote");
    let engine = Arc::new(remote_only(&remote));
    engine.start_game(params()).await.unwrap();

    remote.push(Step::Gate {
        entered: entered.clone(),
        release: release.clone(),
    });
    let task = tokio::spawn({
        let engine = engine.clone();
        async move { engine.submit_choice("Climb").await }
    });
    entered.notified().await;

    let err = engine.submit_choice("Hide").await.unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::Busy);
    assert_eq!(engine.reset().await.unwrap_err().kind, EngineErrorKind::Busy);
    assert_eq!(engine.go_back().unwrap().active_index, 0);

    release.notify_one();
    let session = task.await.unwrap().unwrap();
    assert_eq!(session.scene_count(), 2);
    assert_eq!(session.player_choices(), vec!["Climb"]);
}

#[tokio::test]
async fn test_cancelled_turn_is_rolled_back() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let remote = Storyteller::new("remote");
    let engine = remote_only(&remote);
    let before = engine.start_game(params()).await.unwrap();

    remote.push(Step::Gate { entered, release });
    let outcome = tokio::time::timeout(Duration::from_millis(50), engine.submit_choice("Climb")).await;
    assert!(outcome.is_err());

    assert_eq!(engine.session().unwrap(), before);
    assert_eq!(engine.phase(), EnginePhase::Active(Mode::Remote));
    let session = engine.submit_choice("Climb").await.unwrap();
    assert_eq!(session.scene_count(), 2);
}

#[tokio::test]
async fn test_resume_continues_a_saved_session() {
    let remote = Storyteller::new("remote");
    let first = remote_only(&remote);
    first.start_game(params()).await.unwrap();
    let saved = first.submit_choice("Climb").await.unwrap();

    let second = remote_only(&remote);
    second.resume(saved.clone()).unwrap();
    assert_eq!(second.phase(), EnginePhase::Active(Mode::Remote));
    let err = second.resume(saved.clone()).unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::AlreadyStarted);

    let session = second.submit_choice("Hide").await.unwrap();
    assert_eq!(session.id, saved.id);
    assert_eq!(session.scene_count(), 3);
    assert_eq!(session.latest_scene().unwrap().role(), SceneRole::Challenge);
}

#[tokio::test]
async fn test_scenes_are_illustrated_through_fallback() {
    let remote = Storyteller::new("remote");
    let illustrator = Illustrator::new(Arc::new(BrokenImages)).with_fallback(Arc::new(PlaceholderImages));
    let engine = remote_only(&remote).with_illustrator(illustrator);

    let session = engine.start_game(params()).await.unwrap();
    let image = session.latest_scene().unwrap().image.clone().unwrap();
    assert!(image.is_data_uri());
}

#[tokio::test]
async fn test_failed_illustration_keeps_scene() {
    let remote = Storyteller::new("remote");
    let engine = remote_only(&remote).with_illustrator(Illustrator::new(Arc::new(BrokenImages)));

    let session = engine.start_game(params()).await.unwrap();
    assert!(session.latest_scene().unwrap().image.is_none());
    assert_eq!(session.scene_count(), 1);
}
