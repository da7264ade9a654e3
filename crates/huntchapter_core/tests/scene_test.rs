//! Tests for scenes, markers and the session record.

use huntchapter_core::{
    Challenge, ChoiceMarker, HistoryEntry, Mode, Outcome, Scene, SceneBody, SceneContent,
    SceneRole, SceneStatus, Session, StoryParams, Universe,
};
use std::str::FromStr;
use strum::IntoEnumIterator;

fn normal(narration: &str) -> Scene {
    Scene::from_content(
        SceneContent {
            narration: narration.to_string(),
            body: SceneBody::Normal {
                options: ["a".to_string(), "b".to_string(), "c".to_string()],
            },
        },
        None,
    )
}

fn ending(outcome: Outcome) -> Scene {
    Scene::from_content(
        SceneContent {
            narration: "The end.".to_string(),
            body: SceneBody::Ending {
                outcome,
                ending_title: Some("Dawn".to_string()),
            },
        },
        None,
    )
}

fn params() -> StoryParams {
    StoryParams::new("Fantasy", "Epic", "second person", "Ruins")
}

#[test]
fn test_scene_ids_are_unique() {
    let a = normal("First.");
    let b = normal("First.");
    assert_ne!(a.id, b.id);
}

#[test]
fn test_status_follows_shape() {
    assert_eq!(normal("x").status(), SceneStatus::Ongoing);
    assert_eq!(ending(Outcome::Win).status(), SceneStatus::Win);
    assert_eq!(ending(Outcome::Loss).status(), SceneStatus::Loss);
    assert_eq!(ending(Outcome::Loss).role(), SceneRole::Ending);
}

#[test]
fn test_scene_serializes_flat_with_role_tag() {
    let scene = normal("A quiet harbor.");
    let value = serde_json::to_value(HistoryEntry::Scene(scene.clone())).unwrap();
    assert_eq!(value["kind"], "scene");
    assert_eq!(value["role"], "normal");
    assert_eq!(value["narration"], "A quiet harbor.");
    assert_eq!(value["options"].as_array().map(Vec::len), Some(3));
    assert!(value.get("image").is_none());

    let back: HistoryEntry = serde_json::from_value(value).unwrap();
    assert_eq!(back, HistoryEntry::Scene(scene));
}

#[test]
fn test_challenge_scene_survives_serialization() {
    let scene = Scene::from_content(
        SceneContent {
            narration: "A sphinx blocks the way.".to_string(),
            body: SceneBody::Challenge {
                challenge: Challenge {
                    question: "What has keys but no locks?".to_string(),
                    choices: vec!["A piano".to_string(), "A map".to_string()],
                    answer_index: Some(0),
                },
            },
        },
        None,
    );
    let json = serde_json::to_string(&HistoryEntry::from(scene.clone())).unwrap();
    let back: HistoryEntry = serde_json::from_str(&json).unwrap();
    assert_eq!(back.as_scene(), Some(&scene));
}

#[test]
fn test_marker_prefix() {
    let marker = ChoiceMarker::new("  Climb the tower ");
    assert!(marker.narration.starts_with(ChoiceMarker::PREFIX));
    assert_eq!(marker.choice_text(), "Climb the tower");
}

#[test]
fn test_session_queries() {
    let mut session = Session::new(params(), Mode::Local, normal("Intro."));
    session.history.push(ChoiceMarker::new("left").into());
    session.history.push(normal("Second.").into());
    session.history.push(ChoiceMarker::new("right").into());
    session.history.push(ending(Outcome::Win).into());

    assert_eq!(session.scene_count(), 3);
    assert_eq!(session.player_choices(), vec!["left", "right"]);
    assert!(session.is_ended());
    assert_eq!(session.summary().scenes, 3);
    assert!(session.summary().ended);
}

#[test]
fn test_challenge_verdict_ignores_foreign_answers() {
    let challenge = Challenge {
        question: "Which light guides sailors?".to_string(),
        choices: vec!["Moon".to_string(), "Sun".to_string(), "Rain".to_string()],
        answer_index: Some(0),
    };
    assert_eq!(challenge.is_correct(" Moon "), Some(true));
    assert_eq!(challenge.is_correct("Rain"), Some(false));
    assert_eq!(challenge.is_correct("Brass"), None);

    let open = Challenge {
        answer_index: None,
        ..challenge
    };
    assert_eq!(open.is_correct("Moon"), None);
}

#[test]
fn test_answered_choices_pair_with_their_scene() {
    let mut session = Session::new(params(), Mode::Local, normal("Intro."));
    session.history.push(ChoiceMarker::new("left").into());
    session.history.push(normal("Second.").into());
    session.history.push(ChoiceMarker::new("right").into());

    let answered = session.answered_choices();
    assert_eq!(answered.len(), 2);
    assert_eq!(answered[0].0.map(|s| s.narration.as_str()), Some("Intro."));
    assert_eq!(answered[0].1, "left");
    assert_eq!(answered[1].0.map(|s| s.narration.as_str()), Some("Second."));
    assert_eq!(answered[1].1, "right");
}

#[test]
fn test_session_record_round_trips() {
    let mut session = Session::new(params(), Mode::Remote, normal("Intro."));
    session.history.push(ChoiceMarker::new("go").into());
    session.history.push(normal("Next.").into());
    session.active_index = 2;

    let json = serde_json::to_string(&session).unwrap();
    let back: Session = serde_json::from_str(&json).unwrap();
    assert_eq!(back, session);
}

#[test]
fn test_universes_build_params() {
    for universe in Universe::iter() {
        let params = universe.params(universe.motifs()[0]);
        assert!(!params.genre().is_empty());
        assert!(!universe.description().is_empty());
    }
    assert_eq!(Universe::from_str("metropole").unwrap(), Universe::Metropole);
}
