//! Scenes, player choice markers and history entries.

use crate::{ImageRef, SceneRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a history entry, never reused.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Mint a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// How a story ended.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The protagonist prevailed
    #[display("win")]
    Win,
    /// The protagonist failed
    #[display("loss")]
    Loss,
}

/// Progress status of a scene as seen by the rendering layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum SceneStatus {
    /// Story continues after this scene
    #[display("ongoing")]
    Ongoing,
    /// Story ended in victory
    #[display("win")]
    Win,
    /// Story ended in defeat
    #[display("loss")]
    Loss,
}

impl From<Outcome> for SceneStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => Self::Win,
            Outcome::Loss => Self::Loss,
        }
    }
}

/// A puzzle the player must answer to progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// The riddle or question
    pub question: String,
    /// Between two and four candidate answers
    pub choices: Vec<String>,
    /// Index of the intended answer, when the storyteller named one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_index: Option<usize>,
}

impl Challenge {
    /// Whether `answer` is the intended answer, if one is known.
    ///
    /// `None` when no answer index was given or `answer` is not one of the
    /// choices.
    ///
    /// # Examples
    ///
    /// ```
    /// use huntchapter_core::Challenge;
    ///
    /// let challenge = Challenge {
    ///     question: "What walks on four legs at dawn?".to_string(),
    ///     choices: vec!["Man".to_string(), "Wolf".to_string()],
    ///     answer_index: Some(0),
    /// };
    /// assert_eq!(challenge.is_correct("Man"), Some(true));
    /// assert_eq!(challenge.is_correct("Wolf"), Some(false));
    /// assert_eq!(challenge.is_correct("Sphinx"), None);
    /// ```
    pub fn is_correct(&self, answer: &str) -> Option<bool> {
        let answer = answer.trim();
        let expected = self.choices.get(self.answer_index?)?;
        if !self.choices.iter().any(|choice| choice.trim() == answer) {
            return None;
        }
        Some(expected.trim() == answer)
    }
}

/// Role-specific part of a scene. Exactly one shape per scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum SceneBody {
    /// Regular scene offering three options
    Normal {
        /// The three options offered to the player
        options: [String; 3],
    },
    /// Puzzle scene
    Challenge {
        /// The puzzle to solve
        challenge: Challenge,
    },
    /// Closing scene
    Ending {
        /// Win or loss
        outcome: Outcome,
        /// Optional title for the ending
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ending_title: Option<String>,
    },
}

impl SceneBody {
    /// The role this body satisfies.
    pub fn role(&self) -> SceneRole {
        match self {
            Self::Normal { .. } => SceneRole::Normal,
            Self::Challenge { .. } => SceneRole::Challenge,
            Self::Ending { .. } => SceneRole::Ending,
        }
    }
}

/// Validated output of a generation call, before it becomes a [`Scene`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneContent {
    /// Trimmed narration text
    pub narration: String,
    /// Role-specific shape
    pub body: SceneBody,
}

/// A generated narrative step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// Unique identifier
    pub id: EntryId,
    /// Narrative text shown to the player
    pub narration: String,
    /// Role-specific shape
    #[serde(flatten)]
    pub body: SceneBody,
    /// Optional illustration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
}

impl Scene {
    /// Turn validated content into a scene with a fresh id.
    pub fn from_content(content: SceneContent, image: Option<ImageRef>) -> Self {
        Self {
            id: EntryId::generate(),
            narration: content.narration,
            body: content.body,
            image,
        }
    }

    /// Role of this scene.
    pub fn role(&self) -> SceneRole {
        self.body.role()
    }

    /// Status derived from the shape.
    pub fn status(&self) -> SceneStatus {
        match &self.body {
            SceneBody::Ending { outcome, .. } => (*outcome).into(),
            _ => SceneStatus::Ongoing,
        }
    }

    /// Whether this scene closes the story.
    pub fn is_ending(&self) -> bool {
        matches!(self.body, SceneBody::Ending { .. })
    }

    /// Options of a normal scene.
    pub fn options(&self) -> Option<&[String; 3]> {
        match &self.body {
            SceneBody::Normal { options } => Some(options),
            _ => None,
        }
    }

    /// Puzzle of a challenge scene.
    pub fn challenge(&self) -> Option<&Challenge> {
        match &self.body {
            SceneBody::Challenge { challenge } => Some(challenge),
            _ => None,
        }
    }
}

/// Record of a choice the player made, interleaved with scenes in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceMarker {
    /// Unique identifier
    pub id: EntryId,
    /// Chosen text behind the reserved prefix
    pub narration: String,
}

impl ChoiceMarker {
    /// Narration prefix reserved for choice markers.
    pub const PREFIX: &'static str = "> ";

    /// Record a choice.
    ///
    /// # Examples
    ///
    /// ```
    /// use huntchapter_core::ChoiceMarker;
    ///
    /// let marker = ChoiceMarker::new("Open the door");
    /// assert_eq!(marker.narration, "> Open the door");
    /// assert_eq!(marker.choice_text(), "Open the door");
    /// ```
    pub fn new(choice: impl AsRef<str>) -> Self {
        Self {
            id: EntryId::generate(),
            narration: format!("{}{}", Self::PREFIX, choice.as_ref().trim()),
        }
    }

    /// The chosen text without the prefix.
    pub fn choice_text(&self) -> &str {
        self.narration
            .strip_prefix(Self::PREFIX)
            .unwrap_or(&self.narration)
    }
}

/// One entry of a session's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryEntry {
    /// A generated scene
    Scene(Scene),
    /// A player choice
    Choice(ChoiceMarker),
}

impl HistoryEntry {
    /// Identifier of the entry.
    pub fn id(&self) -> EntryId {
        match self {
            Self::Scene(scene) => scene.id,
            Self::Choice(marker) => marker.id,
        }
    }

    /// Narration of the entry; markers carry the reserved prefix.
    pub fn narration(&self) -> &str {
        match self {
            Self::Scene(scene) => &scene.narration,
            Self::Choice(marker) => &marker.narration,
        }
    }

    /// The scene, if this entry is one.
    pub fn as_scene(&self) -> Option<&Scene> {
        match self {
            Self::Scene(scene) => Some(scene),
            Self::Choice(_) => None,
        }
    }

    /// The marker, if this entry is one.
    pub fn as_choice(&self) -> Option<&ChoiceMarker> {
        match self {
            Self::Choice(marker) => Some(marker),
            Self::Scene(_) => None,
        }
    }
}
