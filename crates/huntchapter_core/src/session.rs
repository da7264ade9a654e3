//! The serializable session record.

use crate::{HistoryEntry, Scene, StoryParams};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a play session.
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
pub struct SessionId(Uuid);

impl SessionId {
    /// Mint a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Which backend currently authors the story.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// On-device model
    #[display("local")]
    Local,
    /// Cloud model
    #[display("remote")]
    Remote,
}

/// Complete state of one story, as persisted and rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier
    pub id: SessionId,
    /// Parameters chosen at start
    pub params: StoryParams,
    /// Backend that authored the history
    pub mode: Mode,
    /// Scenes interleaved with choice markers, oldest first
    pub history: Vec<HistoryEntry>,
    /// Index of the entry currently displayed
    pub active_index: usize,
    /// When the session started
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Start a session from its intro scene.
    pub fn new(params: StoryParams, mode: Mode, intro: Scene) -> Self {
        Self {
            id: SessionId::generate(),
            params,
            mode,
            history: vec![HistoryEntry::Scene(intro)],
            active_index: 0,
            started_at: Utc::now(),
        }
    }

    /// Real scenes in order, markers skipped.
    pub fn scenes(&self) -> impl DoubleEndedIterator<Item = &Scene> + '_ {
        self.history.iter().filter_map(HistoryEntry::as_scene)
    }

    /// Number of real scenes.
    pub fn scene_count(&self) -> usize {
        self.scenes().count()
    }

    /// Most recent real scene.
    pub fn latest_scene(&self) -> Option<&Scene> {
        self.scenes().next_back()
    }

    /// Entry currently displayed.
    pub fn active_entry(&self) -> Option<&HistoryEntry> {
        self.history.get(self.active_index)
    }

    /// Whether the story reached its ending.
    pub fn is_ended(&self) -> bool {
        self.latest_scene().is_some_and(Scene::is_ending)
    }

    /// Texts of every choice the player made, oldest first.
    pub fn player_choices(&self) -> Vec<String> {
        self.history
            .iter()
            .filter_map(HistoryEntry::as_choice)
            .map(|marker| marker.choice_text().to_string())
            .collect()
    }

    /// Each choice paired with the scene it was made on, oldest first.
    pub fn answered_choices(&self) -> Vec<(Option<&Scene>, &str)> {
        let mut previous = None;
        let mut answered = Vec::new();
        for entry in &self.history {
            match entry {
                HistoryEntry::Scene(scene) => previous = Some(scene),
                HistoryEntry::Choice(marker) => answered.push((previous, marker.choice_text())),
            }
        }
        answered
    }

    /// Condensed view for listings.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            params: self.params.clone(),
            mode: self.mode,
            scenes: self.scene_count(),
            ended: self.is_ended(),
            started_at: self.started_at,
        }
    }
}

/// Listing entry for stored sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session identifier
    pub id: SessionId,
    /// Parameters chosen at start
    pub params: StoryParams,
    /// Backend that authored the history
    pub mode: Mode,
    /// Number of real scenes
    pub scenes: usize,
    /// Whether the story reached its ending
    pub ended: bool,
    /// When the session started
    pub started_at: DateTime<Utc>,
}
