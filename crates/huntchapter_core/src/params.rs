//! Player-selected story parameters.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Thematic parameters chosen before the story starts.
///
/// Immutable for the lifetime of a session.
///
/// # Examples
///
/// ```
/// use huntchapter_core::StoryParamsBuilder;
///
/// let params = StoryParamsBuilder::default()
///     .genre("Fantasy")
///     .tone("Epic")
///     .pov("second person")
///     .setting("a drowned cathedral")
///     .build()
///     .unwrap();
///
/// assert_eq!(params.genre(), "Fantasy");
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters, derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct StoryParams {
    /// Literary genre, e.g. "Science-fiction"
    genre: String,
    /// Narrative tone, e.g. "Dark"
    tone: String,
    /// Point of view the narration uses
    pov: String,
    /// Setting or framing of the adventure
    setting: String,
}

impl StoryParams {
    /// Create parameters from their four parts.
    pub fn new(
        genre: impl Into<String>,
        tone: impl Into<String>,
        pov: impl Into<String>,
        setting: impl Into<String>,
    ) -> Self {
        Self {
            genre: genre.into(),
            tone: tone.into(),
            pov: pov.into(),
            setting: setting.into(),
        }
    }

    /// Stable key identifying this combination of parameters.
    ///
    /// Used to derive deterministic illustration seeds.
    pub fn fingerprint(&self) -> String {
        format!("{}|{}|{}|{}", self.genre, self.tone, self.setting, self.pov)
    }
}
