//! Story pacing: how many scenes, where the challenges fall, where it ends.

use huntchapter_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The output shape a scene must take, derived from its position.
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
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum SceneRole {
    /// Narration followed by three options
    #[display("normal")]
    Normal,
    /// Narration followed by a puzzle with 2 to 4 answers
    #[display("challenge")]
    Challenge,
    /// Closing narration with a win or loss outcome
    #[display("ending")]
    Ending,
}

/// Fixed pacing shared by every session in the process.
///
/// Positions are 1-indexed. The final scene is always an ending, the intro
/// (position 1) is never a challenge.
///
/// # Examples
///
/// ```
/// use huntchapter_core::{PacingConfig, SceneRole};
///
/// let pacing = PacingConfig::try_new(6, [3, 5]).unwrap();
/// assert_eq!(pacing.role_at(1), SceneRole::Normal);
/// assert_eq!(pacing.role_at(3), SceneRole::Challenge);
/// assert_eq!(pacing.role_at(6), SceneRole::Ending);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PacingSpec", into = "PacingSpec")]
pub struct PacingConfig {
    total_scenes: usize,
    challenge_positions: BTreeSet<usize>,
}

/// Unchecked serialized form of [`PacingConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PacingSpec {
    total_scenes: usize,
    #[serde(default)]
    challenge_positions: Vec<usize>,
}

impl PacingConfig {
    /// Build a pacing configuration, rejecting inconsistent layouts.
    ///
    /// # Errors
    ///
    /// Fails when fewer than two scenes are requested, or when a challenge
    /// position falls on the intro, the final scene or beyond it.
    pub fn try_new(
        total_scenes: usize,
        challenge_positions: impl IntoIterator<Item = usize>,
    ) -> Result<Self, ConfigError> {
        if total_scenes < 2 {
            return Err(ConfigError::new(format!(
                "a story needs at least 2 scenes, got {}",
                total_scenes
            ))
            .for_key("pacing.total_scenes"));
        }
        let challenge_positions: BTreeSet<usize> = challenge_positions.into_iter().collect();
        for &position in &challenge_positions {
            if position == total_scenes {
                return Err(ConfigError::new(format!(
                    "challenge position {} collides with the final scene",
                    position
                ))
                .for_key("pacing.challenge_positions"));
            }
            if position < 2 || position > total_scenes {
                return Err(ConfigError::new(format!(
                    "challenge position {} must lie between 2 and {}",
                    position,
                    total_scenes - 1
                ))
                .for_key("pacing.challenge_positions"));
            }
        }
        Ok(Self {
            total_scenes,
            challenge_positions,
        })
    }

    /// Total number of real scenes in a story.
    pub fn total_scenes(&self) -> usize {
        self.total_scenes
    }

    /// Positions that must be challenge scenes, ascending.
    pub fn challenge_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.challenge_positions.iter().copied()
    }

    /// Position of the ending scene.
    pub fn final_scene_position(&self) -> usize {
        self.total_scenes
    }

    /// Role required of the scene at `position`.
    pub fn role_at(&self, position: usize) -> SceneRole {
        if position == self.final_scene_position() {
            SceneRole::Ending
        } else if self.challenge_positions.contains(&position) {
            SceneRole::Challenge
        } else {
            SceneRole::Normal
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            total_scenes: 6,
            challenge_positions: BTreeSet::from([3, 5]),
        }
    }
}

impl TryFrom<PacingSpec> for PacingConfig {
    type Error = ConfigError;

    fn try_from(spec: PacingSpec) -> Result<Self, Self::Error> {
        Self::try_new(spec.total_scenes, spec.challenge_positions)
    }
}

impl From<PacingConfig> for PacingSpec {
    fn from(config: PacingConfig) -> Self {
        Self {
            total_scenes: config.total_scenes,
            challenge_positions: config.challenge_positions.into_iter().collect(),
        }
    }
}
