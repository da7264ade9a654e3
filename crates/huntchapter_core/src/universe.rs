//! Preset story universes offered to players.

use crate::StoryParams;
use serde::{Deserialize, Serialize};

/// A ready-made combination of genre, tone and point of view.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Universe {
    /// Explorations, alliances and mysteries in the cosmic void
    #[display("Stellar Frontiers")]
    Frontieres,
    /// Ancient magic, legendary creatures and forgotten kingdoms
    #[display("Myths and Arcana")]
    Arcanes,
    /// Neon streets, modern conspiracies and megacity secrets
    #[display("Urban Enigmas")]
    Metropole,
    /// Empires, expeditions and political intrigue across the centuries
    #[display("Historical Chronicles")]
    Heritages,
}

impl Universe {
    /// Short description shown when picking a universe.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Frontieres => "Explorations, alliances and mysteries at the heart of the cosmic void.",
            Self::Arcanes => "Ancient magic, legendary creatures and forgotten kingdoms.",
            Self::Metropole => "Neon streets, modern conspiracies and the secrets of megacities.",
            Self::Heritages => "Empires, expeditions and political intrigue through the centuries.",
        }
    }

    /// Genre handed to the storyteller.
    pub fn genre(&self) -> &'static str {
        match self {
            Self::Frontieres => "Science-fiction",
            Self::Arcanes => "Fantasy",
            Self::Metropole => "Urban thriller",
            Self::Heritages => "Historical",
        }
    }

    /// Tone handed to the storyteller.
    pub fn tone(&self) -> &'static str {
        match self {
            Self::Frontieres => "Intense",
            Self::Arcanes => "Epic",
            Self::Metropole => "Dark",
            Self::Heritages => "Dramatic",
        }
    }

    /// Motifs suitable as a setting when the player names none.
    pub fn motifs(&self) -> &'static [&'static str] {
        match self {
            Self::Frontieres => &[
                "Station", "Nebula", "Colony", "Anomaly", "Artifact", "Relay", "Citadel", "Pulsar",
            ],
            Self::Arcanes => &[
                "Forest", "Castle", "Prophecy", "Ruins", "Oracle", "Labyrinth", "Grimoire", "Eclipse",
            ],
            Self::Metropole => &[
                "Metro", "Neon", "Alley", "Witness", "Darknet", "Warehouse", "Rooftop", "Signal",
            ],
            Self::Heritages => &[
                "Dynasty", "Citadel", "Caravel", "Abbey", "Senate", "Guild", "Lighthouse", "Scriptorium",
            ],
        }
    }

    /// Story parameters for this universe with the given setting.
    ///
    /// # Examples
    ///
    /// ```
    /// use huntchapter_core::Universe;
    ///
    /// let params = Universe::Arcanes.params("Oracle, Ruins");
    /// assert_eq!(params.genre(), "Fantasy");
    /// assert_eq!(params.pov(), "second person");
    /// ```
    pub fn params(&self, setting: impl Into<String>) -> StoryParams {
        StoryParams::new(self.genre(), self.tone(), "second person", setting)
    }
}
