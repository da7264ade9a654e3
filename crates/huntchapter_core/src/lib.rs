//! Core data types for the HuntChapter story engine.
//!
//! Scenes, choice markers, session records, pacing rules and the payloads
//! exchanged with generation backends.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod image;
mod pacing;
mod params;
mod relay;
mod request;
mod scene;
mod session;
mod universe;

pub use image::{ImagePrompt, ImageRef, hash_seed};
pub use pacing::{PacingConfig, SceneRole};
pub use params::{StoryParams, StoryParamsBuilder};
pub use relay::{RelayErrorBody, RelayImageResponse, RelayRequest, RelayTextResponse};
pub use request::{GenerationRequest, PromptPayload};
pub use scene::{
    Challenge, ChoiceMarker, EntryId, HistoryEntry, Outcome, Scene, SceneBody, SceneContent,
    SceneStatus,
};
pub use session::{Mode, Session, SessionId, SessionSummary};
pub use universe::Universe;
