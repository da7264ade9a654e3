//! Story progression for choice-based interactive fiction.
//!
//! This crate turns raw text generation backends into a paced story:
//!
//! - [`validate`] enforces the shape of every generated scene
//! - [`PromptComposer`] writes intro and continuation instructions
//! - [`GenerationAdapter`] retries malformed output with corrective prompts
//! - [`Illustrator`] attaches artwork without ever failing a scene
//! - [`StoryEngine`] sequences scenes, falls back from the local backend to
//!   the remote one, and rolls failed turns back
//!
//! # Example
//!
//! ```no_run
//! use huntchapter_core::StoryParams;
//! use huntchapter_models::GeminiClient;
//! use huntchapter_story::{EngineConfig, StoryEngine};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let remote = Arc::new(GeminiClient::from_env("gemini-2.5-flash")?);
//!     let engine = StoryEngine::new(EngineConfig::default(), remote);
//!
//!     let params = StoryParams::new("Fantasy", "Epic", "second person", "A drowned city");
//!     let session = engine.start_game(params).await?;
//!     let options = session.latest_scene().and_then(|s| s.options().cloned());
//!     if let Some(options) = options {
//!         engine.submit_choice(&options[0]).await?;
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod config;
mod engine;
mod extraction;
mod illustrator;
mod placeholder;
mod prompt;
mod repository;
mod store;
mod validator;

pub use adapter::{DEFAULT_MAX_RETRIES, GenerationAdapter, corrective_prompt};
pub use config::{EngineConfig, EngineConfigBuilder, check_history_window};
pub use engine::{EnginePhase, StoryEngine};
pub use extraction::{extract_json, parse_json};
pub use illustrator::{Illustrator, build_image_prompt, hero_descriptor, style_preset};
pub use placeholder::PlaceholderImages;
pub use prompt::{
    ChallengeAnswer, DEFAULT_HISTORY_WINDOW, MAX_HISTORY_WINDOW, PlayerTurn, PromptComposer,
};
pub use repository::{FileSessionRepository, InMemorySessionRepository};
pub use store::{Checkpoint, SessionStore};
pub use validator::{MAX_CHALLENGE_CHOICES, MIN_CHALLENGE_CHOICES, OPTION_COUNT, validate};
