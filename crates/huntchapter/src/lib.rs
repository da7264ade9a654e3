//! HuntChapter - interactive fiction written by language models
//!
//! HuntChapter plays short choice-based adventures. Each scene is generated
//! on demand, validated against the shape its position requires, and
//! illustrated when an image backend is available.
//!
//! # Features
//!
//! - **Paced stories**: a fixed scene count with mandatory challenge scenes
//!   and a win/loss ending
//! - **Local first**: an on-device model authors the story while it works;
//!   on failure the session is replayed on a remote model
//! - **Self-correcting generation**: malformed scenes are retried with
//!   corrective prompts
//! - **HTTP server**: a generation relay and a JSON game API
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use huntchapter::{HuntChapterConfig, Runtime, Universe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runtime = Runtime::from_config(HuntChapterConfig::load()?)?;
//!     let engine = runtime.engine();
//!
//!     let session = engine.start_game(Universe::Arcanes.params("Oracle, Ruins")).await?;
//!     println!("{}", session.latest_scene().map(|s| s.narration.as_str()).unwrap_or(""));
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `ollama` (default) - local generation through an Ollama daemon
//!
//! # Architecture
//!
//! - `huntchapter_error` - Error types
//! - `huntchapter_core` - Scenes, sessions, pacing and wire types
//! - `huntchapter_interface` - Backend and repository traits
//! - `huntchapter_models` - Gemini, relay, local and image backends
//! - `huntchapter_story` - Validation, prompts, retries and the story engine
//!
//! This crate re-exports everything and adds configuration, provider
//! wiring and the HTTP server.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod runtime;
pub mod server;

pub use config::{
    GenerationSection, HuntChapterConfig, ImageFallback, ImageProvider, ImagesSection,
    LocalSection, RemoteProvider, RemoteSection, ServerSection,
};
pub use runtime::Runtime;

pub use huntchapter_core::*;
pub use huntchapter_error::*;
pub use huntchapter_interface::*;
pub use huntchapter_models::*;
pub use huntchapter_story::*;
