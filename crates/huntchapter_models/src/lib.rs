//! Text and image generation backends for HuntChapter.
//!
//! # Available Backends
//!
//! - **Gemini** (Google REST API) for text and images
//! - **Relay** for any server speaking the `/api/generate` protocol
//! - **Local** sessions on an on-device model, with Ollama behind the `ollama` feature
//! - **Pollinations** seeded image URLs, computed without a network call
//!
//! ```no_run
//! use huntchapter_core::GenerationRequest;
//! use huntchapter_interface::TextGenerator;
//! use huntchapter_models::GeminiClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::from_env("gemini-2.0-flash")?;
//! let text = client.generate(&GenerationRequest::new("Say hi in JSON")).await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod gemini;
mod http;
mod local;
mod pollinations;
mod relay;

#[cfg(feature = "ollama")]
mod ollama;

pub use gemini::{GeminiClient, GeminiImageClient};
pub use local::{LocalProvider, LocalTimeouts};
pub use pollinations::PollinationsImages;
pub use relay::{RelayClient, RelayImageClient};

#[cfg(feature = "ollama")]
pub use ollama::{OllamaSession, OllamaSessionFactory};
