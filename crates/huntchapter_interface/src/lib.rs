//! Trait definitions for the HuntChapter story engine.
//!
//! Generation backends, image backends, local model sessions and session
//! storage are all reached through the traits in this crate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod repository;
mod traits;

pub use repository::SessionRepository;
pub use traits::{ImageGenerator, LocalSessionFactory, LocalTextSession, TextGenerator};
