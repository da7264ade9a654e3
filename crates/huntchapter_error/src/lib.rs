//! Error types for the HuntChapter story engine.
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use huntchapter_error::{HuntChapterResult, HttpError, HttpErrorKind};
//!
//! fn listen() -> HuntChapterResult<String> {
//!     Err(HttpError::new(HttpErrorKind::Serve("connection reset".to_string())))?
//! }
//!
//! match listen() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod config;
mod engine;
mod error;
mod http;
mod illustration;
mod json;
mod storage;
mod validation;

pub use backend::{BackendError, BackendErrorKind};
pub use config::ConfigError;
pub use engine::{EngineError, EngineErrorKind, EngineResult};
pub use error::{HuntChapterError, HuntChapterErrorKind, HuntChapterResult};
pub use http::{HttpError, HttpErrorKind};
pub use illustration::IllustrationError;
pub use json::JsonError;
pub use storage::{StorageError, StorageErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};
