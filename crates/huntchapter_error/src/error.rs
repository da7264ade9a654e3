//! Top-level error wrapper types.

use crate::{
    BackendError, ConfigError, EngineError, HttpError, IllustrationError, JsonError, StorageError,
    ValidationError,
};

/// Every error condition surfaced by the HuntChapter crates.
///
/// # Examples
///
/// ```
/// use huntchapter_error::{HttpError, HttpErrorKind, HuntChapterError};
///
/// let http_err = HttpError::new(HttpErrorKind::Serve("connection reset".to_string()));
/// let err: HuntChapterError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum HuntChapterErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON rendering error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Scene shape validation error
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Text generation backend error
    #[from(BackendError)]
    Backend(BackendError),
    /// Image generation error
    #[from(IllustrationError)]
    Illustration(IllustrationError),
    /// Story engine error
    #[from(EngineError)]
    Engine(EngineError),
    /// Session storage error
    #[from(StorageError)]
    Storage(StorageError),
}

/// HuntChapter error with kind discrimination.
///
/// # Examples
///
/// ```
/// use huntchapter_error::{ConfigError, HuntChapterResult};
///
/// fn might_fail() -> HuntChapterResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("HuntChapter Error: {}", _0)]
pub struct HuntChapterError(Box<HuntChapterErrorKind>);

impl HuntChapterError {
    /// Create a new error from a kind.
    pub fn new(kind: HuntChapterErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &HuntChapterErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to HuntChapterErrorKind
impl<T> From<T> for HuntChapterError
where
    T: Into<HuntChapterErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for HuntChapter operations.
pub type HuntChapterResult<T> = std::result::Result<T, HuntChapterError>;
