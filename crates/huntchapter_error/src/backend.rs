//! Generation backend error types.

/// Failure modes of a text generation backend.
///
/// Every kind is treated as a reason to leave a local backend for the remote one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum BackendErrorKind {
    /// Backend missing, unreachable, returned an error status or empty output
    #[display("Backend unavailable: {}", _0)]
    Unavailable(String),
    /// Backend did not answer within the allotted time
    #[display("Backend timed out after {} ms", waited_ms)]
    Timeout {
        /// Milliseconds waited before giving up
        waited_ms: u64,
    },
    /// Output kept failing shape validation after every retry
    #[display("Invalid response after {} attempts: {}", attempts, last_error)]
    InvalidResponse {
        /// Total attempts made, including the first
        attempts: u32,
        /// Description of the last validation failure
        last_error: String,
    },
}

/// Generation backend error with source location.
///
/// # Examples
///
/// ```
/// use huntchapter_error::{BackendError, BackendErrorKind};
///
/// let err = BackendError::new(BackendErrorKind::Timeout { waited_ms: 5000 });
/// assert!(format!("{}", err).contains("5000 ms"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Backend Error: {} at line {} in {}", kind, line, file)]
pub struct BackendError {
    /// The specific error condition
    pub kind: BackendErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl BackendError {
    /// Create a new BackendError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: BackendErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for [`BackendErrorKind::Unavailable`].
    #[track_caller]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Unavailable(message.into()))
    }

    /// Whether the backend gave up waiting.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, BackendErrorKind::Timeout { .. })
    }
}
