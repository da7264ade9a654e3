//! Story engine error types.

use crate::BackendErrorKind;

/// Conditions under which a story engine operation is refused or fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum EngineErrorKind {
    /// No story has been started
    #[display("No story in progress")]
    NotStarted,
    /// A story is already running; reset it first
    #[display("A story is already in progress")]
    AlreadyStarted,
    /// Another generation is in flight
    #[display("A generation is already in progress")]
    Busy,
    /// The story reached its ending; only navigation and reset remain
    #[display("The story has ended")]
    StoryEnded,
    /// The submitted choice was blank
    #[display("Choice text must not be empty")]
    EmptyChoice,
    /// The latest scene is not a challenge
    #[display("The latest scene has no challenge to answer")]
    NoChallenge,
    /// Challenge answer index does not name one of the choices
    #[display("Challenge choice {} is out of range ({} choices)", index, available)]
    ChoiceOutOfRange {
        /// Requested index
        index: usize,
        /// Number of choices offered
        available: usize,
    },
    /// The remote backend failed; the turn was rolled back and may be retried
    #[display("Generation failed: {}", _0)]
    Generation(BackendErrorKind),
    /// Neither backend could carry the session forward
    #[display("Fatal session error: {}", _0)]
    Fatal(String),
    /// A previous fatal error left the session unusable
    #[display("Session failed earlier; reset required")]
    ResetRequired,
}

/// Story engine error with source location.
///
/// # Examples
///
/// ```
/// use huntchapter_error::{EngineError, EngineErrorKind};
///
/// let err = EngineError::new(EngineErrorKind::Busy);
/// assert!(!err.is_fatal());
/// assert!(format!("{}", err).contains("in progress"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Engine Error: {} at line {} in {}", kind, line, file)]
pub struct EngineError {
    /// The specific error condition
    pub kind: EngineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl EngineError {
    /// Create a new EngineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: EngineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether the session must be reset before it can be used again.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            EngineErrorKind::Fatal(_) | EngineErrorKind::ResetRequired
        )
    }
}

/// Result type for story engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
