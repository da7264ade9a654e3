//! Image generation error types.

/// Image generation error with source location.
///
/// Never fatal: the illustrator logs it and the scene goes without artwork.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Illustration Error: {} at line {} in {}", message, line, file)]
pub struct IllustrationError {
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl IllustrationError {
    /// Create a new IllustrationError with the given message at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
