//! Errors rendering records as JSON for output.

/// A record that could not be rendered as JSON.
///
/// # Examples
///
/// ```
/// use huntchapter_error::JsonError;
///
/// let err = JsonError::new("session summaries", "key must be a string");
/// assert_eq!(err.subject, "session summaries");
/// assert!(err.to_string().contains("Could not render session summaries"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: Could not render {}: {} at line {} in {}", subject, reason, line, file)]
pub struct JsonError {
    /// What was being rendered
    pub subject: String,
    /// Serializer message
    pub reason: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// Rendering `subject` failed with `reason`.
    #[track_caller]
    pub fn new(subject: impl Into<String>, reason: impl ToString) -> Self {
        let location = std::panic::Location::caller();
        Self {
            subject: subject.into(),
            reason: reason.to_string(),
            line: location.line(),
            file: location.file(),
        }
    }
}
