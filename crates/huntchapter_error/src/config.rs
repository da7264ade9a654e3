//! Configuration error types.

use std::fmt;

/// Invalid or missing configuration, optionally naming the offending key.
///
/// Keys are dotted paths into `huntchapter.toml`, such as
/// `generation.history_window`, or environment variable names.
///
/// # Examples
///
/// ```
/// use huntchapter_error::ConfigError;
///
/// let err = ConfigError::new("challenge position 6 collides with the final scene")
///     .for_key("pacing.challenge_positions");
/// assert_eq!(err.key.as_deref(), Some("pacing.challenge_positions"));
/// assert!(err.to_string().contains("[pacing.challenge_positions]"));
/// ```
#[derive(Debug, Clone, derive_more::Error)]
pub struct ConfigError {
    /// What is wrong
    pub message: String,
    /// Offending setting, when known
    pub key: Option<String>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with the given message at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            key: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Attribute the error to the setting at `key`.
    pub fn for_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration Error: ")?;
        if let Some(key) = &self.key {
            write!(f, "[{}] ", key)?;
        }
        write!(f, "{} at line {} in {}", self.message, self.line, self.file)
    }
}
