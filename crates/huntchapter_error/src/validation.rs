//! Scene validation error types.

/// Reasons a generated payload fails the shape contract for its role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ValidationErrorKind {
    /// Payload could not be parsed as JSON at all
    #[display("response is not valid JSON: {}", _0)]
    NotJson(String),
    /// Required field is absent or null
    #[display("field is required")]
    Missing,
    /// Field has the wrong JSON type
    #[display("expected {}", _0)]
    WrongType(&'static str),
    /// String is empty after trimming
    #[display("must not be empty")]
    Empty,
    /// Array has the wrong number of items
    #[display("expected {} items, found {}", expected, found)]
    WrongCount {
        /// Human readable expectation, e.g. "exactly 3" or "2 to 4"
        expected: &'static str,
        /// Number of items present
        found: usize,
    },
    /// Field is not allowed for the scene role being generated
    #[display("not allowed in a {} scene", _0)]
    Forbidden(&'static str),
    /// Field value is outside the accepted set
    #[display("invalid value: {}", _0)]
    InvalidValue(String),
}

/// Shape-contract violation for one field of a generated scene.
///
/// # Examples
///
/// ```
/// use huntchapter_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new("options", ValidationErrorKind::WrongCount {
///     expected: "exactly 3",
///     found: 2,
/// });
/// assert_eq!(err.describe(), "`options`: expected exactly 3 items, found 2");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: `{}` {} at line {} in {}", field, kind, line, file)]
pub struct ValidationError {
    /// Path of the offending field, e.g. `challenge.choices[1]`
    pub field: String,
    /// The specific violation
    pub kind: ValidationErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new ValidationError with automatic location tracking.
    #[track_caller]
    pub fn new(field: impl Into<String>, kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            field: field.into(),
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Field and violation without source location, suitable for feeding back to a model.
    pub fn describe(&self) -> String {
        format!("`{}`: {}", self.field, self.kind)
    }
}
