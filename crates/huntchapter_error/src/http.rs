//! HTTP plumbing errors: outbound clients and the listening server.

/// What went wrong with HTTP plumbing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum HttpErrorKind {
    /// An outbound client for a remote backend could not be built
    #[display("Failed to build client for {}: {}", backend, reason)]
    ClientBuild {
        /// Backend the client was meant for
        backend: &'static str,
        /// Underlying cause
        reason: String,
    },
    /// The game server could not listen on its address
    #[display("Failed to bind {}: {}", address, reason)]
    Bind {
        /// Requested socket address
        address: String,
        /// Underlying cause
        reason: String,
    },
    /// The game server stopped with an error
    #[display("Server stopped: {}", _0)]
    Serve(String),
}

/// HTTP error with source location.
///
/// # Examples
///
/// ```
/// use huntchapter_error::{HttpError, HttpErrorKind};
///
/// let err = HttpError::new(HttpErrorKind::Bind {
///     address: "127.0.0.1:8787".to_string(),
///     reason: "address in use".to_string(),
/// });
/// assert!(err.to_string().contains("127.0.0.1:8787"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("HTTP Error: {} at line {} in {}", kind, line, file)]
pub struct HttpError {
    /// What failed
    pub kind: HttpErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl HttpError {
    /// Create a new HttpError at the current location.
    #[track_caller]
    pub fn new(kind: HttpErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
