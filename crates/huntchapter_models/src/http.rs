//! Shared HTTP plumbing for remote backends.

use huntchapter_error::{BackendError, BackendErrorKind, HttpError, HttpErrorKind};
use std::time::Duration;

/// Longest upstream error body kept in messages.
pub(crate) const ERROR_BODY_LIMIT: usize = 500;

/// Build a client for `backend` with a whole-request timeout.
pub(crate) fn client_with_timeout(
    backend: &'static str,
    timeout: Duration,
) -> Result<reqwest::Client, HttpError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| {
            HttpError::new(HttpErrorKind::ClientBuild {
                backend,
                reason: e.to_string(),
            })
        })
}

/// Map a transport failure onto the backend taxonomy.
#[track_caller]
pub(crate) fn transport_error(err: &reqwest::Error, timeout: Duration) -> BackendError {
    if err.is_timeout() {
        BackendError::new(BackendErrorKind::Timeout {
            waited_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })
    } else {
        BackendError::unavailable(format!("Request failed: {}", err))
    }
}

/// Truncate an upstream body on a character boundary.
pub(crate) fn snippet(body: &str) -> String {
    body.chars().take(ERROR_BODY_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_respects_char_boundaries() {
        let body = "é".repeat(ERROR_BODY_LIMIT + 10);
        assert_eq!(snippet(&body).chars().count(), ERROR_BODY_LIMIT);
        assert_eq!(snippet("short"), "short");
    }
}
