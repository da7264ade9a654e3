//! HTTP error responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use huntchapter_core::RelayErrorBody;
use huntchapter_error::{
    BackendErrorKind, EngineError, EngineErrorKind, HuntChapterError, HuntChapterErrorKind,
    StorageErrorKind,
};
use tracing::warn;

/// Longest upstream error excerpt echoed to clients.
const BODY_EXCERPT_CHARS: usize = 500;

/// Status code plus the JSON error body every endpoint uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status
    pub status: StatusCode,
    /// JSON body
    pub body: RelayErrorBody,
}

impl ApiError {
    /// Error with a status and a reason.
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: RelayErrorBody::new(error),
        }
    }

    /// 400 with a reason.
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// 404 for an unknown session.
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("Not found: {}", what))
    }

    /// Map an upstream generation failure: 504 on timeout, 502 otherwise.
    pub fn upstream(kind: &BackendErrorKind) -> Self {
        match kind {
            BackendErrorKind::Timeout { .. } => {
                let mut error = Self::new(StatusCode::GATEWAY_TIMEOUT, "Upstream timeout");
                error.body.aborted = true;
                error
            }
            other => {
                let mut error = Self::new(StatusCode::BAD_GATEWAY, "Upstream error");
                error.body.body = Some(other.to_string().chars().take(BODY_EXCERPT_CHARS).collect());
                error
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        let status = match &e.kind {
            EngineErrorKind::Generation(kind) => return Self::upstream(kind),
            EngineErrorKind::EmptyChoice
            | EngineErrorKind::NoChallenge
            | EngineErrorKind::ChoiceOutOfRange { .. } => StatusCode::BAD_REQUEST,
            EngineErrorKind::NotStarted
            | EngineErrorKind::AlreadyStarted
            | EngineErrorKind::Busy
            | EngineErrorKind::StoryEnded
            | EngineErrorKind::ResetRequired => StatusCode::CONFLICT,
            EngineErrorKind::Fatal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!(error = %e, "Engine failure");
        }
        Self::new(status, e.kind.to_string())
    }
}

impl From<HuntChapterError> for ApiError {
    fn from(e: HuntChapterError) -> Self {
        match e.kind() {
            HuntChapterErrorKind::Engine(engine) => engine.clone().into(),
            HuntChapterErrorKind::Storage(storage) => match &storage.kind {
                StorageErrorKind::NotFound(id) => Self::not_found(format!("session {}", id)),
                other => {
                    warn!(error = %storage, "Storage failure");
                    Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
                }
            },
            HuntChapterErrorKind::Backend(backend) => Self::upstream(&backend.kind),
            _ => {
                warn!(error = %e, "Request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}
