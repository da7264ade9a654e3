//! Wire types of the HTTP generation relay.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate` and `POST /api/generate-image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRequest {
    /// Prompt forwarded to the upstream model
    pub prompt: String,
}

/// Successful text relay response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayTextResponse {
    /// Raw model output
    pub text: String,
}

/// Successful image relay response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayImageResponse {
    /// `data:image/png;base64,...` URI
    pub image: String,
}

/// Failure body of every relay endpoint.
///
/// # Examples
///
/// ```
/// use huntchapter_core::RelayErrorBody;
///
/// let body = RelayErrorBody::new("Missing prompt");
/// assert!(!body.aborted);
/// assert_eq!(body.status, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayErrorBody {
    /// Human readable reason
    pub error: String,
    /// Upstream HTTP status, when the upstream answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Leading part of the upstream error body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Whether the upstream call was abandoned on timeout
    #[serde(default)]
    pub aborted: bool,
}

impl RelayErrorBody {
    /// Error body carrying only a reason.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: None,
            body: None,
            aborted: false,
        }
    }
}
