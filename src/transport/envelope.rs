// Response envelope — spec.md §4.1: `{error, message, data?}` with CORS and
// JSON content-type headers on every response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub error: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: None,
        }
    }

    pub fn ok_with_data(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            data: None,
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Maps a `CoreError` onto the wire envelope: `Internal` still logs (it
/// would otherwise be silently downgraded to a 200), everything else is a
/// plain `error: true` reply per spec.md §7's "soft failure" kinds.
impl From<crate::errors::CoreError> for Envelope {
    fn from(err: crate::errors::CoreError) -> Self {
        if err.is_internal() {
            tracing::error!(error = %err, "internal error handling request");
        }
        Envelope::err(err.to_string())
    }
}

/// A handler-level internal failure, per spec.md §7: "return 500 with a
/// generic envelope; log at error level".
pub struct InternalError(pub String);

impl IntoResponse for InternalError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "internal error handling request");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(Envelope::err(self.0))).into_response()
    }
}
