//! The JSON envelope that wraps every response body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// The uniform response shape `{success, data|message}`.
///
/// Failed store operations additionally carry the underlying error in
/// `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    /// Whether the request was handled successfully.
    pub success: bool,
    /// The payload of a successful request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// A human readable status message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The underlying error for server-side failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// A successful response carrying `data`.
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }
}

impl Envelope<()> {
    /// A successful response with just a message.
    pub fn message(message: &str) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.to_owned()),
            error: None,
        }
    }

    /// A failed response with just a message.
    pub fn failure(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_owned()),
            error: None,
        }
    }

    /// A failed response that also reports the error that caused it.
    pub fn failure_with_error(message: &str, error: &impl std::fmt::Display) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_owned()),
            error: Some(error.to_string()),
        }
    }
}

impl<T: Serialize> Envelope<T> {
    /// Serialize the envelope as a JSON response with the given status code.
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        self.into_response_with(StatusCode::OK)
    }
}
