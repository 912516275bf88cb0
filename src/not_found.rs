//! The catch-all responders for requests that do not match a route.

use axum::{http::StatusCode, response::Response};

use crate::Envelope;

/// Responds to requests for unknown routes.
pub async fn get_404_not_found() -> Response {
    Envelope::failure("Route not found").into_response_with(StatusCode::NOT_FOUND)
}

/// Responds to requests for a known route with an unsupported HTTP method.
pub async fn get_405_method_not_allowed() -> Response {
    Envelope::failure("Method not allowed").into_response_with(StatusCode::METHOD_NOT_ALLOWED)
}
