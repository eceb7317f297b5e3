//! Common response builders for API handlers.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// 200 OK acknowledging a webhook, with the disposition in `status`.
#[must_use]
pub fn ack(status: &str) -> Response {
    (StatusCode::OK, Json(json!({ "ok": true, "status": status }))).into_response()
}

/// 200 OK echoing a `url_verification` challenge.
#[must_use]
pub fn challenge_response(challenge: &str) -> Response {
    (StatusCode::OK, Json(json!({ "challenge": challenge }))).into_response()
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
