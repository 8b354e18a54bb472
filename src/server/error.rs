use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::CoreError;

/// Client-facing error. The only thing the API ever returns as an error is a
/// 400 for a malformed request; every downstream failure is absorbed into an
/// operation fallback body long before it could reach this type.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "type": "bad_request",
                "message": self.to_string(),
            }
        }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}
