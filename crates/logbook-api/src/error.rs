//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use logbook_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The operator headers were absent or unreadable.
  #[error("missing operator header: {0}")]
  Unauthenticated(&'static str),

  #[error(transparent)]
  Core(#[from] CoreError),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let message = self.to_string();
    let (status, body) = match self {
      ApiError::Unauthenticated(_) => {
        (StatusCode::UNAUTHORIZED, json!({ "error": message }))
      }
      ApiError::Core(CoreError::PermissionDenied { .. }) => {
        (StatusCode::FORBIDDEN, json!({ "error": message }))
      }
      ApiError::Core(CoreError::NotFound { .. }) => {
        (StatusCode::NOT_FOUND, json!({ "error": message }))
      }
      ApiError::Core(CoreError::DuplicateActiveVisit { entry_id, badge_number, .. }) => (
        StatusCode::CONFLICT,
        json!({
          "error":             message,
          "existing_entry_id": entry_id,
          "badge_number":      badge_number,
        }),
      ),
      ApiError::Core(CoreError::InvalidTransition { .. }) => {
        (StatusCode::CONFLICT, json!({ "error": message }))
      }
      ApiError::Core(CoreError::Validation(_)) => {
        (StatusCode::UNPROCESSABLE_ENTITY, json!({ "error": message }))
      }
      // Internal detail stays in the log.
      ApiError::Core(CoreError::Configuration(_) | CoreError::Store(_)) => {
        tracing::error!(error = %message, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "internal error" }))
      }
    };
    (status, Json(body)).into_response()
  }
}
