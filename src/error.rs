//! Error type shared by the store client, the categorization client and the HTTP layer.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
  /// Endpoint unreachable, non-2xx status, or a body we could not read.
  #[error("Remote unavailable: {0}")]
  RemoteUnavailable(String),

  /// The store answered with `status: "error"`.
  #[error("Remote rejected request: {0}")]
  RemoteRejected(String),

  /// Every candidate model failed, or none returned a usable reply.
  #[error("Categorization failed: {0}")]
  CategorizationFailed(String),

  /// A required endpoint URL or API key is missing from the environment.
  #[error("Not configured: {0}")]
  NotConfigured(&'static str),

  #[error("Invalid input: {0}")]
  InvalidInput(String),
}

impl AppError {
  fn kind(&self) -> &'static str {
    match self {
      AppError::RemoteUnavailable(_) => "remote_unavailable",
      AppError::RemoteRejected(_) => "remote_rejected",
      AppError::CategorizationFailed(_) => "categorization_failed",
      AppError::NotConfigured(_) => "not_configured",
      AppError::InvalidInput(_) => "invalid_input",
    }
  }

  fn status(&self) -> StatusCode {
    match self {
      AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
      AppError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
      AppError::RemoteUnavailable(_)
      | AppError::RemoteRejected(_)
      | AppError::CategorizationFailed(_) => StatusCode::BAD_GATEWAY,
    }
  }
}

impl From<reqwest::Error> for AppError {
  fn from(e: reqwest::Error) -> Self {
    AppError::RemoteUnavailable(e.to_string())
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let body = Json(json!({ "error": self.kind(), "message": self.to_string() }));
    (self.status(), body).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_codes_follow_error_kind() {
    assert_eq!(AppError::InvalidInput("x".into()).into_response().status(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::NotConfigured("GEMINI_API_KEY").into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(AppError::RemoteRejected("no".into()).into_response().status(), StatusCode::BAD_GATEWAY);
  }

  #[test]
  fn display_carries_remote_message() {
    let e = AppError::RemoteRejected("Invalid action".into());
    assert_eq!(e.to_string(), "Remote rejected request: Invalid action");
  }
}
