//! HTTP error type and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Scheduler credential missing or invalid.
  #[error("unauthorized")]
  Unauthorized,
  /// Operator credential missing or invalid; carries a Basic challenge.
  #[error("unauthorized")]
  OperatorUnauthorized,
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error("not found")]
  NotFound,
  #[error("cart is no longer active")]
  CartNotActive,
  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<trolley_core::Error> for Error {
  fn from(e: trolley_core::Error) -> Self {
    use trolley_core::Error as Core;
    match e {
      Core::InvalidInput(m) => Self::BadRequest(m),
      Core::NotFound => Self::NotFound,
      Core::NotActive => Self::CartNotActive,
      Core::Store(e) | Core::Mail(e) | Core::Catalog(e) => Self::Internal(e),
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized" })),
      )
        .into_response(),
      Error::OperatorUnauthorized => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": "unauthorized" })),
        )
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"trolley\""),
        );
        res
      }
      Error::BadRequest(msg) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
      }
      Error::NotFound => (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not found" })),
      )
        .into_response(),
      Error::CartNotActive => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "cart is no longer active" })),
      )
        .into_response(),
      Error::Internal(e) => {
        // Generic body; the detail goes to the log only.
        tracing::error!(error = %e, "request failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "internal error" })),
        )
          .into_response()
      }
    }
  }
}
