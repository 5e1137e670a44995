//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::QueryRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// A lookup matched no record.
  #[error("not found: {0}")]
  NotFound(String),

  /// A record was found but disagrees with another path segment, or a
  /// numeric parameter is out of range.
  #[error("bad request: {0}")]
  BadRequest(String),

  /// A path parameter failed validation before any query ran.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    ApiError::Store(Box::new(e))
  }
}

impl From<crs_core::Error> for ApiError {
  fn from(e: crs_core::Error) -> Self {
    use crs_core::Error as E;
    match e {
      E::LimitOutOfRange(_) | E::NegativeOffset(_) | E::VersionOutOfRange(_) => {
        ApiError::BadRequest(e.to_string())
      }
      E::InvalidWktId(_) | E::MalformedVersion(_) | E::BlankDatumName(_) => {
        ApiError::Validation(e.to_string())
      }
    }
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Validation(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
