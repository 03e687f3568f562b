//! Failure taxonomy and the uniform response envelope.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Domain failure taxonomy. Every operation fails fast with one of these;
/// the boundary converts them into the uniform envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
  #[error("{0} not found")]
  NotFound(&'static str),
  #[error("{0}")]
  Conflict(String),
  #[error("{0}")]
  InvalidState(String),
  #[error("invalid or missing token")]
  Unauthorized,
  #[error("invalid credentials")]
  BadCredentials,
  #[error("storage unavailable")]
  Db(#[from] sqlx::Error),
  #[error("malformed record: {0}")]
  Corrupt(#[from] serde_json::Error),
  #[error("internal error")]
  Internal,
}

impl AppError {
  pub fn status(&self) -> StatusCode {
    match self {
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::InvalidState(_) => StatusCode::BAD_REQUEST,
      AppError::Unauthorized | AppError::BadCredentials => StatusCode::UNAUTHORIZED,
      AppError::Db(_) | AppError::Corrupt(_) => StatusCode::SERVICE_UNAVAILABLE,
      AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

/// Every endpoint responds with this shape; errors carry `metadata: false`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
  pub status_code: u16,
  pub msg: String,
  pub metadata: T,
}

/// Success envelope with HTTP 200.
pub fn ok<T: Serialize>(msg: &str, metadata: T) -> Json<Envelope<T>> {
  Json(Envelope {
    status_code: 200,
    msg: msg.to_string(),
    metadata,
  })
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!("request failed: {self}");
    }
    let body = Json(Envelope {
      status_code: status.as_u16(),
      msg: self.to_string(),
      metadata: false,
    });
    (status, body).into_response()
  }
}

pub type AppResult<T> = Result<T, AppError>;
