use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Transport-level failure code of a remote procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Code {
  InvalidArgument,
  NotFound,
  Internal,
}

impl Code {
  pub fn http_status(self) -> StatusCode {
    match self {
      Code::InvalidArgument => StatusCode::BAD_REQUEST,
      Code::NotFound => StatusCode::NOT_FOUND,
      Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

/// Error returned by every remote procedure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code:?}: {message}")]
pub struct Status {
  pub code: Code,
  pub message: String,
}

impl Status {
  pub fn new(code: Code, message: impl Into<String>) -> Self {
    Self {
      code,
      message: message.into(),
    }
  }

  pub fn invalid_argument(message: impl Into<String>) -> Self {
    Self::new(Code::InvalidArgument, message)
  }

  pub fn not_found(message: impl Into<String>) -> Self {
    Self::new(Code::NotFound, message)
  }

  pub fn internal(message: impl Into<String>) -> Self {
    Self::new(Code::Internal, message)
  }
}

/// Wire body of a failed procedure call
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
  pub code: Code,
  pub msg: String,
}

impl IntoResponse for Status {
  fn into_response(self) -> Response {
    match self.code {
      Code::Internal => tracing::error!(message = %self.message, "procedure failed"),
      Code::NotFound | Code::InvalidArgument => {
        tracing::warn!(code = ?self.code, message = %self.message, "procedure rejected")
      }
    }

    let body = ErrorResponse {
      code: self.code,
      msg: self.message,
    };
    (self.code.http_status(), Json(body)).into_response()
  }
}

impl From<crate::validation::ValidationError> for Status {
  fn from(err: crate::validation::ValidationError) -> Self {
    Status::invalid_argument(err.to_string())
  }
}
