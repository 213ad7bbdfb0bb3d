use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::store::StoreError;
use crate::views::ViewError;

/// Error codes of the callable protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Unauthenticated,
    InvalidArgument,
    NotFound,
    Internal,
}

impl Status {
    pub fn http(self) -> StatusCode {
        match self {
            Status::Unauthenticated => StatusCode::UNAUTHORIZED,
            Status::InvalidArgument => StatusCode::BAD_REQUEST,
            Status::NotFound => StatusCode::NOT_FOUND,
            Status::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: Status,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

impl ViewError {
    pub fn status(&self) -> Status {
        match self {
            ViewError::Unauthenticated { .. } => Status::Unauthenticated,
            ViewError::InvalidArgument { .. } => Status::InvalidArgument,
            ViewError::Store {
                source: StoreError::NotFound { .. },
            } => Status::NotFound,
            ViewError::Store { .. } => Status::Internal,
        }
    }
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match status {
            Status::Internal => {
                tracing::error!(error = %self, "call failed");
                "INTERNAL".to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorBody { status, message },
        };

        (status.http(), Json(body)).into_response()
    }
}
