use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::{
    dao::storage::StorageError,
    services::csv_codec::CsvExportError,
    state::{session::DrawRejected, state_machine::TransitionError},
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The active pool has no entrant to draw.
    #[error("no names in the list")]
    EmptyPool,
    /// A draw is already spinning.
    #[error("a draw is already in progress")]
    DrawInProgress,
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Unexpected failure inside the service.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<CsvExportError> for ServiceError {
    fn from(err: CsvExportError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<DrawRejected> for ServiceError {
    fn from(err: DrawRejected) -> Self {
        match err {
            DrawRejected::EmptyPool => ServiceError::EmptyPool,
            DrawRejected::AlreadyDrawing => ServiceError::DrawInProgress,
        }
    }
}

impl From<TransitionError> for ServiceError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::InvalidTransition(invalid) => {
                ServiceError::InvalidState(invalid.to_string())
            }
            TransitionError::IdMismatch { .. } => {
                ServiceError::InvalidState("pending draw does not match".into())
            }
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Well-formed request that cannot be honoured with the current data.
    #[error("unprocessable: {0}")]
    Unprocessable(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Unexpected server-side failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::EmptyPool => AppError::Unprocessable(err.to_string()),
            ServiceError::DrawInProgress => AppError::Conflict(err.to_string()),
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Internal(message) => AppError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_rejections_map_to_client_errors() {
        let empty: AppError = ServiceError::from(DrawRejected::EmptyPool).into();
        let busy: AppError = ServiceError::from(DrawRejected::AlreadyDrawing).into();

        assert_eq!(
            empty.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(busy.into_response().status(), StatusCode::CONFLICT);
    }
}
