use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::{
    adapters::inbound::http::dto::{ErrorResponseDto, ValidationErrorResponseDto},
    domain::errors::{StorageError, ValidationError},
};

/// Errors a handler can return
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed: {}", .0.len())]
    Validation(Vec<ValidationError>),

    #[error("resource not found")]
    NotFound,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn validation(error: ValidationError) -> Self {
        ApiError::Validation(vec![error])
    }
}

impl From<Vec<ValidationError>> for ApiError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(ValidationError::MalformedBody(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorResponseDto::from_validation_errors(&errors)),
            )
                .into_response(),
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Storage(e) => {
                let status = StatusCode::from(&e);
                if status.is_server_error() {
                    error!(error = %e, "Request failed");
                }
                (status, Json(ErrorResponseDto::from_storage_error(&e))).into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
