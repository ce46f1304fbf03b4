use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::books::ValidationErrors;

pub type ApiResult<T> = Result<T, ApiError>;

/// Everything a books handler can fail with, mapped onto a status code and body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// One or more fields were rejected; the body is the field-to-reasons map.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("JSON parse error - {0}")]
    MalformedJson(String),

    #[error("Unsupported media type \"{0}\" in request.")]
    UnsupportedMediaType(String),

    /// Unknown id or a path segment that is not an id at all.
    #[error("not found")]
    NotFound,

    /// Storage failures are logged, never echoed to the caller.
    #[error("{operation} failed")]
    Storage {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn storage(operation: &'static str) -> impl FnOnce(anyhow::Error) -> ApiError {
        move |source| ApiError::Storage { operation, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MalformedJson(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::Validation(errors) => (status, Json(errors)).into_response(),
            ApiError::MalformedJson(_) | ApiError::UnsupportedMediaType(_) => {
                (status, Json(json!({ "detail": self.to_string() }))).into_response()
            }
            ApiError::NotFound => status.into_response(),
            ApiError::Storage { operation, ref source } => {
                tracing::error!(operation, error = %crate::unpack_error(source.as_ref()), "storage error");
                (
                    status,
                    Json(ErrorResponse {
                        error: self.to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}
