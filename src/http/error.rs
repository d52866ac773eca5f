use crate::domain::error::ServiceError;
use crate::domain::record::ErrorBody;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub fn error_response(status: StatusCode, error: impl Into<String>, details: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.into(),
            details: details.into(),
        }),
    )
        .into_response()
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation { .. } => StatusCode::BAD_REQUEST,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
            ServiceError::EmptyPage { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Infrastructure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string(), self.details())
    }
}
