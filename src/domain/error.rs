use crate::domain::status::RecordStatus;
use crate::repo::StoreError;
use thiserror::Error;

/// Failures surfaced to the transport. `details` is the short client-facing
/// summary; `Display` is the specific cause.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{error}")]
    Validation { error: String, details: String },

    #[error("{error}")]
    NotFound { id: i64, error: String, details: String },

    #[error("{error}")]
    InvalidTransition {
        id: i64,
        current: RecordStatus,
        requested: RecordStatus,
        error: String,
        details: String,
    },

    #[error("{source}")]
    Infrastructure {
        #[source]
        source: StoreError,
        details: String,
    },

    #[error("{error}")]
    EmptyPage { error: String, details: String },
}

impl ServiceError {
    pub fn validation(error: impl Into<String>, details: impl Into<String>) -> Self {
        ServiceError::Validation {
            error: error.into(),
            details: details.into(),
        }
    }

    pub fn infrastructure(source: StoreError, details: impl Into<String>) -> Self {
        ServiceError::Infrastructure {
            source,
            details: details.into(),
        }
    }

    pub fn details(&self) -> &str {
        match self {
            ServiceError::Validation { details, .. }
            | ServiceError::NotFound { details, .. }
            | ServiceError::InvalidTransition { details, .. }
            | ServiceError::Infrastructure { details, .. }
            | ServiceError::EmptyPage { details, .. } => details,
        }
    }
}
