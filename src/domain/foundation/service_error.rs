//! Error surface returned by every application handler.
//!
//! Ports speak [`DomainError`]; handlers speak [`ServiceError`]. The four
//! terminal variants map one-to-one onto HTTP status codes. The two internal
//! variants exist so the transaction retry loop can tell a retryable abort
//! from a real failure.

use http::StatusCode;
use thiserror::Error;

use super::{DomainError, ErrorCode, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Actor lacks scope for an operation on a resource it can see.
    #[error("Permission denied")]
    PermissionDenied,

    /// Resource is missing, or inactive and invisible to the actor.
    #[error("{resource} not found{}", format_ids(.ids))]
    NotFound {
        resource: &'static str,
        ids: Vec<i64>,
    },

    /// Request collides with a live reservation or another slot.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Input is well-formed but breaks a business rule.
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Storage aborted the transaction; retried before it escapes.
    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),

    #[error("Infrastructure failure: {0}")]
    Infrastructure(String),
}

fn format_ids(ids: &[i64]) -> String {
    if ids.is_empty() {
        String::new()
    } else {
        format!(": {}", super::join_ids(ids))
    }
}

impl ServiceError {
    /// Not found for a single resource, without naming ids.
    pub fn not_found(resource: &'static str) -> Self {
        ServiceError::NotFound {
            resource,
            ids: Vec::new(),
        }
    }

    /// Not found naming the offending ids.
    pub fn not_found_ids<I, T>(resource: &'static str, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<i64>,
    {
        ServiceError::NotFound {
            resource,
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        ServiceError::Conflict(detail.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Status code the HTTP layer should answer with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::PermissionDenied => StatusCode::FORBIDDEN,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::TransactionAborted(_) | ServiceError::Infrastructure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// True for aborts the retry loop should swallow and try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::TransactionAborted(_))
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::SerializationFailure => ServiceError::TransactionAborted(err.message),
            ErrorCode::BookingConflict => ServiceError::Conflict(err.message),
            ErrorCode::Forbidden => ServiceError::PermissionDenied,
            ErrorCode::ValidationFailed | ErrorCode::InvalidStateTransition => {
                let field = err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "request".to_string());
                ServiceError::Validation {
                    field,
                    message: err.message,
                }
            }
            _ => ServiceError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}
