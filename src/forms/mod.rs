//! Form definitions backing the console routes.

use thiserror::Error;
use validator::ValidationErrors;

use crate::services::ServiceError;

pub mod auth;
pub mod entity;
pub mod list;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("unsupported page size")]
    InvalidPageSize,

    #[error("mismatched form fields")]
    MismatchedFields,

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("failed to read uploaded file: {0}")]
    Upload(#[from] std::io::Error),

    #[error("malformed form body: {0}")]
    Malformed(String),

    #[error("{field} is limited to {max} characters")]
    TooLong { field: String, max: usize },
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::Validation(_) => {
                ServiceError::Form("Please check the highlighted fields.".to_string())
            }
            other => ServiceError::Form(other.to_string()),
        }
    }
}
