//! Error conversion glue between layers.
//!
//! The domain and repository layers must not depend on service error types,
//! so the conversions live here.

use crate::domain::types::TypeConstraintError;
use crate::repository::errors::ApiError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<ApiError> for ServiceError {
    fn from(val: ApiError) -> Self {
        match val {
            ApiError::Unauthorized => ServiceError::Unauthorized,
            ApiError::Forbidden(message) => ServiceError::Forbidden(message),
            ApiError::NotFound(_) => ServiceError::NotFound,
            other => ServiceError::Backend(other),
        }
    }
}

impl From<csv::Error> for ServiceError {
    fn from(val: csv::Error) -> Self {
        ServiceError::Export(val.to_string())
    }
}
