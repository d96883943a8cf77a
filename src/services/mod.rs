use thiserror::Error;

use crate::listing::actions::ActionError;
use crate::listing::draft::DraftError;
use crate::listing::filters::FilterError;
use crate::repository::errors::ApiError;

pub mod actions;
pub mod api;
pub mod auth;
pub mod entity;
pub mod export;
pub mod listing;
pub mod main;

/// Errors surfaced by the service layer to the routes.
#[derive(Debug, Error, PartialEq)]
pub enum ServiceError {
    #[error("session expired")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found")]
    NotFound,

    #[error("form error: {0}")]
    Form(String),

    #[error("type constraint violation: {0}")]
    TypeConstraint(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("backend error: {0}")]
    Backend(ApiError),

    #[error("export error: {0}")]
    Export(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Text for a toast or inline banner.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Unauthorized => ApiError::Unauthorized.user_message(),
            ServiceError::Forbidden(_) => {
                ApiError::Forbidden(String::new()).user_message()
            }
            ServiceError::NotFound => "The requested record does not exist.".to_string(),
            ServiceError::Form(message) => message.clone(),
            ServiceError::TypeConstraint(message) => format!("Invalid input: {message}"),
            ServiceError::Filter(err) => err.to_string(),
            ServiceError::Draft(err) => err.to_string(),
            ServiceError::Action(ActionError::AlreadyPending { .. }) => {
                "This action is already in progress.".to_string()
            }
            ServiceError::Action(err) => err.to_string(),
            ServiceError::Backend(err) => err.user_message(),
            ServiceError::Export(_) => "The export could not be prepared.".to_string(),
        }
    }
}
