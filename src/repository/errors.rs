use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures of a backend call, classified the way the console reports them.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiError {
    #[error("Backend unreachable: {0}")]
    Network(String),

    #[error("Session expired")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The request could not be assembled locally, e.g. an invalid MIME type
    /// on an upload part. Nothing was sent.
    #[error("Request could not be built: {0}")]
    Request(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Error body returned by the backend.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ApiError {
    /// Builds the error for a non-success response from its status and raw body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            _ => ApiError::Server {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Text shown to the user in a toast or inline banner.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => {
                "The server could not be reached. Check your connection and try again.".to_string()
            }
            ApiError::Unauthorized => {
                "Your session has expired. Please sign in again.".to_string()
            }
            ApiError::Forbidden(_) => "You do not have permission to do this.".to_string(),
            ApiError::NotFound(message) | ApiError::Server { message, .. } => message.clone(),
            ApiError::Decode(_) => "The server sent an unexpected response.".to_string(),
            ApiError::Request(_) => {
                "The request could not be prepared. Please check the submitted data.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::Request(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_response(status, "")
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
