//! API error handling
//!
//! The transport-level failure enum and its strict mapping to HTTP status
//! codes. Every error body is `{"error": <message>}`; server-side failures
//! are logged with their detail but reach the wire as a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Password exceeds 72 bytes")]
    CredentialTooLong,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

impl ApiError {
    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::CredentialTooLong | Self::BadRequest(_) | Self::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the message the client sees
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "Something went wrong".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!(%detail, "request failed");
        }

        let body = ErrorResponse {
            error: self.client_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<warbler_auth::AuthError> for ApiError {
    fn from(err: warbler_auth::AuthError) -> Self {
        use warbler_auth::AuthError;
        match err {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::Unauthorized => Self::Unauthorized,
            AuthError::CredentialTooLong => Self::CredentialTooLong,
            AuthError::MalformedRequest(msg) => Self::BadRequest(msg),
            AuthError::Storage(msg) | AuthError::Hashing(msg) | AuthError::Internal(msg) => {
                Self::Internal(msg)
            }
        }
    }
}

impl From<warbler_db::DbError> for ApiError {
    fn from(err: warbler_db::DbError) -> Self {
        use warbler_db::DbError;
        match err {
            DbError::NotFound(what) => Self::NotFound(what),
            DbError::Duplicate(msg) => Self::Conflict(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}
