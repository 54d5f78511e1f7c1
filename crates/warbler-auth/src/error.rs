//! Authentication error types
//!
//! The service boundary exposes a deliberately small failure set. Finer
//! detail (bad signature vs expired, missing vs malformed header) lives in
//! the component-level enums in [`crate::token`] and [`crate::extract`] and
//! collapses to `Unauthorized` before leaving this crate, so the wire
//! surface cannot be used as an oracle.

use thiserror::Error;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Failures the authentication service reports to its callers
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login rejected; covers both unknown email and wrong password
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// Missing, invalid, expired, or revoked credential of any kind
    #[error("Unauthorized")]
    Unauthorized,

    /// The request carried data the core could not parse
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Password exceeds the 72-byte bcrypt input limit
    #[error("Password exceeds 72 bytes")]
    CredentialTooLong,

    /// The storage collaborator failed; surfaced, never retried here
    #[error("Storage failure: {0}")]
    Storage(String),

    /// Catastrophic password-hashing failure (entropy/allocation)
    #[error("Hashing failure: {0}")]
    Hashing(String),

    /// Other internal failure (token signing, clock conversion)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCredentials | Self::Unauthorized => 401,
            Self::MalformedRequest(_) | Self::CredentialTooLong => 400,
            Self::Storage(_) | Self::Hashing(_) | Self::Internal(_) => 500,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Get safe message for client (doesn't leak internal details)
    pub fn client_message(&self) -> String {
        match self {
            Self::Storage(_) | Self::Hashing(_) | Self::Internal(_) => {
                "Something went wrong".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<warbler_db::DbError> for AuthError {
    fn from(err: warbler_db::DbError) -> Self {
        Self::Storage(err.to_string())
    }
}
