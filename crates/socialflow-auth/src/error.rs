//! Error types for authentication operations

use thiserror::Error;

/// Authentication error types.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Bearer token has expired
    #[error("Token has expired")]
    TokenExpired,

    /// Bearer token is invalid (malformed, bad signature, wrong issuer, ...)
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// No bearer token on a protected request
    #[error("Missing bearer token")]
    MissingToken,

    /// Unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Password does not meet the minimum requirements
    #[error("Weak password: {0}")]
    WeakPassword(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Errors that indicate a server fault rather than a bad request.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AuthError::Internal(_) | AuthError::ConfigError(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::TokenExpired
            | AuthError::InvalidToken(_)
            | AuthError::MissingToken
            | AuthError::InvalidCredentials => 401,

            AuthError::WeakPassword(_) => 400,

            AuthError::ConfigError(_) | AuthError::Internal(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::WeakPassword(_) => "WEAK_PASSWORD",
            AuthError::ConfigError(_) => "CONFIG_ERROR",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
