//! Connector error types.

use thiserror::Error;

/// Failure to publish or to fetch stats.
///
/// Every variant is either retryable (a later `process` sweep picks the post
/// up again) or permanent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// Request did not complete within the connector timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection-level failure
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Rate limited by platform: {0}")]
    RateLimited(String),

    /// Platform returned 5xx
    #[error("Platform unavailable ({status}): {message}")]
    Unavailable { status: u16, message: String },

    /// Credential rejected (401/403)
    #[error("Platform rejected credentials: {0}")]
    Unauthorized(String),

    /// Platform rejected the request (other 4xx)
    #[error("Platform rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Request cannot be sent as is (missing image, page ID or token)
    #[error("Invalid publish request: {0}")]
    InvalidRequest(String),

    #[error("Invalid platform response: {0}")]
    InvalidResponse(String),
}

impl PublishError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => PublishError::Unauthorized(message),
            408 => PublishError::Timeout(message),
            429 => PublishError::RateLimited(message),
            500..=599 => PublishError::Unavailable { status, message },
            _ => PublishError::Rejected { status, message },
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PublishError::Timeout(_)
                | PublishError::Transport(_)
                | PublishError::RateLimited(_)
                | PublishError::Unavailable { .. }
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            PublishError::Timeout(_) => "TIMEOUT",
            PublishError::Transport(_) => "TRANSPORT",
            PublishError::RateLimited(_) => "RATE_LIMITED",
            PublishError::Unavailable { .. } => "PLATFORM_UNAVAILABLE",
            PublishError::Unauthorized(_) => "PLATFORM_UNAUTHORIZED",
            PublishError::Rejected { .. } => "PLATFORM_REJECTED",
            PublishError::InvalidRequest(_) => "INVALID_PUBLISH_REQUEST",
            PublishError::InvalidResponse(_) => "INVALID_PLATFORM_RESPONSE",
        }
    }
}

impl From<reqwest::Error> for PublishError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PublishError::Timeout(e.to_string())
        } else if e.is_decode() {
            PublishError::InvalidResponse(e.to_string())
        } else if let Some(status) = e.status() {
            PublishError::from_status(status.as_u16(), e.to_string())
        } else {
            PublishError::Transport(e.to_string())
        }
    }
}

/// Failure of the AI content generator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("AI generation is not configured")]
    NotConfigured,

    #[error("AI request timed out")]
    Timeout,

    #[error("AI provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("AI transport error: {0}")]
    Transport(String),

    #[error("Invalid AI response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Timeout | GenerationError::Transport(_) => true,
            GenerationError::Provider { status, .. } => *status == 429 || *status >= 500,
            GenerationError::NotConfigured | GenerationError::InvalidResponse(_) => false,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationError::Timeout
        } else if e.is_decode() {
            GenerationError::InvalidResponse(e.to_string())
        } else {
            GenerationError::Transport(e.to_string())
        }
    }
}
