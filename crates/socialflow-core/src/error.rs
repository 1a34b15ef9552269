//! Service error types

use socialflow_auth::AuthError;
use socialflow_connectors::{GenerationError, PublishError};
use socialflow_org::{Denial, DenialReason, InviteError, InviteStatus};
use thiserror::Error;

/// Conflicts with existing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConflictKind {
    #[error("A pending invite already exists for this email")]
    DuplicateInvite,

    #[error("Invite already {}", .0.as_str())]
    InviteAlreadyResolved(InviteStatus),

    #[error("Invite has expired")]
    InviteExpired,

    #[error("User is already a member of this workspace")]
    AlreadyMember,

    #[error("Post is already published")]
    AlreadyPublished,

    #[error("Email is already registered")]
    DuplicateEmail,

    #[error("Landing page slug is already taken")]
    DuplicateSlug,
}

impl ConflictKind {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConflictKind::DuplicateInvite => "DUPLICATE_INVITE",
            ConflictKind::InviteAlreadyResolved(_) => "INVITE_ALREADY_RESOLVED",
            ConflictKind::InviteExpired => "INVITE_EXPIRED",
            ConflictKind::AlreadyMember => "ALREADY_MEMBER",
            ConflictKind::AlreadyPublished => "ALREADY_PUBLISHED",
            ConflictKind::DuplicateEmail => "DUPLICATE_EMAIL",
            ConflictKind::DuplicateSlug => "DUPLICATE_SLUG",
        }
    }
}

impl From<InviteError> for ConflictKind {
    fn from(e: InviteError) -> Self {
        match e {
            InviteError::AlreadyResolved(status) => ConflictKind::InviteAlreadyResolved(status),
            InviteError::Expired => ConflictKind::InviteExpired,
        }
    }
}

/// Error returned by every service operation.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Refused by the entitlement gate or the role matrix
    #[error("{0}")]
    Denied(Denial),

    #[error("{0}")]
    Conflict(ConflictKind),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// A connector or generator call failed
    #[error("Upstream error: {message}")]
    Upstream { message: String, retryable: bool },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for service operations.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn invalid(message: impl Into<String>) -> Self {
        CoreError::InvalidInput(message.into())
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::NotFound(_) => 404,
            CoreError::Denied(denial) => match denial.reason {
                DenialReason::Expired => 402,
                _ => 403,
            },
            CoreError::Conflict(ConflictKind::InviteExpired) => 410,
            CoreError::Conflict(_) => 409,
            CoreError::InvalidInput(_) | CoreError::InvalidSchedule(_) => 400,
            CoreError::Upstream { retryable: true, .. } => 503,
            CoreError::Upstream { retryable: false, .. } => 502,
            CoreError::Auth(e) => e.status_code(),
            CoreError::Storage(_) => 500,
        }
    }

    /// Error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::Denied(denial) => match denial.reason {
                DenialReason::Expired => "SUBSCRIPTION_EXPIRED",
                DenialReason::LimitReached => "LIMIT_REACHED",
                DenialReason::FeatureDisabled => "FEATURE_DISABLED",
                DenialReason::InsufficientRole => "INSUFFICIENT_ROLE",
            },
            CoreError::Conflict(kind) => kind.error_code(),
            CoreError::InvalidInput(_) => "INVALID_INPUT",
            CoreError::InvalidSchedule(_) => "INVALID_SCHEDULE",
            CoreError::Upstream { .. } => "UPSTREAM_ERROR",
            CoreError::Auth(e) => e.error_code(),
            CoreError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// The denial, if this is a gate refusal.
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            CoreError::Denied(denial) => Some(denial),
            _ => None,
        }
    }
}

impl From<Denial> for CoreError {
    fn from(denial: Denial) -> Self {
        CoreError::Denied(denial)
    }
}

impl From<ConflictKind> for CoreError {
    fn from(kind: ConflictKind) -> Self {
        CoreError::Conflict(kind)
    }
}

impl From<InviteError> for CoreError {
    fn from(e: InviteError) -> Self {
        CoreError::Conflict(e.into())
    }
}

impl From<PublishError> for CoreError {
    fn from(e: PublishError) -> Self {
        CoreError::Upstream {
            retryable: e.is_retryable(),
            message: e.to_string(),
        }
    }
}

impl From<GenerationError> for CoreError {
    fn from(e: GenerationError) -> Self {
        CoreError::Upstream {
            retryable: e.is_retryable(),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socialflow_org::{GatedAction, WorkspaceRole};

    #[test]
    fn test_status_mapping() {
        assert_eq!(CoreError::NotFound("Post").status_code(), 404);
        assert_eq!(
            CoreError::from(Denial::expired(GatedAction::CreatePost)).status_code(),
            402
        );
        assert_eq!(
            CoreError::from(Denial::insufficient_role("post:delete", WorkspaceRole::Viewer))
                .status_code(),
            403
        );
        assert_eq!(CoreError::from(ConflictKind::InviteExpired).status_code(), 410);
        assert_eq!(CoreError::from(ConflictKind::DuplicateInvite).status_code(), 409);
        assert_eq!(CoreError::invalid("bad role").status_code(), 400);
        assert_eq!(
            CoreError::Upstream { message: "x".into(), retryable: true }.status_code(),
            503
        );
        assert_eq!(
            CoreError::Upstream { message: "x".into(), retryable: false }.status_code(),
            502
        );
        assert_eq!(CoreError::from(AuthError::InvalidCredentials).status_code(), 401);
    }

    #[test]
    fn test_invite_error_conversion() {
        let err = CoreError::from(InviteError::AlreadyResolved(InviteStatus::Accepted));
        assert!(matches!(
            err,
            CoreError::Conflict(ConflictKind::InviteAlreadyResolved(InviteStatus::Accepted))
        ));
        assert_eq!(err.to_string(), "Invite already accepted");
    }

    #[test]
    fn test_publish_error_conversion() {
        let err = CoreError::from(PublishError::from_status(503, "down"));
        assert_eq!(err.status_code(), 503);
    }
}
