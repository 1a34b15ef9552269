//! Workspace invites
//!
//! An invite proposes a role to an email address. It resolves exactly once:
//! accepted, declined, or expired.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::roles::WorkspaceRole;

/// Days an invite stays acceptable.
pub const INVITE_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl InviteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Pending => "pending",
            InviteStatus::Accepted => "accepted",
            InviteStatus::Declined => "declined",
            InviteStatus::Expired => "expired",
        }
    }
}

/// Why an invite could not be resolved.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum InviteError {
    /// The invite was already accepted, declined or marked expired
    #[error("Invite already {}", .0.as_str())]
    AlreadyResolved(InviteStatus),

    /// The invite passed its expiry; it is now marked expired
    #[error("Invite has expired")]
    Expired,
}

/// A pending or resolved invitation into a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub id: Uuid,

    pub tenant_id: Uuid,

    /// Invitee email, stored lowercased
    pub email: String,

    /// Role granted on acceptance
    pub role: WorkspaceRole,

    pub invited_by: Uuid,

    pub status: InviteStatus,

    pub created_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Invite {
    pub fn new(
        tenant_id: Uuid,
        email: &str,
        role: WorkspaceRole,
        invited_by: Uuid,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            tenant_id,
            email: normalize_email(email),
            role,
            invited_by,
            status: InviteStatus::Pending,
            created_at: now,
            expires_at: now + Duration::days(INVITE_TTL_DAYS),
            resolved_at: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == InviteStatus::Expired || now >= self.expires_at
    }

    /// Pending and not past expiry.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.status == InviteStatus::Pending && now < self.expires_at
    }

    /// Whether this invite targets `email` (case-insensitive).
    pub fn is_for(&self, email: &str) -> bool {
        self.email == normalize_email(email)
    }

    /// Mark accepted. The caller creates the membership under the same lock.
    ///
    /// An expired pending invite is marked expired and the call fails; the
    /// caller should persist that transition.
    pub fn accept(&mut self, now: DateTime<Utc>) -> Result<(), InviteError> {
        self.resolve(InviteStatus::Accepted, now)
    }

    pub fn decline(&mut self, now: DateTime<Utc>) -> Result<(), InviteError> {
        self.resolve(InviteStatus::Declined, now)
    }

    fn resolve(&mut self, to: InviteStatus, now: DateTime<Utc>) -> Result<(), InviteError> {
        if self.status != InviteStatus::Pending {
            return Err(InviteError::AlreadyResolved(self.status));
        }
        if now >= self.expires_at {
            self.status = InviteStatus::Expired;
            self.resolved_at = Some(now);
            return Err(InviteError::Expired);
        }
        self.status = to;
        self.resolved_at = Some(now);
        Ok(())
    }
}

/// Lowercase and trim an email address for comparisons.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
