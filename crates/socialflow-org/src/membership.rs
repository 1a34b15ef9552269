//! Membership linking a user to a workspace with exactly one role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::WorkspaceRole;

/// A user's membership in a tenant.
///
/// A user may belong to many tenants but holds one membership, and so one
/// role, per tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,

    pub tenant_id: Uuid,

    pub user_id: Uuid,

    pub role: WorkspaceRole,

    /// Who invited this user (None for the founding owner)
    pub invited_by: Option<Uuid>,

    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(tenant_id: Uuid, user_id: Uuid, role: WorkspaceRole, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            tenant_id,
            user_id,
            role,
            invited_by: None,
            joined_at: now,
        }
    }

    /// The founding owner membership of a new tenant.
    pub fn owner(tenant_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self::new(tenant_id, user_id, WorkspaceRole::Owner, now)
    }

    pub fn with_inviter(mut self, inviter_id: Uuid) -> Self {
        self.invited_by = Some(inviter_id);
        self
    }

    pub fn is_owner(&self) -> bool {
        self.role == WorkspaceRole::Owner
    }
}
