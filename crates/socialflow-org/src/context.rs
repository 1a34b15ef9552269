//! User context for workspace switching
//!
//! Tracks which workspace a user is currently working in and which ones they
//! visited recently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recent workspaces kept per user.
const MAX_RECENT: usize = 10;

/// A user's current workspace selection.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use uuid::Uuid;
/// use socialflow_org::UserContext;
///
/// let mut ctx = UserContext::new(Uuid::now_v7(), Utc::now());
/// let tenant = Uuid::now_v7();
/// ctx.switch_workspace(tenant, Utc::now());
/// assert_eq!(ctx.current_tenant_id, Some(tenant));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: Uuid,

    /// Currently selected workspace
    pub current_tenant_id: Option<Uuid>,

    /// Recently selected workspaces (most recent first)
    #[serde(default)]
    pub recent_tenants: Vec<Uuid>,

    pub updated_at: DateTime<Utc>,
}

impl UserContext {
    pub fn new(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            current_tenant_id: None,
            recent_tenants: Vec::new(),
            updated_at: now,
        }
    }

    /// Select a workspace and move it to the front of the recent list.
    ///
    /// Membership must be checked by the caller.
    pub fn switch_workspace(&mut self, tenant_id: Uuid, now: DateTime<Utc>) {
        self.current_tenant_id = Some(tenant_id);
        self.recent_tenants.retain(|id| *id != tenant_id);
        self.recent_tenants.insert(0, tenant_id);
        self.recent_tenants.truncate(MAX_RECENT);
        self.updated_at = now;
    }

    /// Drop a workspace the user no longer belongs to.
    ///
    /// If it was current, the most recent remaining workspace takes its place.
    pub fn forget_workspace(&mut self, tenant_id: Uuid, now: DateTime<Utc>) {
        self.recent_tenants.retain(|id| *id != tenant_id);
        if self.current_tenant_id == Some(tenant_id) {
            self.current_tenant_id = self.recent_tenants.first().copied();
        }
        self.updated_at = now;
    }

    pub fn recent(&self, limit: usize) -> &[Uuid] {
        let end = limit.min(self.recent_tenants.len());
        &self.recent_tenants[..end]
    }
}
