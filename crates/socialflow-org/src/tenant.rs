//! Tenant (workspace) model
//!
//! A tenant is an isolated customer workspace. It owns its members, invites,
//! posts, accounts and content, and carries its own subscription.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::plans::PlanId;
use crate::roles::WorkspaceRole;
use crate::settings::TenantSettings;
use crate::subscription::{SubscriptionState, SubscriptionStatus};

/// A workspace.
///
/// Tenants are never hard-deleted.
///
/// ```
/// use chrono::Utc;
/// use uuid::Uuid;
/// use socialflow_org::{PlanId, Tenant};
///
/// let now = Utc::now();
/// let tenant = Tenant::new("Acme Marketing", Uuid::now_v7(), now);
/// assert_eq!(tenant.subscription.plan, PlanId::Free);
/// assert!(!tenant.is_expired(now));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,

    pub name: String,

    /// The user holding the owner membership
    pub owner_id: Uuid,

    pub subscription: SubscriptionState,

    #[serde(default)]
    pub settings: TenantSettings,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// New tenant on the free trial.
    pub fn new(name: impl Into<String>, owner_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            owner_id,
            subscription: SubscriptionState::trial(now),
            settings: TenantSettings::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn plan(&self) -> PlanId {
        self.subscription.plan
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.subscription.is_expired(now)
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Lightweight listing entry for a given member's view.
    pub fn summary(&self, role: WorkspaceRole, is_current: bool, now: DateTime<Utc>) -> TenantSummary {
        TenantSummary {
            id: self.id,
            name: self.name.clone(),
            plan: self.subscription.plan,
            status: self.subscription.effective_status(now),
            role,
            is_current,
        }
    }
}

/// Workspace listing entry for the workspace switcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSummary {
    pub id: Uuid,

    pub name: String,

    pub plan: PlanId,

    pub status: SubscriptionStatus,

    /// The viewing user's role in this workspace
    pub role: WorkspaceRole,

    /// Whether this is the user's current workspace
    pub is_current: bool,
}
