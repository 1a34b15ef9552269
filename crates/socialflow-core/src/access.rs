//! Resolved caller identity and the checks every operation runs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use socialflow_events::{Event, EventBus};
use socialflow_org::{authorize, Denial, GatedAction, Membership, Tenant, UsageSnapshot, WorkspaceRole};
use socialflow_rbac::{Action, Permission, ResourceType};
use tracing::warn;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::store::Store;
use crate::usage::MonthWindow;

/// A user acting inside their current workspace.
#[derive(Debug, Clone, Serialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub tenant: Tenant,
    pub membership: Membership,
}

impl Actor {
    pub fn tenant_id(&self) -> Uuid {
        self.tenant.id
    }

    pub fn role(&self) -> WorkspaceRole {
        self.membership.role
    }

    /// Role matrix check.
    pub fn require(&self, resource: ResourceType, action: Action) -> CoreResult<()> {
        if self.role().can(resource, action) {
            return Ok(());
        }
        let permission = Permission::new(resource, action);
        Err(Denial::insufficient_role(permission.to_string(), self.role()).into())
    }

    /// Role check, then the entitlement gate for an action without a counter.
    pub fn permit(
        &self,
        resource: ResourceType,
        action: Action,
        gated: GatedAction,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.require(resource, action)?;
        check(&self.tenant, gated, &UsageSnapshot::default(), now)
    }
}

/// Run the entitlement gate.
pub(crate) fn check(
    tenant: &Tenant,
    action: GatedAction,
    usage: &UsageSnapshot,
    now: DateTime<Utc>,
) -> CoreResult<()> {
    authorize(&tenant.subscription, action, usage, now).map_err(CoreError::Denied)
}

/// Fresh tenant read, for use under the tenant lock.
pub(crate) async fn load_tenant(store: &dyn Store, tenant_id: Uuid) -> CoreResult<Tenant> {
    store
        .get_tenant(tenant_id)
        .await?
        .ok_or(CoreError::NotFound("Workspace"))
}

pub(crate) async fn current_usage(
    store: &dyn Store,
    tenant_id: Uuid,
    now: DateTime<Utc>,
) -> CoreResult<UsageSnapshot> {
    store.usage(tenant_id, MonthWindow::containing(now)).await
}

/// Publish after a committed change. Bus failures never fail the operation.
pub(crate) async fn emit(events: &dyn EventBus, event: Event) {
    let topic = event.event_type.clone();
    if let Err(e) = events.publish(event).await {
        warn!(topic = %topic, error = %e, "Failed to publish domain event");
    }
}
