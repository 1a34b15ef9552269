//! Plans and the workspace subscription.

use chrono::{DateTime, Utc};
use serde::Serialize;
use socialflow_events::{EventBus, SubscriptionEvent};
use socialflow_org::{GatedAction, Plan, PlanId, SubscriptionStatus, UsageSnapshot};
use socialflow_rbac::{Action, ResourceType};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::access::{current_usage, emit, load_tenant, Actor};
use crate::error::{CoreError, CoreResult};
use crate::store::Store;

/// Subscription state with current usage against the plan.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub expires_at: DateTime<Utc>,
    pub days_remaining: i64,
    pub is_expired: bool,
    pub usage: UsageSnapshot,
}

#[derive(Clone)]
pub struct BillingService {
    store: Arc<dyn Store>,
    events: Arc<dyn EventBus>,
}

impl BillingService {
    pub fn new(store: Arc<dyn Store>, events: Arc<dyn EventBus>) -> Self {
        Self { store, events }
    }

    /// The catalog, cheapest first.
    pub fn plans(&self) -> Vec<Plan> {
        Plan::all()
    }

    pub async fn subscription(&self, actor: &Actor, now: DateTime<Utc>) -> CoreResult<SubscriptionView> {
        actor.permit(
            ResourceType::Subscription,
            Action::Read,
            GatedAction::ReadSubscription,
            now,
        )?;
        let usage = current_usage(&*self.store, actor.tenant_id(), now).await?;
        Ok(view(&actor.tenant.subscription, usage, now))
    }

    /// Move to `plan_id` and start a new paid period. Owner only; allowed on
    /// expired workspaces.
    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id()))]
    pub async fn change_plan(&self, actor: &Actor, plan_id: &str, now: DateTime<Utc>) -> CoreResult<SubscriptionView> {
        let plan = PlanId::parse(plan_id)
            .ok_or_else(|| CoreError::invalid(format!("unknown plan: {plan_id}")))?;
        actor.permit(
            ResourceType::Subscription,
            Action::Manage,
            GatedAction::ChangePlan,
            now,
        )?;

        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        let mut tenant = load_tenant(&*self.store, actor.tenant_id()).await?;
        let from = tenant.plan();
        tenant.subscription.change_plan(plan, now);
        tenant.touch(now);
        let subscription = tenant.subscription.clone();
        self.store.save_tenant(tenant).await?;
        let usage = current_usage(&*self.store, actor.tenant_id(), now).await?;
        drop(_guard);

        info!(from = from.as_str(), to = plan.as_str(), "Plan changed");
        emit(
            &*self.events,
            SubscriptionEvent::PlanChanged {
                from: from.as_str().to_string(),
                to: plan.as_str().to_string(),
                expires_at: subscription.expires_at,
            }
            .to_event(actor.tenant_id())
            .with_user(actor.user_id),
        )
        .await;
        Ok(view(&subscription, usage, now))
    }
}

fn view(
    subscription: &socialflow_org::SubscriptionState,
    usage: UsageSnapshot,
    now: DateTime<Utc>,
) -> SubscriptionView {
    SubscriptionView {
        plan: subscription.plan.plan(),
        status: subscription.effective_status(now),
        expires_at: subscription.expires_at,
        days_remaining: subscription.days_remaining(now),
        is_expired: subscription.is_expired(now),
        usage,
    }
}
