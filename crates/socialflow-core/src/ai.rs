//! AI content generation, gated by plan feature and monthly quota.

use chrono::{DateTime, Utc};
use serde::Serialize;
use socialflow_connectors::{ContentGenerator, GeneratedContent, GenerationKind};
use socialflow_events::{ContentEvent, EventBus};
use socialflow_org::{GatedAction, UsageCounter};
use socialflow_rbac::{Action, ResourceType};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::{check, current_usage, emit, load_tenant, Actor};
use crate::content::AiGeneration;
use crate::error::{CoreError, CoreResult};
use crate::store::Store;

#[derive(Debug, Serialize)]
pub struct Generation {
    pub generation_id: Uuid,
    #[serde(flatten)]
    pub content: GeneratedContent,

    /// Generations left this month; `None` when unlimited
    pub remaining: Option<u64>,
}

#[derive(Clone)]
pub struct AiService {
    store: Arc<dyn Store>,
    events: Arc<dyn EventBus>,
    generator: Arc<dyn ContentGenerator>,
}

impl AiService {
    pub fn new(store: Arc<dyn Store>, events: Arc<dyn EventBus>, generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            store,
            events,
            generator,
        }
    }

    /// Generate content and record it against the monthly quota.
    ///
    /// Holds the tenant lock across the provider call; failed calls are not
    /// counted.
    #[instrument(skip_all, fields(tenant_id = %actor.tenant_id(), kind = kind.as_str()))]
    pub async fn generate(
        &self,
        actor: &Actor,
        kind: GenerationKind,
        prompt: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<Generation> {
        actor.require(ResourceType::AiContent, Action::Execute)?;
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(CoreError::invalid("prompt must not be empty"));
        }

        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        let tenant = load_tenant(&*self.store, actor.tenant_id()).await?;
        let usage = current_usage(&*self.store, tenant.id, now).await?;
        check(&tenant, GatedAction::GenerateAi, &usage, now)?;

        let content = self.generator.generate(kind, prompt).await?;
        let generation = AiGeneration::new(tenant.id, actor.user_id, kind, now);
        self.store.insert_generation(generation.clone()).await?;
        drop(_guard);

        let used = usage.ai_generations_this_month + 1;
        let remaining = tenant
            .plan()
            .plan()
            .limit(UsageCounter::AiGenerationsThisMonth)
            .cap()
            .map(|cap| u64::from(cap).saturating_sub(used));

        info!(generation_id = %generation.id, "AI content generated");
        emit(
            &*self.events,
            ContentEvent::AiGenerated {
                generation_id: generation.id,
                kind: kind.as_str().to_string(),
            }
            .to_event(tenant.id)
            .with_user(actor.user_id),
        )
        .await;
        Ok(Generation {
            generation_id: generation.id,
            content,
            remaining,
        })
    }
}
