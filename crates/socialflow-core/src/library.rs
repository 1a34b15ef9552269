//! Templates and landing pages.

use chrono::{DateTime, Utc};
use socialflow_events::{ContentEvent, EventBus};
use socialflow_org::GatedAction;
use socialflow_rbac::{Action, ResourceType};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::access::{check, current_usage, emit, load_tenant, Actor};
use crate::content::{LandingPage, NewLandingPage, NewTemplate, Template};
use crate::error::{CoreError, CoreResult};
use crate::store::Store;

#[derive(Clone)]
pub struct LibraryService {
    store: Arc<dyn Store>,
    events: Arc<dyn EventBus>,
}

impl LibraryService {
    pub fn new(store: Arc<dyn Store>, events: Arc<dyn EventBus>) -> Self {
        Self { store, events }
    }

    #[instrument(skip(self, actor, input), fields(tenant_id = %actor.tenant_id()))]
    pub async fn create_template(&self, actor: &Actor, input: NewTemplate, now: DateTime<Utc>) -> CoreResult<Template> {
        actor.require(ResourceType::Template, Action::Create)?;

        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        let tenant = load_tenant(&*self.store, actor.tenant_id()).await?;
        let usage = current_usage(&*self.store, tenant.id, now).await?;
        check(&tenant, GatedAction::CreateTemplate, &usage, now)?;

        let template = Template::new(tenant.id, actor.user_id, input, now)?;
        self.store.save_template(template.clone()).await?;
        drop(_guard);

        emit(
            &*self.events,
            ContentEvent::TemplateCreated {
                template_id: template.id,
            }
            .to_event(template.tenant_id)
            .with_user(actor.user_id),
        )
        .await;
        Ok(template)
    }

    pub async fn list_templates(&self, actor: &Actor, now: DateTime<Utc>) -> CoreResult<Vec<Template>> {
        actor.permit(ResourceType::Template, Action::Read, GatedAction::ReadContent, now)?;
        self.store.list_templates(actor.tenant_id()).await
    }

    pub async fn delete_template(&self, actor: &Actor, template_id: Uuid, now: DateTime<Utc>) -> CoreResult<()> {
        actor.permit(ResourceType::Template, Action::Delete, GatedAction::EditContent, now)?;
        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        if self.store.delete_template(actor.tenant_id(), template_id).await? {
            Ok(())
        } else {
            Err(CoreError::NotFound("Template"))
        }
    }

    /// Create a landing page. Slugs are unique across workspaces.
    #[instrument(skip(self, actor, input), fields(tenant_id = %actor.tenant_id()))]
    pub async fn create_landing_page(
        &self,
        actor: &Actor,
        input: NewLandingPage,
        now: DateTime<Utc>,
    ) -> CoreResult<LandingPage> {
        actor.require(ResourceType::LandingPage, Action::Create)?;

        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        let tenant = load_tenant(&*self.store, actor.tenant_id()).await?;
        let usage = current_usage(&*self.store, tenant.id, now).await?;
        check(&tenant, GatedAction::CreateLandingPage, &usage, now)?;

        let page = LandingPage::new(tenant.id, actor.user_id, input, now)?;
        self.store.save_landing_page(page.clone()).await?;
        drop(_guard);

        emit(
            &*self.events,
            ContentEvent::LandingPageCreated {
                page_id: page.id,
                slug: page.slug.clone(),
            }
            .to_event(page.tenant_id)
            .with_user(actor.user_id),
        )
        .await;
        Ok(page)
    }

    pub async fn list_landing_pages(&self, actor: &Actor, now: DateTime<Utc>) -> CoreResult<Vec<LandingPage>> {
        actor.permit(ResourceType::LandingPage, Action::Read, GatedAction::ReadContent, now)?;
        self.store.list_landing_pages(actor.tenant_id()).await
    }

    pub async fn delete_landing_page(&self, actor: &Actor, page_id: Uuid, now: DateTime<Utc>) -> CoreResult<()> {
        actor.permit(ResourceType::LandingPage, Action::Delete, GatedAction::EditContent, now)?;
        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        if self.store.delete_landing_page(actor.tenant_id(), page_id).await? {
            Ok(())
        } else {
            Err(CoreError::NotFound("Landing page"))
        }
    }
}
