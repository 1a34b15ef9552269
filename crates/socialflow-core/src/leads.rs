//! Public landing page views, lead capture and the leads inbox.
//!
//! Viewing a page and submitting the form need no account. Submissions are
//! checked against the owning workspace's plan, so a workspace without
//! `lead_capture` (or with an expired subscription) turns them away.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use socialflow_events::{ContentEvent, EventBus};
use socialflow_org::{GatedAction, UsageSnapshot};
use socialflow_rbac::{Action, ResourceType};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::access::{check, emit, load_tenant, Actor};
use crate::content::LandingPage;
use crate::error::{CoreError, CoreResult};
use crate::lead::{Lead, LeadStatus, NewLead};
use crate::store::Store;

/// What a visitor sees of a landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicPage {
    pub page_id: Uuid,
    pub slug: String,
    pub headline: String,
    pub description: String,
    pub cta_text: String,
}

impl From<&LandingPage> for PublicPage {
    fn from(page: &LandingPage) -> Self {
        Self {
            page_id: page.id,
            slug: page.slug.clone(),
            headline: page.headline.clone(),
            description: page.description.clone(),
            cta_text: page.cta_text.clone(),
        }
    }
}

#[derive(Clone)]
pub struct LeadService {
    store: Arc<dyn Store>,
    events: Arc<dyn EventBus>,
}

impl LeadService {
    pub fn new(store: Arc<dyn Store>, events: Arc<dyn EventBus>) -> Self {
        Self { store, events }
    }

    async fn page_by_slug(&self, slug: &str) -> CoreResult<LandingPage> {
        self.store
            .find_landing_page_by_slug(slug)
            .await?
            .ok_or(CoreError::NotFound("Landing page"))
    }

    /// Count a visit and return the public part of the page.
    #[instrument(skip(self))]
    pub async fn view_page(&self, slug: &str) -> CoreResult<PublicPage> {
        let page = self.page_by_slug(slug).await?;

        let _guard = self.store.lock_tenant(page.tenant_id).await;
        let mut page = self.page_by_slug(slug).await?;
        page.views += 1;
        self.store.save_landing_page(page.clone()).await?;

        Ok(PublicPage::from(&page))
    }

    /// Record a form submission on the page with `slug`.
    ///
    /// Denied with `FeatureDisabled` when the owner's plan lacks lead capture.
    #[instrument(skip(self, input))]
    pub async fn capture(&self, slug: &str, input: NewLead, now: DateTime<Utc>) -> CoreResult<Lead> {
        let page = self.page_by_slug(slug).await?;

        let _guard = self.store.lock_tenant(page.tenant_id).await;
        let tenant = load_tenant(&*self.store, page.tenant_id).await?;
        check(&tenant, GatedAction::CaptureLead, &UsageSnapshot::default(), now)?;

        let mut page = self.page_by_slug(slug).await?;
        let lead = Lead::new(&page, input, now)?;
        self.store.save_lead(lead.clone()).await?;
        page.conversions += 1;
        self.store.save_landing_page(page).await?;
        drop(_guard);

        debug!(lead_id = %lead.id, tenant_id = %lead.tenant_id, "Lead captured");
        emit(
            &*self.events,
            ContentEvent::LeadCaptured {
                lead_id: lead.id,
                page_id: lead.page_id,
            }
            .to_event(lead.tenant_id),
        )
        .await;
        Ok(lead)
    }

    pub async fn list(&self, actor: &Actor, status: Option<LeadStatus>, now: DateTime<Utc>) -> CoreResult<Vec<Lead>> {
        actor.permit(ResourceType::Lead, Action::Read, GatedAction::ReadContent, now)?;
        let leads = self.store.list_leads(actor.tenant_id()).await?;
        Ok(match status {
            Some(status) => leads.into_iter().filter(|l| l.status == status).collect(),
            None => leads,
        })
    }

    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id()))]
    pub async fn update_status(
        &self,
        actor: &Actor,
        lead_id: Uuid,
        status: LeadStatus,
        now: DateTime<Utc>,
    ) -> CoreResult<Lead> {
        actor.permit(ResourceType::Lead, Action::Update, GatedAction::EditContent, now)?;

        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        let mut lead = self
            .store
            .get_lead(actor.tenant_id(), lead_id)
            .await?
            .ok_or(CoreError::NotFound("Lead"))?;
        lead.set_status(status, now);
        self.store.save_lead(lead.clone()).await?;
        Ok(lead)
    }
}
