//! Service wiring.

use socialflow_auth::JwtService;
use socialflow_connectors::{ConnectorRegistry, ContentGenerator};
use socialflow_events::EventBus;
use std::sync::Arc;

use crate::ai::AiService;
use crate::analytics::AnalyticsService;
use crate::billing::BillingService;
use crate::identity::IdentityService;
use crate::leads::LeadService;
use crate::library::LibraryService;
use crate::posts::PostService;
use crate::publisher::Publisher;
use crate::scheduler::Scheduler;
use crate::social::SocialAccountService;
use crate::store::Store;
use crate::workspace::WorkspaceService;

/// Every service over one store, event bus and connector set.
#[derive(Clone)]
pub struct SocialFlow {
    pub identity: IdentityService,
    pub workspaces: WorkspaceService,
    pub billing: BillingService,
    pub posts: PostService,
    pub scheduler: Scheduler,
    pub accounts: SocialAccountService,
    pub library: LibraryService,
    pub leads: LeadService,
    pub analytics: AnalyticsService,
    pub ai: AiService,
    events: Arc<dyn EventBus>,
}

impl SocialFlow {
    pub fn new(
        store: Arc<dyn Store>,
        events: Arc<dyn EventBus>,
        connectors: ConnectorRegistry,
        generator: Arc<dyn ContentGenerator>,
        jwt: Arc<JwtService>,
    ) -> Self {
        let workspaces = WorkspaceService::new(store.clone(), events.clone());
        let publisher = Publisher::new(store.clone(), connectors.clone(), events.clone());

        Self {
            identity: IdentityService::new(store.clone(), workspaces.clone(), jwt),
            billing: BillingService::new(store.clone(), events.clone()),
            posts: PostService::new(store.clone(), events.clone(), publisher.clone()),
            scheduler: Scheduler::new(store.clone(), publisher),
            accounts: SocialAccountService::new(store.clone(), events.clone(), connectors),
            library: LibraryService::new(store.clone(), events.clone()),
            leads: LeadService::new(store.clone(), events.clone()),
            analytics: AnalyticsService::new(store.clone()),
            ai: AiService::new(store, events.clone(), generator),
            workspaces,
            events,
        }
    }

    pub fn events(&self) -> &Arc<dyn EventBus> {
        &self.events
    }
}
