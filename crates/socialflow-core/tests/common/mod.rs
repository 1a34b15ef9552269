#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use socialflow_auth::JwtService;
use socialflow_connectors::{
    AccountStats, AccountTarget, ConnectionKind, ConnectorRegistry, FixedStats, MockConnector,
    Platform, PlatformOutcome, PublishConnector, PublishError, PublishRequest, StaticGenerator,
};
use socialflow_core::{Actor, MemoryStore, Registration, SocialFlow, User};
use socialflow_events::MemoryEventBus;
use std::sync::Arc;
use uuid::Uuid;

pub const SECRET: &str = "test-secret-key-for-jwt-signing-minimum-32-chars";

/// 2026-03-10 12:00 UTC
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
}

pub fn mock_registry() -> ConnectorRegistry {
    ConnectorRegistry::new(MockConnector::new(Arc::new(FixedStats::default())))
}

pub struct Harness {
    pub app: SocialFlow,
    pub store: MemoryStore,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_registry(mock_registry())
    }

    pub fn with_registry(registry: ConnectorRegistry) -> Self {
        let store = MemoryStore::new();
        let app = SocialFlow::new(
            Arc::new(store.clone()),
            Arc::new(MemoryEventBus::new()),
            registry,
            Arc::new(StaticGenerator),
            Arc::new(JwtService::with_secret(SECRET).unwrap()),
        );
        Self { app, store }
    }

    /// Register a user whose first workspace is `company`.
    pub async fn register(&self, email: &str, company: &str) -> User {
        let session = self
            .app
            .identity
            .register(
                Registration {
                    email: email.to_string(),
                    password: "correct horse battery".to_string(),
                    name: email.split('@').next().unwrap().to_string(),
                    company_name: Some(company.to_string()),
                },
                start(),
            )
            .await
            .unwrap();
        session.user
    }

    pub async fn actor(&self, user: &User, now: DateTime<Utc>) -> Actor {
        self.app.workspaces.actor(user.id, now).await.unwrap()
    }
}

/// OAuth connector that fails every publish with a fixed error.
pub struct FailingConnector {
    pub error: PublishError,
}

#[async_trait]
impl PublishConnector for FailingConnector {
    fn kind(&self) -> ConnectionKind {
        ConnectionKind::Oauth
    }

    async fn publish(
        &self,
        _request: &PublishRequest,
        _target: &AccountTarget,
    ) -> Result<PlatformOutcome, PublishError> {
        Err(self.error.clone())
    }

    async fn fetch_stats(&self, _target: &AccountTarget) -> Result<AccountStats, PublishError> {
        Err(self.error.clone())
    }
}

pub fn failing_registry(error: PublishError) -> ConnectorRegistry {
    mock_registry().register(Arc::new(FailingConnector { error }))
}

pub fn platforms(list: &[Platform]) -> std::collections::BTreeSet<Platform> {
    list.iter().copied().collect()
}

pub fn any_id() -> Uuid {
    Uuid::now_v7()
}
