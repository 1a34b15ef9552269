//! Publish connector trait and the per-kind registry.

use crate::error::PublishError;
use crate::mock::MockConnector;
use crate::types::{AccountStats, AccountTarget, ConnectionKind, PlatformOutcome, PublishRequest};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

#[async_trait]
pub trait PublishConnector: Send + Sync {
    /// Connection kind this connector serves.
    fn kind(&self) -> ConnectionKind;

    /// Publish to a single platform account.
    async fn publish(
        &self,
        request: &PublishRequest,
        target: &AccountTarget,
    ) -> Result<PlatformOutcome, PublishError>;

    async fn fetch_stats(&self, target: &AccountTarget) -> Result<AccountStats, PublishError>;
}

/// Connectors keyed by [`ConnectionKind`].
///
/// Always holds a mock connector; targets whose kind has no registered
/// connector fall back to it.
#[derive(Clone)]
pub struct ConnectorRegistry {
    connectors: HashMap<ConnectionKind, Arc<dyn PublishConnector>>,
    fallback: Arc<dyn PublishConnector>,
}

impl std::fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&str> = self.connectors.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("ConnectorRegistry").field("kinds", &kinds).finish()
    }
}

impl ConnectorRegistry {
    pub fn new(mock: MockConnector) -> Self {
        let fallback: Arc<dyn PublishConnector> = Arc::new(mock);
        let mut connectors = HashMap::new();
        connectors.insert(ConnectionKind::Mock, fallback.clone());
        Self {
            connectors,
            fallback,
        }
    }

    /// Register (or replace) the connector for its kind.
    pub fn register(mut self, connector: Arc<dyn PublishConnector>) -> Self {
        self.connectors.insert(connector.kind(), connector);
        self
    }

    pub fn get(&self, kind: ConnectionKind) -> Arc<dyn PublishConnector> {
        self.connectors
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    pub fn for_target(&self, target: &AccountTarget) -> Arc<dyn PublishConnector> {
        self.get(target.kind)
    }
}
