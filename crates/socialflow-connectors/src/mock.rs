//! Simulated publishing for every platform.

use crate::connector::PublishConnector;
use crate::error::PublishError;
use crate::stats::{RandomStats, StatsSource};
use crate::types::{AccountStats, AccountTarget, ConnectionKind, PlatformOutcome, PublishRequest};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Always succeeds. Reach and stats come from the injected [`StatsSource`].
#[derive(Clone)]
pub struct MockConnector {
    stats: Arc<dyn StatsSource>,
}

impl std::fmt::Debug for MockConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockConnector").finish_non_exhaustive()
    }
}

impl MockConnector {
    pub fn new(stats: Arc<dyn StatsSource>) -> Self {
        Self { stats }
    }

    pub fn random() -> Self {
        Self::new(Arc::new(RandomStats))
    }
}

#[async_trait]
impl PublishConnector for MockConnector {
    fn kind(&self) -> ConnectionKind {
        ConnectionKind::Mock
    }

    #[instrument(skip(self, request, target), fields(post_id = %request.post_id, platform = %target.platform))]
    async fn publish(
        &self,
        request: &PublishRequest,
        target: &AccountTarget,
    ) -> Result<PlatformOutcome, PublishError> {
        let simple = Uuid::now_v7().simple().to_string();
        let external_id = format!("mock_{}_{}", target.platform, &simple[simple.len() - 12..]);
        let reach = self.stats.reach(target.platform);
        debug!(external_id = %external_id, reach, "Simulated publish");

        Ok(PlatformOutcome {
            platform: target.platform,
            account_id: target.account_id,
            url: Some(format!(
                "https://{}.com/socialflow/{}",
                target.platform, external_id
            )),
            external_id,
            reach,
            simulated: true,
            published_at: request.requested_at,
        })
    }

    async fn fetch_stats(&self, target: &AccountTarget) -> Result<AccountStats, PublishError> {
        Ok(self.stats.account_stats(target.platform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::FixedStats;
    use crate::types::Platform;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_mock_publish_uses_stats_source() {
        let connector = MockConnector::new(Arc::new(FixedStats::with_reach(1234)));
        let request = PublishRequest::compose(Uuid::now_v7(), "hello", &[], None, Utc::now());
        let target = AccountTarget::simulated(Platform::Instagram);

        let outcome = connector.publish(&request, &target).await.unwrap();
        assert_eq!(outcome.reach, 1234);
        assert_eq!(outcome.platform, Platform::Instagram);
        assert!(outcome.simulated);
        assert!(outcome.external_id.starts_with("mock_instagram_"));
    }

    #[tokio::test]
    async fn test_mock_publish_stamps_request_time() {
        let connector = MockConnector::new(Arc::new(FixedStats::default()));
        let at = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 0).unwrap();
        let request = PublishRequest::compose(Uuid::now_v7(), "leap day", &[], None, at);

        let outcome = connector
            .publish(&request, &AccountTarget::simulated(Platform::Facebook))
            .await
            .unwrap();
        assert_eq!(outcome.published_at, at);
    }

    #[tokio::test]
    async fn test_mock_stats() {
        let connector = MockConnector::new(Arc::new(FixedStats::default()));
        let stats = connector
            .fetch_stats(&AccountTarget::simulated(Platform::Facebook))
            .await
            .unwrap();
        assert_eq!(stats.followers_count, 2500);
    }
}
