//! Connector path shared by "publish now" and the scheduler sweep.

use chrono::{DateTime, Utc};
use socialflow_connectors::{AccountTarget, ConnectorRegistry, PublishError};
use socialflow_events::{EventBus, PostEvent};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::access::emit;
use crate::account::publishing_account;
use crate::error::CoreResult;
use crate::post::Post;
use crate::store::Store;

/// Result of one publish attempt. Connector errors are recorded on the post
/// rather than returned as service errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt {
    Published,
    Failed(PublishError),
}

#[derive(Clone)]
pub struct Publisher {
    store: Arc<dyn Store>,
    connectors: ConnectorRegistry,
    events: Arc<dyn EventBus>,
}

impl Publisher {
    pub fn new(store: Arc<dyn Store>, connectors: ConnectorRegistry, events: Arc<dyn EventBus>) -> Self {
        Self {
            store,
            connectors,
            events,
        }
    }

    /// Publish `post` to each target platform and persist the outcome.
    ///
    /// Stops at the first platform error. Callers hold the tenant lock and
    /// have already checked [`Post::can_publish`].
    #[instrument(skip(self, post), fields(post_id = %post.id, tenant_id = %post.tenant_id))]
    pub async fn attempt(&self, post: &mut Post, now: DateTime<Utc>) -> CoreResult<Attempt> {
        let accounts = self.store.list_accounts(post.tenant_id).await?;
        let request = post.publish_request(now);

        let mut outcomes = Vec::with_capacity(post.platforms.len());
        let mut failure = None;
        for platform in post.platforms.iter().copied() {
            let target = publishing_account(&accounts, platform)
                .map(|account| account.target())
                .unwrap_or_else(|| AccountTarget::simulated(platform));
            let connector = self.connectors.for_target(&target);

            match connector.publish(&request, &target).await {
                Ok(outcome) => {
                    debug!(platform = %platform, external_id = %outcome.external_id, "Platform published");
                    outcomes.push(outcome);
                }
                Err(e) => {
                    warn!(platform = %platform, error = %e, retryable = e.is_retryable(), "Platform publish failed");
                    failure = Some((platform, e));
                    break;
                }
            }
        }

        let attempt = match failure {
            None => {
                post.mark_published(outcomes, now);
                Attempt::Published
            }
            Some((platform, error)) => {
                post.mark_failed(&error, Some(platform), now);
                Attempt::Failed(error)
            }
        };
        self.store.save_post(post.clone()).await?;

        let event = match (&attempt, &post.result) {
            (Attempt::Published, Some(result)) => PostEvent::Published {
                post_id: post.id,
                platforms: post.platforms.iter().map(|p| p.as_str().to_string()).collect(),
                total_reach: result.total_reach,
            },
            (Attempt::Failed(error), _) => PostEvent::Failed {
                post_id: post.id,
                error: error.to_string(),
                retryable: error.is_retryable(),
            },
            (Attempt::Published, None) => return Ok(attempt),
        };
        emit(&*self.events, event.to_event(post.tenant_id)).await;
        Ok(attempt)
    }
}
