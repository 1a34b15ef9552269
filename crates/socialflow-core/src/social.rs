//! Social account connections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use socialflow_connectors::{ConnectorRegistry, Platform, PlatformOutcome, PublishRequest};
use socialflow_events::{ContentEvent, EventBus};
use socialflow_org::GatedAction;
use socialflow_rbac::{Action, ResourceType};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::{check, current_usage, emit, load_tenant, Actor};
use crate::account::SocialAccount;
use crate::error::{CoreError, CoreResult};
use crate::store::Store;

const TEST_POST_MESSAGE: &str = "Test post from SocialFlow";

/// Credentials for a Meta page or Instagram business account.
#[derive(Debug, Clone, Deserialize)]
pub struct OauthConnection {
    pub platform: Platform,
    pub account_name: String,
    pub external_page_id: String,
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestPostResult {
    pub account_id: Uuid,
    #[serde(flatten)]
    pub outcome: PlatformOutcome,
}

#[derive(Clone)]
pub struct SocialAccountService {
    store: Arc<dyn Store>,
    events: Arc<dyn EventBus>,
    connectors: ConnectorRegistry,
}

impl SocialAccountService {
    pub fn new(store: Arc<dyn Store>, events: Arc<dyn EventBus>, connectors: ConnectorRegistry) -> Self {
        Self {
            store,
            events,
            connectors,
        }
    }

    /// Connect a simulated account.
    pub async fn connect_mock(
        &self,
        actor: &Actor,
        platform: Platform,
        account_name: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<SocialAccount> {
        let name = account_name.trim();
        if name.is_empty() {
            return Err(CoreError::invalid("account name must not be empty"));
        }
        self.connect(actor, SocialAccount::mock(actor.tenant_id(), platform, name, now), now)
            .await
    }

    /// Connect a Facebook page or Instagram business account.
    pub async fn connect_oauth(
        &self,
        actor: &Actor,
        connection: OauthConnection,
        now: DateTime<Utc>,
    ) -> CoreResult<SocialAccount> {
        if !connection.platform.is_meta() {
            return Err(CoreError::invalid(format!(
                "{} does not support OAuth connections",
                connection.platform
            )));
        }
        if connection.external_page_id.trim().is_empty() || connection.access_token.trim().is_empty() {
            return Err(CoreError::invalid("page id and access token are required"));
        }
        let name = match connection.account_name.trim() {
            "" => connection.external_page_id.clone(),
            other => other.to_string(),
        };
        let account = SocialAccount::oauth(
            actor.tenant_id(),
            connection.platform,
            name,
            connection.external_page_id,
            connection.access_token,
            now,
        );
        self.connect(actor, account, now).await
    }

    #[instrument(skip(self, actor, account), fields(tenant_id = %actor.tenant_id(), platform = %account.platform))]
    async fn connect(&self, actor: &Actor, account: SocialAccount, now: DateTime<Utc>) -> CoreResult<SocialAccount> {
        actor.require(ResourceType::SocialAccount, Action::Create)?;

        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        let tenant = load_tenant(&*self.store, actor.tenant_id()).await?;
        let usage = current_usage(&*self.store, tenant.id, now).await?;
        check(&tenant, GatedAction::ConnectSocialAccount, &usage, now)?;
        self.store.save_account(account.clone()).await?;
        drop(_guard);

        info!(account_id = %account.id, kind = account.kind.as_str(), "Social account connected");
        emit(
            &*self.events,
            ContentEvent::AccountConnected {
                account_id: account.id,
                platform: account.platform.as_str().to_string(),
            }
            .to_event(account.tenant_id)
            .with_user(actor.user_id),
        )
        .await;
        Ok(account)
    }

    pub async fn list(&self, actor: &Actor, now: DateTime<Utc>) -> CoreResult<Vec<SocialAccount>> {
        actor.permit(ResourceType::SocialAccount, Action::Read, GatedAction::ReadContent, now)?;
        self.store.list_accounts(actor.tenant_id()).await
    }

    async fn connected(&self, actor: &Actor, account_id: Uuid) -> CoreResult<SocialAccount> {
        let account = self
            .store
            .get_account(actor.tenant_id(), account_id)
            .await?
            .ok_or(CoreError::NotFound("Social account"))?;
        if !account.is_connected() {
            return Err(CoreError::invalid("social account is disconnected"));
        }
        Ok(account)
    }

    /// Refresh follower and engagement stats from the platform.
    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id()))]
    pub async fn sync(&self, actor: &Actor, account_id: Uuid, now: DateTime<Utc>) -> CoreResult<SocialAccount> {
        actor.permit(
            ResourceType::SocialAccount,
            Action::Update,
            GatedAction::SyncSocialAccount,
            now,
        )?;
        let account = self.connected(actor, account_id).await?;

        let target = account.target();
        let stats = self.connectors.for_target(&target).fetch_stats(&target).await?;

        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        let mut account = self.connected(actor, account_id).await?;
        account.record_stats(stats, now);
        self.store.save_account(account.clone()).await?;
        drop(_guard);

        emit(
            &*self.events,
            ContentEvent::AccountSynced {
                account_id,
                followers: account.stats.as_ref().map_or(0, |s| s.followers_count),
            }
            .to_event(account.tenant_id)
            .with_user(actor.user_id),
        )
        .await;
        Ok(account)
    }

    /// Send a fixed test message through the account. Not recorded as a post.
    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id()))]
    pub async fn test_post(&self, actor: &Actor, account_id: Uuid, now: DateTime<Utc>) -> CoreResult<TestPostResult> {
        actor.permit(
            ResourceType::SocialAccount,
            Action::Update,
            GatedAction::SyncSocialAccount,
            now,
        )?;
        let account = self.connected(actor, account_id).await?;

        let target = account.target();
        let request = PublishRequest::compose(Uuid::now_v7(), TEST_POST_MESSAGE, &[], None, now);
        let outcome = self.connectors.for_target(&target).publish(&request, &target).await?;
        Ok(TestPostResult {
            account_id,
            outcome,
        })
    }

    /// Disconnect; the record stays and stops counting toward the plan.
    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id()))]
    pub async fn disconnect(&self, actor: &Actor, account_id: Uuid, now: DateTime<Utc>) -> CoreResult<SocialAccount> {
        actor.permit(ResourceType::SocialAccount, Action::Delete, GatedAction::EditContent, now)?;

        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        let mut account = self
            .store
            .get_account(actor.tenant_id(), account_id)
            .await?
            .ok_or(CoreError::NotFound("Social account"))?;
        if !account.is_connected() {
            return Ok(account);
        }
        account.disconnect(now);
        self.store.save_account(account.clone()).await?;
        drop(_guard);

        emit(
            &*self.events,
            ContentEvent::AccountDisconnected { account_id }
                .to_event(account.tenant_id)
                .with_user(actor.user_id),
        )
        .await;
        Ok(account)
    }
}
