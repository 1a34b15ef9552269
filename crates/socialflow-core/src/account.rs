//! Connected social accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use socialflow_connectors::{AccountStats, AccountTarget, ConnectionKind, Platform};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialAccount {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub platform: Platform,

    /// Handle or page name shown in the UI
    pub account_name: String,

    pub kind: ConnectionKind,
    pub state: ConnectionState,

    /// Last synced stats
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<AccountStats>,

    /// Facebook page or Instagram business account ID (oauth only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_page_id: Option<String>,

    /// Opaque access token (oauth only), never serialized
    #[serde(skip)]
    pub credential: Option<String>,

    pub connected_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SocialAccount {
    pub fn mock(tenant_id: Uuid, platform: Platform, account_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            tenant_id,
            platform,
            account_name: account_name.into(),
            kind: ConnectionKind::Mock,
            state: ConnectionState::Connected,
            stats: None,
            external_page_id: None,
            credential: None,
            connected_at: now,
            updated_at: now,
        }
    }

    pub fn oauth(
        tenant_id: Uuid,
        platform: Platform,
        account_name: impl Into<String>,
        external_page_id: impl Into<String>,
        credential: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            kind: ConnectionKind::Oauth,
            external_page_id: Some(external_page_id.into()),
            credential: Some(credential.into()),
            ..Self::mock(tenant_id, platform, account_name, now)
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Disconnect and drop the stored credential. The record is kept.
    pub fn disconnect(&mut self, now: DateTime<Utc>) {
        self.state = ConnectionState::Disconnected;
        self.credential = None;
        self.updated_at = now;
    }

    pub fn record_stats(&mut self, stats: AccountStats, now: DateTime<Utc>) {
        self.stats = Some(stats);
        self.updated_at = now;
    }

    pub fn target(&self) -> AccountTarget {
        AccountTarget {
            account_id: Some(self.id),
            platform: self.platform,
            kind: self.kind,
            display_name: self.account_name.clone(),
            external_page_id: self.external_page_id.clone(),
            access_token: self.credential.clone(),
        }
    }
}

/// Pick the account a platform publishes through: connected only, OAuth
/// before mock, oldest first.
pub fn publishing_account(accounts: &[SocialAccount], platform: Platform) -> Option<&SocialAccount> {
    accounts
        .iter()
        .filter(|a| a.platform == platform && a.is_connected())
        .min_by_key(|a| (a.kind != ConnectionKind::Oauth, a.connected_at, a.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_credential_never_serialized() {
        let account = SocialAccount::oauth(
            Uuid::now_v7(),
            Platform::Facebook,
            "Acme",
            "1789",
            "page-token",
            Utc::now(),
        );
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("credential").is_none());
        assert_eq!(json["kind"], "oauth");
        assert_eq!(account.target().access_token.as_deref(), Some("page-token"));
    }

    #[test]
    fn test_disconnect_drops_credential() {
        let now = Utc::now();
        let mut account =
            SocialAccount::oauth(Uuid::now_v7(), Platform::Instagram, "acme", "17", "tok", now);
        account.disconnect(now);
        assert!(!account.is_connected());
        assert!(account.credential.is_none());
    }

    #[test]
    fn test_publishing_account_prefers_oauth() {
        let now = Utc::now();
        let tenant = Uuid::now_v7();
        let mock = SocialAccount::mock(tenant, Platform::Facebook, "mock", now - Duration::days(1));
        let oauth = SocialAccount::oauth(tenant, Platform::Facebook, "real", "1", "tok", now);
        let mut gone = SocialAccount::oauth(tenant, Platform::Facebook, "old", "2", "tok", now - Duration::days(9));
        gone.disconnect(now);
        let accounts = vec![mock.clone(), oauth.clone(), gone];

        assert_eq!(publishing_account(&accounts, Platform::Facebook).map(|a| a.id), Some(oauth.id));
        assert!(publishing_account(&accounts, Platform::Tiktok).is_none());
        assert_eq!(
            publishing_account(&[mock.clone()], Platform::Facebook).map(|a| a.id),
            Some(mock.id)
        );
    }
}
