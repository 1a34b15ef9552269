//! Connector request and result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported social platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Instagram,
    Facebook,
    Linkedin,
    Twitter,
    Tiktok,
}

impl Platform {
    pub fn all() -> &'static [Platform] {
        &[
            Platform::Instagram,
            Platform::Facebook,
            Platform::Linkedin,
            Platform::Twitter,
            Platform::Tiktok,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Linkedin => "linkedin",
            Platform::Twitter => "twitter",
            Platform::Tiktok => "tiktok",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "instagram" | "ig" => Some(Platform::Instagram),
            "facebook" | "fb" => Some(Platform::Facebook),
            "linkedin" => Some(Platform::Linkedin),
            "twitter" | "x" => Some(Platform::Twitter),
            "tiktok" => Some(Platform::Tiktok),
            _ => None,
        }
    }

    /// Platforms reachable through the Meta Graph API.
    pub fn is_meta(&self) -> bool {
        matches!(self, Platform::Instagram | Platform::Facebook)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a social account is connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    /// Simulated account; publishing never leaves the process
    #[default]
    Mock,
    /// Real account with a stored access token
    Oauth,
}

impl ConnectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionKind::Mock => "mock",
            ConnectionKind::Oauth => "oauth",
        }
    }
}

/// Account statistics as last reported by a platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountStats {
    pub followers_count: u64,
    pub following_count: u64,
    pub posts_count: u64,

    /// Percent, two decimals
    pub engagement_rate: f64,

    pub last_synced_at: DateTime<Utc>,
}

/// The account a post is published to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountTarget {
    /// `None` when no account is connected for the platform
    pub account_id: Option<Uuid>,

    pub platform: Platform,
    pub kind: ConnectionKind,
    pub display_name: String,

    /// Facebook page ID or Instagram business account ID
    pub external_page_id: Option<String>,

    /// Opaque credential (OAuth access token)
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}

impl AccountTarget {
    /// Stand-in target for a platform with no connected account.
    pub fn simulated(platform: Platform) -> Self {
        Self {
            account_id: None,
            platform,
            kind: ConnectionKind::Mock,
            display_name: format!("{} (simulated)", platform),
            external_page_id: None,
            access_token: None,
        }
    }
}

/// Content handed to a connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRequest {
    pub post_id: Uuid,

    /// Caption with hashtags appended
    pub message: String,

    pub image_url: Option<String>,

    /// Caller's clock; stamped on every outcome of this request
    pub requested_at: DateTime<Utc>,
}

impl PublishRequest {
    /// Build the outgoing message from caption and ordered hashtags.
    pub fn compose(
        post_id: Uuid,
        caption: &str,
        hashtags: &[String],
        image_url: Option<String>,
        requested_at: DateTime<Utc>,
    ) -> Self {
        let tags: Vec<String> = hashtags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .map(|tag| {
                if tag.starts_with('#') {
                    tag.to_string()
                } else {
                    format!("#{}", tag)
                }
            })
            .collect();

        let message = if tags.is_empty() {
            caption.to_string()
        } else {
            format!("{}\n\n{}", caption, tags.join(" "))
        };

        Self {
            post_id,
            message,
            image_url,
            requested_at,
        }
    }
}

/// Successful publish to one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformOutcome {
    pub platform: Platform,
    pub account_id: Option<Uuid>,
    pub external_id: String,
    pub url: Option<String>,

    /// Estimated reach
    pub reach: u64,

    /// True when produced by the simulator
    pub simulated: bool,

    pub published_at: DateTime<Utc>,
}
