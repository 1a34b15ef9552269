//! Meta Graph API connector.
//!
//! Publishes to Facebook pages (`/{page}/feed`, `/{page}/photos`) and to
//! Instagram business accounts (`/{ig-user}/media` then `/media_publish`).
//! Every call is bounded by the configured timeout.

use crate::config::ConnectorConfig;
use crate::connector::PublishConnector;
use crate::error::PublishError;
use crate::types::{
    AccountStats, AccountTarget, ConnectionKind, Platform, PlatformOutcome, PublishRequest,
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Graph error codes that mean the token is no longer usable.
const AUTH_ERROR_CODES: &[i64] = &[102, 190];

/// Graph error codes for application/user/page throttling.
const THROTTLE_ERROR_CODES: &[i64] = &[4, 17, 32, 613];

#[derive(Debug, Deserialize)]
struct GraphId {
    id: String,
    #[serde(default)]
    post_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorEnvelope {
    error: GraphErrorBody,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct GraphAccountFields {
    followers_count: Option<u64>,
    fan_count: Option<u64>,
    follows_count: Option<u64>,
    media_count: Option<u64>,
}

#[derive(Clone)]
pub struct MetaConnector {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for MetaConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaConnector")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl MetaConnector {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &ConnectorConfig) -> reqwest::Result<Self> {
        Self::new(&config.graph_api_url, config.publish_timeout())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post_graph(
        &self,
        path: &str,
        token: &str,
        body: serde_json::Value,
    ) -> Result<GraphId, PublishError> {
        let response = self
            .client
            .post(self.url(path))
            .query(&[("access_token", token)])
            .json(&body)
            .send()
            .await?;
        handle_response(response).await
    }

    async fn publish_facebook(
        &self,
        request: &PublishRequest,
        page_id: &str,
        token: &str,
    ) -> Result<(String, Option<String>), PublishError> {
        let created = match &request.image_url {
            Some(image_url) => {
                self.post_graph(
                    &format!("{}/photos", page_id),
                    token,
                    json!({ "url": image_url, "caption": request.message }),
                )
                .await?
            }
            None => {
                self.post_graph(
                    &format!("{}/feed", page_id),
                    token,
                    json!({ "message": request.message }),
                )
                .await?
            }
        };
        let external_id = created.post_id.unwrap_or(created.id);
        let url = format!("https://www.facebook.com/{}", external_id);
        Ok((external_id, Some(url)))
    }

    async fn publish_instagram(
        &self,
        request: &PublishRequest,
        ig_user_id: &str,
        token: &str,
    ) -> Result<(String, Option<String>), PublishError> {
        let image_url = request.image_url.as_deref().ok_or_else(|| {
            PublishError::InvalidRequest("Instagram posts require an image".to_string())
        })?;

        let container = self
            .post_graph(
                &format!("{}/media", ig_user_id),
                token,
                json!({ "image_url": image_url, "caption": request.message }),
            )
            .await?;
        debug!(creation_id = %container.id, "Instagram media container created");

        let published = self
            .post_graph(
                &format!("{}/media_publish", ig_user_id),
                token,
                json!({ "creation_id": container.id }),
            )
            .await?;
        Ok((published.id, None))
    }
}

fn credentials(target: &AccountTarget) -> Result<(&str, &str), PublishError> {
    let page_id = target
        .external_page_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| PublishError::InvalidRequest("Account has no page ID".to_string()))?;
    let token = target
        .access_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| PublishError::Unauthorized("Account has no access token".to_string()))?;
    Ok((page_id, token))
}

async fn handle_response<T>(response: reqwest::Response) -> Result<T, PublishError>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let error = classify_graph_error(status.as_u16(), &body);
        warn!(status = status.as_u16(), error = %error, "Graph API error");
        return Err(error);
    }

    response
        .json()
        .await
        .map_err(|e| PublishError::InvalidResponse(e.to_string()))
}

/// Map a Graph API error response onto a [`PublishError`].
///
/// Meta reports expired tokens and throttling with 400 plus an error code, so
/// the code takes precedence over the HTTP status.
fn classify_graph_error(status: u16, body: &str) -> PublishError {
    let parsed = serde_json::from_str::<GraphErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());

    match parsed.and_then(|e| e.error.code) {
        Some(code) if AUTH_ERROR_CODES.contains(&code) => PublishError::Unauthorized(message),
        Some(code) if THROTTLE_ERROR_CODES.contains(&code) => PublishError::RateLimited(message),
        _ => PublishError::from_status(status, message),
    }
}

#[async_trait]
impl PublishConnector for MetaConnector {
    fn kind(&self) -> ConnectionKind {
        ConnectionKind::Oauth
    }

    #[instrument(skip(self, request, target), fields(post_id = %request.post_id, platform = %target.platform))]
    async fn publish(
        &self,
        request: &PublishRequest,
        target: &AccountTarget,
    ) -> Result<PlatformOutcome, PublishError> {
        let (page_id, token) = credentials(target)?;

        let (external_id, url) = match target.platform {
            Platform::Facebook => self.publish_facebook(request, page_id, token).await?,
            Platform::Instagram => self.publish_instagram(request, page_id, token).await?,
            other => {
                return Err(PublishError::InvalidRequest(format!(
                    "{} is not a Meta platform",
                    other
                )))
            }
        };
        debug!(external_id = %external_id, "Published through Graph API");

        Ok(PlatformOutcome {
            platform: target.platform,
            account_id: target.account_id,
            external_id,
            url,
            // Graph reports reach later through insights
            reach: 0,
            simulated: false,
            published_at: request.requested_at,
        })
    }

    #[instrument(skip(self, target), fields(platform = %target.platform))]
    async fn fetch_stats(&self, target: &AccountTarget) -> Result<AccountStats, PublishError> {
        let (page_id, token) = credentials(target)?;
        let fields = match target.platform {
            Platform::Facebook => "followers_count,fan_count",
            Platform::Instagram => "followers_count,follows_count,media_count",
            other => {
                return Err(PublishError::InvalidRequest(format!(
                    "{} is not a Meta platform",
                    other
                )))
            }
        };

        let response = self
            .client
            .get(self.url(page_id))
            .query(&[("fields", fields), ("access_token", token)])
            .send()
            .await?;
        let account: GraphAccountFields = handle_response(response).await?;

        Ok(AccountStats {
            followers_count: account.followers_count.or(account.fan_count).unwrap_or(0),
            following_count: account.follows_count.unwrap_or(0),
            posts_count: account.media_count.unwrap_or(0),
            engagement_rate: 0.0,
            last_synced_at: Utc::now(),
        })
    }
}
