//! Connector configuration.
//!
//! Loaded from environment variables with defaults for local development.

use std::time::Duration;

pub const DEFAULT_GRAPH_API_URL: &str = "https://graph.facebook.com/v19.0";
pub const DEFAULT_AI_API_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Meta Graph API base URL, version included
    pub graph_api_url: String,

    /// Bound on every publish or stats call
    pub publish_timeout_secs: u64,

    /// OpenAI-compatible API base URL
    pub ai_api_url: String,

    /// Generation is disabled without a key
    pub ai_api_key: Option<String>,

    pub ai_text_model: String,
    pub ai_image_model: String,
    pub ai_timeout_secs: u64,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            graph_api_url: DEFAULT_GRAPH_API_URL.to_string(),
            publish_timeout_secs: 30,
            ai_api_url: DEFAULT_AI_API_URL.to_string(),
            ai_api_key: None,
            ai_text_model: "gpt-4o-mini".to_string(),
            ai_image_model: "gpt-image-1".to_string(),
            ai_timeout_secs: 60,
        }
    }
}

impl ConnectorConfig {
    /// Load configuration from environment variables.
    ///
    /// - `META_GRAPH_API_URL` (default: https://graph.facebook.com/v19.0)
    /// - `PUBLISH_TIMEOUT_SECS` (default: 30)
    /// - `AI_API_URL` (default: https://api.openai.com/v1)
    /// - `AI_API_KEY`
    /// - `AI_TEXT_MODEL`, `AI_IMAGE_MODEL`
    /// - `AI_TIMEOUT_SECS` (default: 60)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            graph_api_url: std::env::var("META_GRAPH_API_URL").unwrap_or(default.graph_api_url),
            publish_timeout_secs: std::env::var("PUBLISH_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.publish_timeout_secs),
            ai_api_url: std::env::var("AI_API_URL").unwrap_or(default.ai_api_url),
            ai_api_key: std::env::var("AI_API_KEY").ok().filter(|k| !k.is_empty()),
            ai_text_model: std::env::var("AI_TEXT_MODEL").unwrap_or(default.ai_text_model),
            ai_image_model: std::env::var("AI_IMAGE_MODEL").unwrap_or(default.ai_image_model),
            ai_timeout_secs: std::env::var("AI_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.ai_timeout_secs),
        }
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_timeout_secs)
    }
}
