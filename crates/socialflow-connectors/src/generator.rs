//! AI content generation.
//!
//! [`HttpContentGenerator`] speaks the OpenAI-compatible `chat/completions`
//! and `images/generations` endpoints. Quota and plan checks happen in the
//! caller; this module only produces content.

use crate::config::ConnectorConfig;
use crate::error::GenerationError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const CAPTION_SYSTEM_PROMPT: &str = "You are a social media marketing expert. Write an engaging, \
professional caption for a social media post. Keep it concise and use emojis where they fit.";

const HASHTAG_SYSTEM_PROMPT: &str = "You are a social media hashtag expert. Reply with 10 to 15 \
relevant hashtags separated by spaces, each starting with #, and nothing else.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationKind {
    Caption,
    Hashtags,
    Image,
}

impl GenerationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationKind::Caption => "caption",
            GenerationKind::Hashtags => "hashtags",
            GenerationKind::Image => "image",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "caption" => Some(GenerationKind::Caption),
            "hashtags" | "hashtag" => Some(GenerationKind::Hashtags),
            "image" => Some(GenerationKind::Image),
            _ => None,
        }
    }
}

/// Generator output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub kind: GenerationKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Parsed hashtags (hashtags kind only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hashtags: Vec<String>,

    /// Hosted URL or `data:` URL (image kind only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl GeneratedContent {
    pub fn caption(text: impl Into<String>) -> Self {
        Self {
            kind: GenerationKind::Caption,
            text: Some(text.into()),
            hashtags: Vec::new(),
            image_url: None,
        }
    }

    pub fn hashtags(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            kind: GenerationKind::Hashtags,
            hashtags: extract_hashtags(&text),
            text: Some(text),
            image_url: None,
        }
    }

    pub fn image(image_url: impl Into<String>) -> Self {
        Self {
            kind: GenerationKind::Image,
            text: None,
            hashtags: Vec::new(),
            image_url: Some(image_url.into()),
        }
    }
}

/// Pull `#tags` out of free text, dropping duplicates and keeping order.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for token in text.split(|c: char| c.is_whitespace() || c == ',') {
        let tag = token.trim_matches(|c: char| !(c.is_alphanumeric() || c == '#' || c == '_'));
        if tag.len() > 1 && tag.starts_with('#') && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(
        &self,
        kind: GenerationKind,
        prompt: &str,
    ) -> Result<GeneratedContent, GenerationError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: String,
    n: u8,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    b64_json: Option<String>,
}

/// OpenAI-compatible generator.
#[derive(Clone)]
pub struct HttpContentGenerator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    text_model: String,
    image_model: String,
}

impl std::fmt::Debug for HttpContentGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpContentGenerator")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .finish()
    }
}

impl HttpContentGenerator {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let defaults = ConnectorConfig::default();
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            text_model: defaults.ai_text_model,
            image_model: defaults.ai_image_model,
        })
    }

    pub fn from_config(config: &ConnectorConfig) -> reqwest::Result<Self> {
        let mut generator =
            Self::new(&config.ai_api_url, config.ai_api_key.clone(), config.ai_timeout())?;
        generator.text_model = config.ai_text_model.clone();
        generator.image_model = config.ai_image_model.clone();
        Ok(generator)
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, GenerationError> {
        self.api_key.as_deref().ok_or(GenerationError::NotConfigured)
    }

    async fn complete(&self, system: &str, user: String) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: &self.text_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key()?)
            .json(&body)
            .send()
            .await?;
        let parsed: ChatResponse = handle_response(response).await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| GenerationError::InvalidResponse("empty completion".to_string()))
    }

    async fn image(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = ImageRequest {
            model: &self.image_model,
            prompt: format!(
                "Create a professional social media marketing image for: {}. \
                 Modern, visually appealing, suitable for Instagram and Facebook.",
                prompt
            ),
            n: 1,
            size: "1024x1024",
        };

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(self.api_key()?)
            .json(&body)
            .send()
            .await?;
        let parsed: ImageResponse = handle_response(response).await?;

        let image = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::InvalidResponse("no image returned".to_string()))?;
        match (image.url, image.b64_json) {
            (Some(url), _) => Ok(url),
            (None, Some(data)) => Ok(format!("data:image/png;base64,{}", data)),
            (None, None) => Err(GenerationError::InvalidResponse(
                "image has neither url nor data".to_string(),
            )),
        }
    }
}

async fn handle_response<T>(response: reqwest::Response) -> Result<T, GenerationError>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        warn!(status = status.as_u16(), "AI provider error: {}", message);
        return Err(GenerationError::Provider {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| GenerationError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl ContentGenerator for HttpContentGenerator {
    #[instrument(skip_all, fields(kind = kind.as_str()))]
    async fn generate(
        &self,
        kind: GenerationKind,
        prompt: &str,
    ) -> Result<GeneratedContent, GenerationError> {
        debug!("Requesting AI content");
        match kind {
            GenerationKind::Caption => {
                let text = self
                    .complete(
                        CAPTION_SYSTEM_PROMPT,
                        format!("Generate a social media caption for: {}", prompt),
                    )
                    .await?;
                Ok(GeneratedContent::caption(text))
            }
            GenerationKind::Hashtags => {
                let text = self
                    .complete(
                        HASHTAG_SYSTEM_PROMPT,
                        format!("Generate hashtags for: {}", prompt),
                    )
                    .await?;
                Ok(GeneratedContent::hashtags(text))
            }
            GenerationKind::Image => Ok(GeneratedContent::image(self.image(prompt).await?)),
        }
    }
}

/// Deterministic generator for local development and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticGenerator;

#[async_trait]
impl ContentGenerator for StaticGenerator {
    async fn generate(
        &self,
        kind: GenerationKind,
        prompt: &str,
    ) -> Result<GeneratedContent, GenerationError> {
        let topic = prompt.trim();
        Ok(match kind {
            GenerationKind::Caption => GeneratedContent::caption(format!("✨ {} ✨", topic)),
            GenerationKind::Hashtags => {
                let tag: String = topic.chars().filter(|c| c.is_alphanumeric()).collect();
                GeneratedContent::hashtags(format!("#{} #socialflow #marketing", tag.to_lowercase()))
            }
            GenerationKind::Image => {
                GeneratedContent::image("https://placehold.co/1024x1024?text=SocialFlow")
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_hashtags() {
        let tags = extract_hashtags("#summer #Sale, #summer and more #fun! # #");
        assert_eq!(tags, vec!["#summer", "#Sale", "#fun"]);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(GenerationKind::parse("Caption"), Some(GenerationKind::Caption));
        assert_eq!(GenerationKind::parse("hashtag"), Some(GenerationKind::Hashtags));
        assert_eq!(GenerationKind::parse("video"), None);
    }

    #[tokio::test]
    async fn test_unconfigured_generator() {
        let generator =
            HttpContentGenerator::new("http://localhost:9", None, Duration::from_secs(1)).unwrap();
        assert!(!generator.is_configured());
        assert_eq!(
            generator.generate(GenerationKind::Caption, "coffee").await,
            Err(GenerationError::NotConfigured)
        );
    }

    #[tokio::test]
    async fn test_static_generator() {
        let content = StaticGenerator
            .generate(GenerationKind::Hashtags, "Cold Brew")
            .await
            .unwrap();
        assert_eq!(content.hashtags, vec!["#coldbrew", "#socialflow", "#marketing"]);
    }
}
