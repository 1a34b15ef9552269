//! OpenAI-compatible generator against a mock provider.

use socialflow_connectors::{
    ContentGenerator, GenerationError, GenerationKind, HttpContentGenerator,
};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn generator(server: &MockServer) -> HttpContentGenerator {
    HttpContentGenerator::new(server.uri(), Some("test-key".to_string()), Duration::from_secs(2))
        .unwrap()
}

#[tokio::test]
async fn test_caption_generation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "  Fresh coffee, fresh start ☕ " } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let content = generator(&server)
        .generate(GenerationKind::Caption, "coffee shop opening")
        .await
        .unwrap();
    assert_eq!(content.text.as_deref(), Some("Fresh coffee, fresh start ☕"));
}

#[tokio::test]
async fn test_hashtag_generation_parses_tags() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [ { "message": { "content": "#coffee #latte #morning" } } ]
        })))
        .mount(&server)
        .await;

    let content = generator(&server)
        .generate(GenerationKind::Hashtags, "coffee")
        .await
        .unwrap();
    assert_eq!(content.hashtags, vec!["#coffee", "#latte", "#morning"]);
}

#[tokio::test]
async fn test_image_generation_b64() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [ { "b64_json": "iVBORw0KGgo=" } ]
        })))
        .mount(&server)
        .await;

    let content = generator(&server)
        .generate(GenerationKind::Image, "latte art")
        .await
        .unwrap();
    assert_eq!(
        content.image_url.as_deref(),
        Some("data:image/png;base64,iVBORw0KGgo=")
    );
}

#[tokio::test]
async fn test_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = generator(&server)
        .generate(GenerationKind::Caption, "coffee")
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Provider { status: 500, .. }));
    assert!(err.is_retryable());
}
