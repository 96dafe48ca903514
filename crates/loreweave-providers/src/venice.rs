//! Venice-style OpenAI-compatible API: chat completions and image
//! generation.

use std::time::Duration;

use async_trait::async_trait;
use loreweave_core::service::{ImageGeneration, ImageHandle, ServiceError, TextCompletion};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::http::{build_client, ensure_success, json_body, transport_error};
use crate::images;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.venice.ai/api/v1";
/// Default chat model.
pub const DEFAULT_TEXT_MODEL: &str = "venice-uncensored";
/// Default image model.
pub const DEFAULT_IMAGE_MODEL: &str = "venice-sd35";

/// Connection settings shared by the Venice clients.
#[derive(Debug, Clone)]
pub struct VeniceConfig {
    /// Bearer token.
    pub api_key: String,
    /// API base URL without trailing slash.
    pub base_url: String,
    /// Chat completion model.
    pub text_model: String,
    /// Image generation model.
    pub image_model: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl VeniceConfig {
    /// Settings with default URL, models and a 60 second timeout.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            text_model: DEFAULT_TEXT_MODEL.to_owned(),
            image_model: DEFAULT_IMAGE_MODEL.to_owned(),
            timeout: Duration::from_secs(60),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// First non-blank choice content, falling back to the legacy `text` field.
fn first_content(response: ChatResponse) -> Option<String> {
    let first = response.choices.into_iter().next()?;
    first
        .message
        .and_then(|m| m.content)
        .or(first.text)
        .filter(|c| !c.trim().is_empty())
}

/// Chat-completion text service.
#[derive(Debug, Clone)]
pub struct VeniceTextClient {
    config: VeniceConfig,
    client: Client,
}

impl VeniceTextClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Configuration` for a blank key or if the HTTP
    /// client cannot be built.
    pub fn new(config: VeniceConfig) -> Result<Self, ServiceError> {
        if config.api_key.trim().is_empty() {
            return Err(ServiceError::Configuration("VENICE_API_KEY is empty".into()));
        }
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl TextCompletion for VeniceTextClient {
    #[instrument(skip_all, fields(model = %self.config.text_model, prompt_chars = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        let body = ChatRequest {
            model: &self.config.text_model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let response = self
            .client
            .post(self.config.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e, self.config.timeout))?;
        let response = ensure_success(response).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::EmptyResponse(format!("invalid chat body: {e}")))?;

        let content = first_content(parsed)
            .ok_or_else(|| ServiceError::EmptyResponse("chat completion without content".into()))?;
        debug!(reply_chars = content.len(), "text completion received");
        Ok(content)
    }
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    width: u32,
    height: u32,
    format: &'static str,
}

/// Venice image generation; answers with base64 WebP, wrapped as a data URL.
#[derive(Debug, Clone)]
pub struct VeniceImageClient {
    config: VeniceConfig,
    client: Client,
}

impl VeniceImageClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Configuration` for a blank key or if the HTTP
    /// client cannot be built.
    pub fn new(config: VeniceConfig) -> Result<Self, ServiceError> {
        if config.api_key.trim().is_empty() {
            return Err(ServiceError::Configuration("VENICE_API_KEY is empty".into()));
        }
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ImageGeneration for VeniceImageClient {
    #[instrument(skip_all, fields(model = %self.config.image_model))]
    async fn generate(&self, prompt: &str) -> Result<ImageHandle, ServiceError> {
        let body = ImageRequest {
            model: &self.config.image_model,
            prompt,
            width: 1024,
            height: 1024,
            format: "webp",
        };
        let response = self
            .client
            .post(self.config.endpoint("image/generate"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e, self.config.timeout))?;
        let json = json_body(ensure_success(response).await?).await?;
        images::normalize(&json, "image/webp")
            .ok_or_else(|| ServiceError::EmptyResponse("image response without image".into()))
    }
}

#[cfg(test)]
mod tests {
    use axum::Json;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use serde_json::{Value, json};

    use super::*;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn config(base_url: String) -> VeniceConfig {
        VeniceConfig {
            base_url,
            ..VeniceConfig::new("test-key")
        }
    }

    #[test]
    fn test_first_content_prefers_message_then_text() {
        let message: ChatResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "content": "Hello" }, "text": "legacy" }]
        }))
        .unwrap();
        let legacy: ChatResponse =
            serde_json::from_value(json!({ "choices": [{ "text": "legacy" }] })).unwrap();
        let blank: ChatResponse =
            serde_json::from_value(json!({ "choices": [{ "message": { "content": "  " } }] }))
                .unwrap();

        assert_eq!(first_content(message).as_deref(), Some("Hello"));
        assert_eq!(first_content(legacy).as_deref(), Some("legacy"));
        assert_eq!(first_content(blank), None);
    }

    #[test]
    fn test_blank_key_is_configuration_error() {
        let result = VeniceTextClient::new(VeniceConfig::new("  "));
        assert!(matches!(result, Err(ServiceError::Configuration(_))));
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let cfg = config("http://host/api/v1/".into());
        assert_eq!(cfg.endpoint("chat/completions"), "http://host/api/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_complete_sends_prompt_and_reads_choice() {
        // Arrange
        let router = Router::new().route(
            "/chat/completions",
            post(|headers: axum::http::HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer test-key");
                assert_eq!(body["model"], "venice-uncensored");
                let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
                Json(json!({ "choices": [{ "message": { "content": format!("echo: {prompt}") } }] }))
            }),
        );
        let client = VeniceTextClient::new(config(serve(router).await)).unwrap();

        // Act
        let reply = client.complete("the gate opens").await.unwrap();

        // Assert
        assert_eq!(reply, "echo: the gate opens");
    }

    #[tokio::test]
    async fn test_complete_classifies_server_and_rate_limit_errors() {
        let router = Router::new()
            .route("/chat/completions", post(|| async { StatusCode::TOO_MANY_REQUESTS }));
        let client = VeniceTextClient::new(config(serve(router).await)).unwrap();

        let err = client.complete("anything").await.unwrap_err();

        assert_eq!(err, ServiceError::RateLimited);
    }

    #[tokio::test]
    async fn test_complete_without_choices_is_empty_response() {
        let router = Router::new()
            .route("/chat/completions", post(|| async { Json(json!({ "choices": [] })) }));
        let client = VeniceTextClient::new(config(serve(router).await)).unwrap();

        let err = client.complete("anything").await.unwrap_err();

        assert!(matches!(err, ServiceError::EmptyResponse(_)));
    }

    #[tokio::test]
    async fn test_generate_wraps_base64_webp() {
        let router = Router::new().route(
            "/image/generate",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["format"], "webp");
                Json(json!({ "images": ["UklGR"] }))
            }),
        );
        let client = VeniceImageClient::new(config(serve(router).await)).unwrap();

        let handle = client.generate("a neon tower").await.unwrap();

        assert_eq!(handle, ImageHandle::DataUrl("data:image/webp;base64,UklGR".into()));
    }
}
