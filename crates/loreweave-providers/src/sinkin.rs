//! SinkIn-style image generation.

use std::time::Duration;

use async_trait::async_trait;
use loreweave_core::service::{ImageGeneration, ImageHandle, ServiceError};
use reqwest::Client;
use serde::Serialize;
use tracing::instrument;

use crate::http::{build_client, ensure_success, json_body, transport_error};
use crate::images;

/// Default generation endpoint.
pub const DEFAULT_API_URL: &str = "https://api.sinkin.ai/v1/generate";
/// Default model identifier.
pub const DEFAULT_MODEL_ID: &str = "JWknjgr";

/// SinkIn connection settings.
#[derive(Debug, Clone)]
pub struct SinkInConfig {
    /// Access token sent in the request body.
    pub access_token: String,
    /// Model identifier.
    pub model_id: String,
    /// Generation endpoint.
    pub api_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl SinkInConfig {
    /// Settings with the default endpoint, model and a 90 second timeout.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            model_id: DEFAULT_MODEL_ID.to_owned(),
            api_url: DEFAULT_API_URL.to_owned(),
            timeout: Duration::from_secs(90),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    access_token: &'a str,
    model_id: &'a str,
    prompt: &'a str,
    width: u32,
    height: u32,
    use_default_neg: &'static str,
    num_images: u32,
}

/// SinkIn image client. Answers are normalised through
/// [`images::normalize`] with PNG as the inline MIME type.
#[derive(Debug, Clone)]
pub struct SinkInImageClient {
    config: SinkInConfig,
    client: Client,
}

impl SinkInImageClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Configuration` for a blank token or if the
    /// HTTP client cannot be built.
    pub fn new(config: SinkInConfig) -> Result<Self, ServiceError> {
        if config.access_token.trim().is_empty() {
            return Err(ServiceError::Configuration(
                "SINKIN_ACCESS_TOKEN is empty".into(),
            ));
        }
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ImageGeneration for SinkInImageClient {
    #[instrument(skip_all, fields(model_id = %self.config.model_id))]
    async fn generate(&self, prompt: &str) -> Result<ImageHandle, ServiceError> {
        let body = GenerateRequest {
            access_token: &self.config.access_token,
            model_id: &self.config.model_id,
            prompt,
            width: 1024,
            height: 1024,
            use_default_neg: "true",
            num_images: 1,
        };
        let response = self
            .client
            .post(&self.config.api_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e, self.config.timeout))?;
        let json = json_body(ensure_success(response).await?).await?;
        images::normalize(&json, "image/png")
            .ok_or_else(|| ServiceError::EmptyResponse("SinkIn response without image".into()))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1/generate")
    }

    fn config(api_url: String) -> SinkInConfig {
        SinkInConfig {
            api_url,
            ..SinkInConfig::new("token-1")
        }
    }

    #[tokio::test]
    async fn test_generate_posts_token_and_returns_url() {
        // Arrange
        let router = Router::new().route(
            "/v1/generate",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["access_token"], "token-1");
                assert_eq!(body["model_id"], "JWknjgr");
                assert_eq!(body["num_images"], 1);
                Json(json!({ "error_code": 0, "images": ["https://cdn.sinkin.test/1.png"] }))
            }),
        );
        let client = SinkInImageClient::new(config(serve(router).await)).unwrap();

        // Act
        let handle = client.generate("a lone scout").await.unwrap();

        // Assert
        assert_eq!(handle, ImageHandle::Url("https://cdn.sinkin.test/1.png".into()));
    }

    #[tokio::test]
    async fn test_generate_maps_bad_request_to_client_error() {
        let router = Router::new().route(
            "/v1/generate",
            post(|| async { (StatusCode::BAD_REQUEST, "prompt rejected") }),
        );
        let client = SinkInImageClient::new(config(serve(router).await)).unwrap();

        let err = client.generate("x").await.unwrap_err();

        assert_eq!(
            err,
            ServiceError::Client {
                status: 400,
                detail: "prompt rejected".into()
            }
        );
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_generate_without_image_is_empty_response() {
        let router = Router::new().route(
            "/v1/generate",
            post(|| async { Json(json!({ "error_code": 0, "images": [] })) }),
        );
        let client = SinkInImageClient::new(config(serve(router).await)).unwrap();

        let err = client.generate("x").await.unwrap_err();

        assert!(matches!(err, ServiceError::EmptyResponse(_)));
    }

    #[test]
    fn test_blank_token_is_configuration_error() {
        let result = SinkInImageClient::new(SinkInConfig::new(""));
        assert!(matches!(result, Err(ServiceError::Configuration(_))));
    }
}
