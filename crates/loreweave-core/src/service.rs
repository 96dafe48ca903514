//! Contracts for the external generation and hosting services.
//!
//! The core treats text generation, image generation and image hosting as
//! opaque collaborators. Concrete HTTP clients live in `loreweave-providers`;
//! tests inject scripted doubles.

use async_trait::async_trait;
use thiserror::Error;

/// Failure classes reported by an external service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service asked us to slow down (HTTP 429).
    #[error("rate limited")]
    RateLimited,

    /// The service failed on its side (HTTP 5xx).
    #[error("server error: status {status}")]
    Server {
        /// HTTP status code.
        status: u16,
    },

    /// The request was rejected (HTTP 4xx other than 429).
    #[error("client error: status {status}: {detail}")]
    Client {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        detail: String,
    },

    /// The call did not complete within its timeout.
    #[error("timed out after {0}")]
    Timeout(String),

    /// Connection-level failure before a status was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered successfully but without usable content.
    #[error("empty response: {0}")]
    EmptyResponse(String),

    /// The client is missing credentials or settings.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ServiceError {
    /// Classifies a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        match status {
            429 => Self::RateLimited,
            500..=599 => Self::Server { status },
            _ => Self::Client {
                status,
                detail: detail.into(),
            },
        }
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Client errors, empty responses and configuration problems are final.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Server { .. } | Self::Timeout(_) | Self::Transport(_)
        )
    }
}

/// A generated image, either already hosted or inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageHandle {
    /// A publicly reachable `http(s)` URL.
    Url(String),
    /// A `data:` URL carrying the encoded image.
    DataUrl(String),
}

impl ImageHandle {
    /// Returns the handle as a string suitable for an upload `file` field.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Url(url) | Self::DataUrl(url) => url,
        }
    }

    /// Whether the handle is already a remote URL.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }
}

/// Text completion service: prompt in, text out.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Completes `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError>;
}

/// Image generation service.
#[async_trait]
pub trait ImageGeneration: Send + Sync {
    /// Generates one image for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<ImageHandle, ServiceError>;
}

/// Image hosting service that turns a handle into a durable public URL.
#[async_trait]
pub trait ImageHosting: Send + Sync {
    /// Uploads `image` and returns its public URL.
    async fn upload(&self, image: &ImageHandle) -> Result<String, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classifies_rate_limit_server_and_client() {
        assert_eq!(ServiceError::from_status(429, ""), ServiceError::RateLimited);
        assert_eq!(
            ServiceError::from_status(502, "bad gateway"),
            ServiceError::Server { status: 502 }
        );
        assert_eq!(
            ServiceError::from_status(400, "bad prompt"),
            ServiceError::Client {
                status: 400,
                detail: "bad prompt".into()
            }
        );
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        assert!(!ServiceError::from_status(401, "").is_retryable());
        assert!(!ServiceError::EmptyResponse("no image".into()).is_retryable());
        assert!(!ServiceError::Configuration("missing key".into()).is_retryable());
    }

    #[test]
    fn test_server_rate_limit_timeout_and_transport_are_retryable() {
        assert!(ServiceError::RateLimited.is_retryable());
        assert!(ServiceError::Server { status: 500 }.is_retryable());
        assert!(ServiceError::Timeout("90s".into()).is_retryable());
        assert!(ServiceError::Transport("reset".into()).is_retryable());
    }

    #[test]
    fn test_image_handle_as_str_and_remote() {
        let remote = ImageHandle::Url("https://img.example/a.png".into());
        let inline = ImageHandle::DataUrl("data:image/png;base64,AAA".into());
        assert!(remote.is_remote());
        assert!(!inline.is_remote());
        assert_eq!(inline.as_str(), "data:image/png;base64,AAA");
    }
}
