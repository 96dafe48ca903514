//! Retry with exponential backoff for image generation.
//!
//! Each attempt is bounded by its own timeout. Only failures that
//! `ServiceError::is_retryable` accepts are retried; client errors and empty
//! responses end the loop at once.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use loreweave_core::service::{ImageGeneration, ImageHandle, ServiceError};
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Retry settings.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Extra attempts after the first.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub initial_backoff: Duration,
    /// Upper bound for a single delay.
    pub max_backoff: Duration,
    /// Timeout applied to every attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(8),
            attempt_timeout: Duration::from_secs(90),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (zero-based).
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2_u32.saturating_pow(retry);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// An `ImageGeneration` that retries its inner generator.
pub struct RetryingImageGenerator {
    inner: Arc<dyn ImageGeneration>,
    policy: RetryPolicy,
}

impl RetryingImageGenerator {
    /// Wraps `inner` with `policy`.
    #[must_use]
    pub fn new(inner: Arc<dyn ImageGeneration>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl ImageGeneration for RetryingImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<ImageHandle, ServiceError> {
        let attempts = self.policy.max_retries + 1;
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = timeout(self.policy.attempt_timeout, self.inner.generate(prompt))
                .await
                .unwrap_or_else(|_| {
                    Err(ServiceError::Timeout(format!(
                        "{}s",
                        self.policy.attempt_timeout.as_secs()
                    )))
                });
            match result {
                Ok(handle) => {
                    debug!(attempt, "image generated");
                    return Ok(handle);
                }
                Err(e) if !e.is_retryable() => {
                    warn!(attempt, error = %e, "image generation failed, not retrying");
                    return Err(e);
                }
                Err(e) if attempt >= attempts => {
                    warn!(attempt, error = %e, "image generation failed, retries exhausted");
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.policy.backoff(attempt - 1);
                    warn!(
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        backoff_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "image generation failed, retrying"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use loreweave_test_support::{FailingImageService, StaticImageService};

    use super::*;

    fn handle() -> ImageHandle {
        ImageHandle::Url("https://img.test/1.png".into())
    }

    struct NeverAnswers;

    #[async_trait]
    impl ImageGeneration for NeverAnswers {
        async fn generate(&self, _prompt: &str) -> Result<ImageHandle, ServiceError> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(5), Duration::from_secs(8));
        assert_eq!(policy.backoff(40), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_server_errors_until_success() {
        // Arrange
        let inner = Arc::new(
            StaticImageService::new(handle()).failing_first(2, &ServiceError::Server { status: 503 }),
        );
        let retrying = RetryingImageGenerator::new(inner.clone(), RetryPolicy::default());

        // Act
        let result = retrying.generate("a tower").await;

        // Assert
        assert_eq!(result.unwrap(), handle());
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let inner = Arc::new(FailingImageService::new(ServiceError::RateLimited));
        let retrying = RetryingImageGenerator::new(inner.clone(), RetryPolicy::default());

        let result = retrying.generate("a tower").await;

        assert_eq!(result.unwrap_err(), ServiceError::RateLimited);
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_error_is_not_retried() {
        let inner = Arc::new(FailingImageService::new(ServiceError::Client {
            status: 401,
            detail: "bad token".into(),
        }));
        let retrying = RetryingImageGenerator::new(inner.clone(), RetryPolicy::default());

        let result = retrying.generate("a tower").await;

        assert!(matches!(result, Err(ServiceError::Client { status: 401, .. })));
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_attempt_is_bounded_by_timeout() {
        let policy = RetryPolicy {
            max_retries: 1,
            attempt_timeout: Duration::from_secs(5),
            ..RetryPolicy::default()
        };
        let retrying = RetryingImageGenerator::new(Arc::new(NeverAnswers), policy);
        let started = tokio::time::Instant::now();

        let result = retrying.generate("a tower").await;

        assert_eq!(result.unwrap_err(), ServiceError::Timeout("5s".into()));
        // two attempts of 5s plus one 1s backoff
        assert!(started.elapsed() >= Duration::from_secs(11));
    }
}
