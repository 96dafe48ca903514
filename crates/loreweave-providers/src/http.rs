//! Shared HTTP plumbing.

use std::time::Duration;

use loreweave_core::service::ServiceError;
use reqwest::{Client, Response};

/// Builds a client whose every request is bounded by `timeout`.
pub(crate) fn build_client(timeout: Duration) -> Result<Client, ServiceError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ServiceError::Configuration(format!("http client: {e}")))
}

/// Maps a `reqwest` failure to its service class.
pub(crate) fn transport_error(err: &reqwest::Error, timeout: Duration) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout(format!("{}s", timeout.as_secs()))
    } else {
        ServiceError::Transport(err.to_string())
    }
}

/// Passes successful responses through; classifies the rest by status,
/// keeping the body as detail.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().await.unwrap_or_default();
    Err(ServiceError::from_status(status.as_u16(), detail))
}

/// Decodes a JSON body.
pub(crate) async fn json_body(response: Response) -> Result<serde_json::Value, ServiceError> {
    response
        .json()
        .await
        .map_err(|e| ServiceError::EmptyResponse(format!("invalid JSON body: {e}")))
}
