//! Cloudinary-style signed image upload.
//!
//! The signature is the SHA-256 hex digest of the sorted `key=value` pairs
//! joined with `&`, followed by the API secret. `file`, `api_key` and
//! `signature_algorithm` are sent but never signed.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use loreweave_core::clock::Clock;
use loreweave_core::service::{ImageHandle, ImageHosting, ServiceError};
use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use crate::http::{build_client, ensure_success, json_body, transport_error};

/// Default upload API base.
pub const DEFAULT_UPLOAD_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Cloudinary credentials and upload options.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    /// Cloud name, part of the upload URL.
    pub cloud_name: String,
    /// Public API key.
    pub api_key: String,
    /// Secret used for signing.
    pub api_secret: String,
    /// Optional destination folder.
    pub folder: Option<String>,
    /// Upload API base URL.
    pub upload_base: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl CloudinaryConfig {
    /// Credentials with the default base URL and a 60 second timeout.
    #[must_use]
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            folder: None,
            upload_base: DEFAULT_UPLOAD_BASE.to_owned(),
            timeout: Duration::from_secs(60),
        }
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.upload_base.trim_end_matches('/'),
            self.cloud_name
        )
    }
}

/// Signs `params` with `secret`.
#[must_use]
pub fn sign(params: &BTreeMap<&str, String>, secret: &str) -> String {
    let joined = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{:x}", Sha256::digest(format!("{joined}{secret}").as_bytes()))
}

/// Image host backed by a Cloudinary account.
pub struct CloudinaryHost {
    config: CloudinaryConfig,
    client: Client,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CloudinaryHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryHost")
            .field("cloud_name", &self.config.cloud_name)
            .field("folder", &self.config.folder)
            .finish_non_exhaustive()
    }
}

impl CloudinaryHost {
    /// Creates a host.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Configuration` if any credential is blank or
    /// the HTTP client cannot be built.
    pub fn new(
        config: CloudinaryConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ServiceError> {
        if [&config.cloud_name, &config.api_key, &config.api_secret]
            .iter()
            .any(|v| v.trim().is_empty())
        {
            return Err(ServiceError::Configuration(
                "Cloudinary credentials are incomplete".into(),
            ));
        }
        let client = build_client(config.timeout)?;
        Ok(Self {
            config,
            client,
            clock,
        })
    }

    fn signed_params(&self) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        params.insert("timestamp", self.clock.now().timestamp().to_string());
        if let Some(folder) = &self.config.folder {
            params.insert("folder", folder.clone());
        }
        params
    }
}

#[async_trait]
impl ImageHosting for CloudinaryHost {
    #[instrument(skip_all, fields(cloud_name = %self.config.cloud_name, remote = image.is_remote()))]
    async fn upload(&self, image: &ImageHandle) -> Result<String, ServiceError> {
        let params = self.signed_params();
        let signature = sign(&params, &self.config.api_secret);

        let mut form: Vec<(&str, String)> = params.into_iter().collect();
        form.push(("file", image.as_str().to_owned()));
        form.push(("api_key", self.config.api_key.clone()));
        form.push(("signature", signature));
        form.push(("signature_algorithm", "sha256".to_owned()));

        let response = self
            .client
            .post(self.config.upload_url())
            .form(&form)
            .send()
            .await
            .map_err(|e| transport_error(&e, self.config.timeout))?;
        let json = json_body(ensure_success(response).await?).await?;

        let url = json
            .get("secure_url")
            .or_else(|| json.get("url"))
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ServiceError::EmptyResponse("upload response without URL".into()))?;
        debug!(url, "image uploaded");
        Ok(url.to_owned())
    }
}
