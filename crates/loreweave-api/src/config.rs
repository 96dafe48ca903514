//! Server configuration read from the environment.
//!
//! Every variable is looked up through a closure so tests can supply a map
//! instead of mutating the process environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use loreweave_narrative::application::strategies::ImagePromptMode;
use loreweave_narrative::domain::config::Language;
use loreweave_providers::{sinkin, venice};

use crate::error::AppError;

/// Which image generator to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageProvider {
    /// SinkIn-style generation API.
    SinkIn,
    /// Venice image generation.
    Venice,
}

impl FromStr for ImageProvider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sinkin" => Ok(Self::SinkIn),
            "venice" => Ok(Self::Venice),
            other => Err(AppError::Config(format!(
                "IMAGE_PROVIDER must be sinkin or venice, got {other}"
            ))),
        }
    }
}

/// Image hosting credentials.
#[derive(Debug, Clone)]
pub struct CloudinarySettings {
    /// Cloud name.
    pub cloud_name: String,
    /// API key.
    pub api_key: String,
    /// API secret.
    pub api_secret: String,
    /// Upload folder.
    pub folder: Option<String>,
}

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub database_max_connections: u32,
    pub venice_api_key: String,
    pub venice_base_url: String,
    pub venice_text_model: String,
    pub venice_image_model: String,
    pub image_provider: ImageProvider,
    pub sinkin_access_token: Option<String>,
    pub sinkin_model_id: String,
    /// `None` when no hosting is configured.
    pub cloudinary: Option<CloudinarySettings>,
    pub narrator_language: Language,
    /// Optional YAML overriding the narrator defaults.
    pub narrator_config_path: Option<PathBuf>,
    /// Optional YAML replacing the marker vocabulary.
    pub markers_path: Option<PathBuf>,
    pub image_prompt_strategy: ImagePromptMode,
    pub canon_path: Option<PathBuf>,
    pub text_timeout: Duration,
    pub image_timeout: Duration,
    pub image_max_retries: u32,
    pub synthesis_budget: Duration,
    pub summary_interval: i32,
}

impl AppConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a required variable is missing or a
    /// value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| AppError::Config(format!("{key} environment variable must be set")))
        };
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_owned());

        let image_provider: ImageProvider = or("IMAGE_PROVIDER", "sinkin").parse()?;
        let sinkin_access_token = get("SINKIN_ACCESS_TOKEN");
        if image_provider == ImageProvider::SinkIn && sinkin_access_token.is_none() {
            return Err(AppError::Config(
                "SINKIN_ACCESS_TOKEN must be set when IMAGE_PROVIDER is sinkin".into(),
            ));
        }

        let cloudinary = match (
            get("CLOUDINARY_CLOUD_NAME"),
            get("CLOUDINARY_API_KEY"),
            get("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinarySettings {
                cloud_name,
                api_key,
                api_secret,
                folder: get("CLOUDINARY_FOLDER"),
            }),
            (None, None, None) => None,
            _ => {
                return Err(AppError::Config(
                    "CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must be set together"
                        .into(),
                ));
            }
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: or("HOST", "0.0.0.0"),
            port: parse("PORT", &or("PORT", "3000"))?,
            database_max_connections: parse(
                "DATABASE_MAX_CONNECTIONS",
                &or("DATABASE_MAX_CONNECTIONS", "10"),
            )?,
            venice_api_key: required("VENICE_API_KEY")?,
            venice_base_url: or("VENICE_BASE_URL", venice::DEFAULT_BASE_URL),
            venice_text_model: or("VENICE_TEXT_MODEL", venice::DEFAULT_TEXT_MODEL),
            venice_image_model: or("VENICE_IMAGE_MODEL", venice::DEFAULT_IMAGE_MODEL),
            image_provider,
            sinkin_access_token,
            sinkin_model_id: or("SINKIN_MODEL_ID", sinkin::DEFAULT_MODEL_ID),
            cloudinary,
            narrator_language: or("NARRATOR_LANGUAGE", "es")
                .parse()
                .map_err(|e| AppError::Config(format!("NARRATOR_LANGUAGE: {e}")))?,
            narrator_config_path: get("NARRATOR_CONFIG_PATH").map(PathBuf::from),
            markers_path: get("MARKERS_PATH").map(PathBuf::from),
            image_prompt_strategy: or("IMAGE_PROMPT_STRATEGY", "llm")
                .parse()
                .map_err(|e| AppError::Config(format!("IMAGE_PROMPT_STRATEGY: {e}")))?,
            canon_path: get("CANON_PATH").map(PathBuf::from),
            text_timeout: secs("TEXT_TIMEOUT_SECS", &or("TEXT_TIMEOUT_SECS", "60"))?,
            image_timeout: secs("IMAGE_TIMEOUT_SECS", &or("IMAGE_TIMEOUT_SECS", "90"))?,
            image_max_retries: parse("IMAGE_MAX_RETRIES", &or("IMAGE_MAX_RETRIES", "2"))?,
            synthesis_budget: secs("SYNTHESIS_BUDGET_SECS", &or("SYNTHESIS_BUDGET_SECS", "240"))?,
            summary_interval: positive(
                "SUMMARY_INTERVAL",
                parse("SUMMARY_INTERVAL", &or("SUMMARY_INTERVAL", "50"))?,
            )?,
        })
    }

    /// `host:port` to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("{key} is invalid: {e}")))
}

fn secs(key: &str, value: &str) -> Result<Duration, AppError> {
    parse::<u64>(key, value).map(Duration::from_secs)
}

fn positive(key: &str, value: i32) -> Result<i32, AppError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(AppError::Config(format!("{key} must be positive")))
    }
}
